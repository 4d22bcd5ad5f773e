use crate::core::api_client::StatsApiClient;
use crate::domain::model::{FetchOutcome, MatchId, MatchReference, PageBudget};
use crate::utils::error::Result;
use crate::utils::validation;
use std::sync::Arc;

/// Enumerates the matches a player appeared in for one competition season.
pub struct MatchIdResolver {
    api: Arc<StatsApiClient>,
    budget: PageBudget,
}

impl MatchIdResolver {
    pub fn new(api: Arc<StatsApiClient>, budget: PageBudget) -> Self {
        Self { api, budget }
    }

    pub fn pages_for(&self, competition: &str) -> usize {
        self.budget.pages_for(competition)
    }

    /// 依頁序請求球員的歷史賽事，只保留賽季名稱完全相同者。
    /// 失敗的頁面記錄警告後略過，不重試。
    pub async fn resolve(&self, player_id: &str, competition: &str) -> Result<Vec<MatchReference>> {
        validation::validate_non_empty_string("player_id", player_id)?;
        validation::validate_non_empty_string("competition", competition)?;

        let pages = self.pages_for(competition);
        tracing::info!(
            "🔎 Resolving matches for player {} in '{}' ({} pages)",
            player_id,
            competition,
            pages
        );

        let mut references = Vec::new();

        for page in 0..pages {
            let events = match self.api.events_page(player_id, page).await {
                FetchOutcome::Fetched(events) => events,
                FetchOutcome::Empty => continue,
                FetchOutcome::Transient(failure) => {
                    tracing::warn!("⚠️ Skipping history page {}: {}", page, failure);
                    continue;
                }
            };

            let before = references.len();
            for event in events.events {
                let in_competition = event
                    .season
                    .as_ref()
                    .is_some_and(|season| season.name == competition);

                if in_competition {
                    references.push(MatchReference {
                        match_id: MatchId(event.id),
                        competition: competition.to_string(),
                    });
                }
            }

            tracing::debug!(
                "Page {}: {} matching events (has_next_page = {})",
                page,
                references.len() - before,
                events.has_next_page
            );
        }

        if references.is_empty() {
            tracing::warn!("No matches found for player {} in '{}'", player_id, competition);
        } else {
            tracing::info!("📋 Resolved {} matches", references.len());
        }

        Ok(references)
    }
}
