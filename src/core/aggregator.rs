use crate::core::extractor::ShotExtractor;
use crate::domain::model::{FetchOutcome, MatchReference, SeasonShots};
use crate::utils::error::{EtlError, Result};

/// Concatenates per-match shots in resolution order.
pub struct SeasonAggregator {
    extractor: ShotExtractor,
}

impl SeasonAggregator {
    pub fn new(extractor: ShotExtractor) -> Self {
        Self { extractor }
    }

    /// 逐場抽取並串接；總數為零時回傳 `EmptyResult`，不產生空圖表
    pub async fn aggregate(&self, matches: &[MatchReference], player_name: &str) -> Result<SeasonShots> {
        let mut season = SeasonShots {
            matches_requested: matches.len(),
            ..SeasonShots::default()
        };

        for (index, reference) in matches.iter().enumerate() {
            tracing::debug!(
                "Extracting match {}/{}: {}",
                index + 1,
                matches.len(),
                reference.match_id
            );

            match self.extractor.extract(reference.match_id, player_name).await {
                FetchOutcome::Fetched(records) => season.records.extend(records),
                FetchOutcome::Empty => {}
                FetchOutcome::Transient(failure) => {
                    tracing::warn!("⚠️ Match {} contributes no shots: {}", reference.match_id, failure);
                    season.failed_matches.push(reference.match_id);
                }
            }
        }

        if season.records.is_empty() {
            let competition = matches
                .first()
                .map(|m| m.competition.clone())
                .unwrap_or_else(|| "this competition".to_string());
            return Err(EtlError::EmptyResult {
                player: player_name.to_string(),
                competition,
            });
        }

        tracing::info!(
            "🎯 Aggregated {} shots from {} matches ({} failed)",
            season.records.len(),
            season.matches_requested,
            season.failed_matches.len()
        );

        Ok(season)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::core::api_client::StatsApiClient;
    use crate::core::rate_limit::MinIntervalGate;
    use crate::domain::model::MatchId;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    const COMPETITION: &str = "Premier League 24/25";

    fn aggregator_for(server: &MockServer) -> SeasonAggregator {
        let config = ApiConfig {
            base_url: server.url("/api/v1"),
            ..ApiConfig::default()
        };
        let api = StatsApiClient::new(&config, Arc::new(MinIntervalGate::new(Duration::ZERO)))
            .unwrap();
        SeasonAggregator::new(ShotExtractor::new(Arc::new(api)))
    }

    fn reference(id: u64) -> MatchReference {
        MatchReference {
            match_id: MatchId(id),
            competition: COMPETITION.to_string(),
        }
    }

    fn mock_shots(server: &MockServer, match_id: u64, xgs: &[f64]) {
        let shots: Vec<_> = xgs
            .iter()
            .map(|xg| {
                json!({
                    "player": {"name": "Jane Doe"},
                    "shotType": "miss",
                    "situation": "regular",
                    "bodyPart": "head",
                    "playerCoordinates": {"x": 10.0, "y": 50.0, "z": 0.0},
                    "xg": xg
                })
            })
            .collect();
        let path = format!("/api/v1/event/{}/shotmap", match_id);
        server.mock(move |when, then| {
            when.method(GET).path(path);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({ "shotmap": shots }));
        });
    }

    #[tokio::test]
    async fn test_concatenation_follows_match_order() {
        let server = MockServer::start();
        mock_shots(&server, 3, &[0.3]);
        mock_shots(&server, 1, &[0.1, 0.11]);
        mock_shots(&server, 2, &[0.2]);

        let aggregator = aggregator_for(&server);
        let season = aggregator
            .aggregate(&[reference(3), reference(1), reference(2)], "Jane Doe")
            .await
            .unwrap();

        let xgs: Vec<f64> = season.records.iter().map(|r| r.expected_goal_value).collect();
        assert_eq!(xgs, vec![0.3, 0.1, 0.11, 0.2]);
        assert_eq!(season.matches_requested, 3);
        assert!(season.failed_matches.is_empty());
    }

    #[tokio::test]
    async fn test_failed_match_contributes_nothing() {
        let server = MockServer::start();
        mock_shots(&server, 1, &[0.25]);
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/event/2/shotmap");
            then.status(503);
        });

        let aggregator = aggregator_for(&server);
        let season = aggregator
            .aggregate(&[reference(1), reference(2)], "Jane Doe")
            .await
            .unwrap();

        assert_eq!(season.records.len(), 1);
        assert_eq!(season.failed_matches, vec![MatchId(2)]);
    }

    #[tokio::test]
    async fn test_zero_records_is_fatal() {
        let server = MockServer::start();
        mock_shots(&server, 1, &[]);

        let aggregator = aggregator_for(&server);
        let err = aggregator
            .aggregate(&[reference(1)], "Jane Doe")
            .await
            .unwrap_err();

        match err {
            EtlError::EmptyResult { player, competition } => {
                assert_eq!(player, "Jane Doe");
                assert_eq!(competition, COMPETITION);
            }
            other => panic!("expected EmptyResult, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_matches_is_fatal() {
        let server = MockServer::start();
        let aggregator = aggregator_for(&server);
        let err = aggregator.aggregate(&[], "Jane Doe").await.unwrap_err();
        assert!(matches!(err, EtlError::EmptyResult { .. }));
    }
}
