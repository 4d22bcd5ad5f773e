use crate::core::api_client::{ShotEvent, StatsApiClient};
use crate::domain::model::{BodyPart, FetchOutcome, MatchId, ShotRecord, Situation};
use std::sync::Arc;

/// Pulls one match's shot list and keeps the named player's shots.
pub struct ShotExtractor {
    api: Arc<StatsApiClient>,
}

impl ShotExtractor {
    pub fn new(api: Arc<StatsApiClient>) -> Self {
        Self { api }
    }

    pub async fn extract(&self, match_id: MatchId, player_name: &str) -> FetchOutcome<Vec<ShotRecord>> {
        let response = match self.api.shotmap(match_id).await {
            FetchOutcome::Fetched(response) => response,
            FetchOutcome::Empty => return FetchOutcome::Empty,
            FetchOutcome::Transient(failure) => return FetchOutcome::Transient(failure),
        };

        let records = filter_player_shots(&response.shotmap, player_name, match_id);
        tracing::debug!(
            "Match {}: {} of {} shots taken by {}",
            match_id,
            records.len(),
            response.shotmap.len(),
            player_name
        );

        if records.is_empty() {
            FetchOutcome::Empty
        } else {
            FetchOutcome::Fetched(records)
        }
    }
}

/// 球員名稱需逐位元組相同，不做大小寫或變音符號正規化
pub fn filter_player_shots(shots: &[ShotEvent], player_name: &str, match_id: MatchId) -> Vec<ShotRecord> {
    shots
        .iter()
        .filter(|shot| {
            shot.player
                .as_ref()
                .is_some_and(|player| player.name == player_name)
        })
        .filter_map(|shot| project(shot, match_id))
        .collect()
}

fn project(shot: &ShotEvent, match_id: MatchId) -> Option<ShotRecord> {
    let Some(coordinates) = shot.player_coordinates else {
        tracing::warn!("Match {}: shot without coordinates skipped", match_id);
        return None;
    };
    let Some(shot_type) = shot.shot_type else {
        tracing::warn!("Match {}: shot without shotType skipped", match_id);
        return None;
    };

    let record = ShotRecord {
        shot_type,
        situation: shot.situation.unwrap_or(Situation::Other),
        body_part: shot.body_part.unwrap_or(BodyPart::Other),
        x: coordinates.x,
        y: coordinates.y,
        expected_goal_value: shot.xg.unwrap_or(0.0),
    };

    if !record.is_within_bounds() {
        tracing::warn!(
            "Match {}: shot outside pitch/xG bounds skipped (x={}, y={}, xg={})",
            match_id,
            record.x,
            record.y,
            record.expected_goal_value
        );
        return None;
    }

    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::core::rate_limit::MinIntervalGate;
    use crate::domain::model::ShotType;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn shot(name: &str, shot_type: &str, situation: &str, x: f64, y: f64, xg: f64) -> serde_json::Value {
        json!({
            "player": {"name": name, "id": 1},
            "shotType": shot_type,
            "situation": situation,
            "bodyPart": "right-foot",
            "playerCoordinates": {"x": x, "y": y, "z": 0},
            "xg": xg,
            "time": 23
        })
    }

    fn extractor_for(server: &MockServer) -> ShotExtractor {
        let config = ApiConfig {
            base_url: server.url("/api/v1"),
            ..ApiConfig::default()
        };
        let api = StatsApiClient::new(&config, Arc::new(MinIntervalGate::new(Duration::ZERO)))
            .unwrap();
        ShotExtractor::new(Arc::new(api))
    }

    #[tokio::test]
    async fn test_keeps_only_named_player() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/api/v1/event/555/shotmap");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"shotmap": [
                    shot("Jane Doe", "goal", "assisted", 8.4, 47.1, 0.32),
                    shot("John Roe", "miss", "regular", 20.0, 60.0, 0.04),
                ]}));
        });

        let extractor = extractor_for(&server);
        let outcome = extractor.extract(MatchId(555), "Jane Doe").await;

        api_mock.assert();
        let FetchOutcome::Fetched(records) = outcome else {
            panic!("expected fetched records");
        };
        assert_eq!(
            records,
            vec![ShotRecord {
                shot_type: ShotType::Goal,
                situation: Situation::Assisted,
                body_part: BodyPart::RightFoot,
                x: 8.4,
                y: 47.1,
                expected_goal_value: 0.32,
            }]
        );
    }

    #[tokio::test]
    async fn test_no_shots_by_player_is_empty() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/event/1/shotmap");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"shotmap": [shot("John Roe", "save", "regular", 11.0, 50.0, 0.2)]}));
        });

        let extractor = extractor_for(&server);
        assert_eq!(extractor.extract(MatchId(1), "Jane Doe").await, FetchOutcome::Empty);
    }

    #[tokio::test]
    async fn test_missing_shotmap_is_transient() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/event/2/shotmap");
            then.status(404);
        });

        let extractor = extractor_for(&server);
        assert!(extractor.extract(MatchId(2), "Jane Doe").await.is_transient());
    }

    #[tokio::test]
    async fn test_other_players_malformed_shot_does_not_sink_match() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/event/6/shotmap");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"shotmap": [
                    {"player": {"name": "John Roe"}, "situation": "regular",
                     "playerCoordinates": {"x": 12.0, "y": 40.0}, "xg": 0.1},
                    {"player": {"name": "Jane Doe"}, "situation": "corner",
                     "playerCoordinates": {"x": 6.0, "y": 52.0}, "xg": 0.3},
                    shot("Jane Doe", "save", "regular", 16.0, 45.0, 0.08),
                ]}));
        });

        let extractor = extractor_for(&server);
        let FetchOutcome::Fetched(records) = extractor.extract(MatchId(6), "Jane Doe").await else {
            panic!("expected fetched records");
        };
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].shot_type, ShotType::Save);
    }

    #[test]
    fn test_name_match_is_case_and_diacritic_sensitive() {
        let shots: Vec<ShotEvent> = serde_json::from_value(json!([
            shot("Martin Ødegaard", "miss", "regular", 15.0, 40.0, 0.05),
            shot("Martin Odegaard", "miss", "regular", 15.0, 40.0, 0.05),
            shot("martin ødegaard", "miss", "regular", 15.0, 40.0, 0.05),
        ]))
        .unwrap();

        let records = filter_player_shots(&shots, "Martin Ødegaard", MatchId(3));
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let shots: Vec<ShotEvent> = serde_json::from_value(json!([
            {"player": {"name": "Jane Doe"}, "shotType": "block", "playerCoordinates": {"x": 18.0, "y": 33.0}},
            {"player": {"name": "Jane Doe"}, "shotType": "post", "situation": "free-kick"},
            {"shotType": "goal", "situation": "regular", "playerCoordinates": {"x": 5.0, "y": 50.0}, "xg": 0.6},
            {"player": {"name": "Jane Doe"}, "shotType": "miss", "playerCoordinates": {"x": 120.0, "y": 50.0}, "xg": 0.1}
        ]))
        .unwrap();

        let records = filter_player_shots(&shots, "Jane Doe", MatchId(4));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].shot_type, ShotType::Block);
        assert_eq!(records[0].situation, Situation::Other);
        assert_eq!(records[0].body_part, BodyPart::Other);
        assert_eq!(records[0].expected_goal_value, 0.0);
    }
}
