use crate::config::ApiConfig;
use crate::domain::model::{BodyPart, FetchOutcome, MatchId, ShotType, Situation, TransientFailure};
use crate::domain::ports::RateLimiter;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// One page of a player's match history.
#[derive(Debug, Clone, Deserialize)]
pub struct EventsPage {
    #[serde(default)]
    pub events: Vec<PlayerEvent>,
    #[serde(default, rename = "hasNextPage")]
    pub has_next_page: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerEvent {
    pub id: u64,
    pub season: Option<SeasonRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeasonRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShotmapResponse {
    #[serde(default)]
    pub shotmap: Vec<ShotEvent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotEvent {
    pub player: Option<PlayerRef>,
    pub shot_type: Option<ShotType>,
    pub situation: Option<Situation>,
    pub body_part: Option<BodyPart>,
    pub player_coordinates: Option<Coordinates>,
    pub xg: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerRef {
    pub name: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
}

/// 統計 API 客戶端：固定 header、逾時設定與請求節流
pub struct StatsApiClient {
    client: Client,
    base_url: String,
    page_size: usize,
    limiter: Arc<dyn RateLimiter>,
}

impl StatsApiClient {
    pub fn new(config: &ApiConfig, limiter: Arc<dyn RateLimiter>) -> Result<Self> {
        let client = Client::builder()
            .default_headers(Self::build_headers(config)?)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size,
            limiter,
        })
    }

    fn build_headers(config: &ApiConfig) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        for (name, value) in &config.headers {
            Self::insert_header(&mut headers, "api.headers", name, value)?;
        }

        if let Some(line) = &config.auth_header {
            let (name, value) = validation::validate_header_line("api.auth_header", line)?;
            Self::insert_header(&mut headers, "api.auth_header", name, value)?;
        }

        Ok(headers)
    }

    fn insert_header(headers: &mut HeaderMap, field: &str, name: &str, value: &str) -> Result<()> {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            EtlError::InvalidConfigValueError {
                field: field.to_string(),
                value: name.to_string(),
                reason: e.to_string(),
            }
        })?;
        let header_value =
            HeaderValue::from_str(value).map_err(|e| EtlError::InvalidConfigValueError {
                field: field.to_string(),
                value: name.to_string(),
                reason: e.to_string(),
            })?;
        headers.insert(header_name, header_value);
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn events_url(&self, player_id: &str, page: usize) -> String {
        format!("{}/player/{}/events/last/{}", self.base_url, player_id, page)
    }

    pub fn shotmap_url(&self, match_id: MatchId) -> String {
        format!("{}/event/{}/shotmap", self.base_url, match_id)
    }

    pub async fn events_page(&self, player_id: &str, page: usize) -> FetchOutcome<EventsPage> {
        let outcome: FetchOutcome<EventsPage> =
            self.fetch_json(&self.events_url(player_id, page)).await;

        if let FetchOutcome::Fetched(events) = &outcome {
            if events.events.len() > self.page_size {
                tracing::warn!(
                    "Page {} returned {} events, more than the configured page size {}",
                    page,
                    events.events.len(),
                    self.page_size
                );
            }
        }

        outcome
    }

    pub async fn shotmap(&self, match_id: MatchId) -> FetchOutcome<ShotmapResponse> {
        self.fetch_json(&self.shotmap_url(match_id)).await
    }

    /// GET + JSON 解碼；任何失敗都轉為 `Transient`，不重試
    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> FetchOutcome<T> {
        self.limiter.acquire().await;

        tracing::debug!("Making API request to: {}", url);
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("⚠️ Request to {} failed: {}", url, e);
                return FetchOutcome::Transient(TransientFailure {
                    resource: url.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            tracing::warn!("⚠️ {} answered with HTTP {}", url, status.as_u16());
            return FetchOutcome::Transient(TransientFailure {
                resource: url.to_string(),
                reason: format!("HTTP {}", status.as_u16()),
            });
        }

        match response.json::<T>().await {
            Ok(body) => FetchOutcome::Fetched(body),
            Err(e) => {
                tracing::warn!("⚠️ Undecodable body from {}: {}", url, e);
                FetchOutcome::Transient(TransientFailure {
                    resource: url.to_string(),
                    reason: format!("undecodable body: {}", e),
                })
            }
        }
    }
}
