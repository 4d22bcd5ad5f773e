use crate::config::ApiConfig;
use crate::domain::model::{PageBudget, SeasonShots, ShotRecord, ShotmapArtifacts};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::{Duration, Instant};

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_config(&self) -> ApiConfig;
    fn page_budget(&self) -> PageBudget;
    fn min_request_interval(&self) -> Duration;
    fn output_path(&self) -> &str;
    fn compress_output(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<SeasonShots>;
    async fn transform(&self, shots: SeasonShots) -> Result<ShotmapArtifacts>;
    async fn load(&self, artifacts: ShotmapArtifacts) -> Result<String>;
}

/// 時間來源，測試時可替換成假時鐘
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    async fn sleep(&self, duration: Duration);
}

/// Gate awaited before every outbound request.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn acquire(&self);
}

pub trait ShotmapRenderer: Send + Sync {
    fn render(&self, records: &[ShotRecord], player_name: &str, competition: &str)
        -> Result<Vec<u8>>;
}

/// Multimodal model that answers with a `tone, strength, quality` line.
#[async_trait]
pub trait ToneClassifier: Send + Sync {
    async fn classify(&self, image: &[u8]) -> Result<String>;
}
