use crate::core::aggregator::SeasonAggregator;
use crate::core::api_client::StatsApiClient;
use crate::core::extractor::ShotExtractor;
use crate::core::rate_limit::MinIntervalGate;
use crate::core::resolver::MatchIdResolver;
use crate::core::{ConfigProvider, Pipeline, SeasonShots, ShotRecord, ShotmapArtifacts, Storage};
use crate::domain::model::{MatchId, ShotSummary, ShotmapRequest};
use crate::domain::ports::{RateLimiter, ShotmapRenderer};
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use zip::write::{FileOptions, ZipWriter};

pub const SVG_FILENAME: &str = "shotmap.svg";
pub const CSV_FILENAME: &str = "shots.csv";
pub const SUMMARY_FILENAME: &str = "summary.json";
pub const ZIP_FILENAME: &str = "shotmap_output.zip";

/// Player + competition season → resolved matches → shots → chart and tables.
pub struct ShotmapPipeline<S: Storage, C: ConfigProvider, R: ShotmapRenderer> {
    storage: S,
    config: C,
    renderer: R,
    request: ShotmapRequest,
    api: Arc<StatsApiClient>,
    resolver: MatchIdResolver,
    aggregator: SeasonAggregator,
}

#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    player_id: &'a str,
    player_name: &'a str,
    competition: &'a str,
    shots: usize,
    goals: usize,
    penalties: usize,
    total_xg: f64,
    xg_per_shot: f64,
    matches_requested: usize,
    failed_matches: &'a [MatchId],
    generated_at: DateTime<Utc>,
}

impl<S: Storage, C: ConfigProvider, R: ShotmapRenderer> ShotmapPipeline<S, C, R> {
    pub fn new(storage: S, config: C, renderer: R, request: ShotmapRequest) -> Result<Self> {
        let limiter: Arc<dyn RateLimiter> =
            Arc::new(MinIntervalGate::new(config.min_request_interval()));
        Self::with_rate_limiter(storage, config, renderer, request, limiter)
    }

    pub fn with_rate_limiter(
        storage: S,
        config: C,
        renderer: R,
        request: ShotmapRequest,
        limiter: Arc<dyn RateLimiter>,
    ) -> Result<Self> {
        let api = Arc::new(StatsApiClient::new(&config.api_config(), limiter)?);
        let resolver = MatchIdResolver::new(api.clone(), config.page_budget());
        let aggregator = SeasonAggregator::new(ShotExtractor::new(api.clone()));

        Ok(Self {
            storage,
            config,
            renderer,
            request,
            api,
            resolver,
            aggregator,
        })
    }

    pub fn request(&self) -> &ShotmapRequest {
        &self.request
    }

    /// History-page URLs the resolver will request, for dry runs.
    pub fn planned_requests(&self) -> Vec<String> {
        (0..self.resolver.pages_for(&self.request.competition))
            .map(|page| self.api.events_url(&self.request.player_id, page))
            .collect()
    }

    fn shots_csv(records: &[ShotRecord]) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for record in records {
            writer.serialize(record)?;
        }
        writer.into_inner().map_err(|e| EtlError::IoError(e.into_error()))
    }

    fn summary_json(artifacts: &ShotmapArtifacts) -> Result<Vec<u8>> {
        let summary = RunSummary {
            player_id: &artifacts.request.player_id,
            player_name: &artifacts.request.player_name,
            competition: &artifacts.request.competition,
            shots: artifacts.summary.shots,
            goals: artifacts.summary.goals,
            penalties: artifacts.records.iter().filter(|r| r.is_penalty()).count(),
            total_xg: artifacts.summary.total_xg,
            xg_per_shot: artifacts.summary.xg_per_shot(),
            matches_requested: artifacts.matches_requested,
            failed_matches: &artifacts.failed_matches,
            generated_at: Utc::now(),
        };
        Ok(serde_json::to_vec_pretty(&summary)?)
    }

    fn bundle(files: &[(&str, &[u8])]) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for (name, data) in files {
            zip.start_file::<_, ()>(*name, FileOptions::default())?;
            zip.write_all(data)?;
        }
        // 完成並取回底層 Vec<u8>
        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, R: ShotmapRenderer> Pipeline for ShotmapPipeline<S, C, R> {
    async fn extract(&self) -> Result<SeasonShots> {
        let matches = self
            .resolver
            .resolve(&self.request.player_id, &self.request.competition)
            .await?;

        self.aggregator
            .aggregate(&matches, &self.request.player_name)
            .await
            .map_err(|e| match e {
                // 沒有任何比賽時，錯誤訊息仍帶上使用者輸入的賽事名稱
                EtlError::EmptyResult { player, .. } => EtlError::EmptyResult {
                    player,
                    competition: self.request.competition.clone(),
                },
                other => other,
            })
    }

    async fn transform(&self, shots: SeasonShots) -> Result<ShotmapArtifacts> {
        let summary = ShotSummary::from_records(&shots.records);
        let svg = self.renderer.render(
            &shots.records,
            &self.request.player_name,
            &self.request.competition,
        )?;

        Ok(ShotmapArtifacts {
            request: self.request.clone(),
            summary,
            records: shots.records,
            matches_requested: shots.matches_requested,
            failed_matches: shots.failed_matches,
            svg,
        })
    }

    async fn load(&self, artifacts: ShotmapArtifacts) -> Result<String> {
        let csv = Self::shots_csv(&artifacts.records)?;
        let summary = Self::summary_json(&artifacts)?;

        if self.config.compress_output() {
            let zip_data = Self::bundle(&[
                (SVG_FILENAME, artifacts.svg.as_slice()),
                (CSV_FILENAME, csv.as_slice()),
                (SUMMARY_FILENAME, summary.as_slice()),
            ])?;
            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage.write_file(ZIP_FILENAME, &zip_data).await?;
            return Ok(format!("{}/{}", self.config.output_path(), ZIP_FILENAME));
        }

        self.storage.write_file(SVG_FILENAME, &artifacts.svg).await?;
        self.storage.write_file(CSV_FILENAME, &csv).await?;
        self.storage.write_file(SUMMARY_FILENAME, &summary).await?;

        Ok(format!("{}/{}", self.config.output_path(), SVG_FILENAME))
    }
}
