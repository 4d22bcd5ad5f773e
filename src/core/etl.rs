use crate::core::Pipeline;
use crate::utils::error::Result;

/// Runs a pipeline's stages in order and stops at the first fatal error.
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting shotmap ETL process");

        // Extract
        let season = self.pipeline.extract().await?;
        tracing::info!(
            "📥 Extracted {} shots from {} matches",
            season.records.len(),
            season.matches_requested
        );

        // Transform
        let artifacts = self.pipeline.transform(season).await?;
        tracing::info!(
            "🔄 Summary: {} shots, {} goals, {} xG",
            artifacts.summary.shots,
            artifacts.summary.goals,
            artifacts.summary.total_xg_label()
        );

        // Load
        let output_path = self.pipeline.load(artifacts).await?;
        tracing::info!("💾 Output saved to: {}", output_path);

        Ok(output_path)
    }
}
