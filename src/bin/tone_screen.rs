use anyhow::{Context, Result};
use clap::Parser;
use shotmap_etl::classify::{self, Exemplars, GeminiToneClassifier, ScreeningPolicy, ToneScreener};
use shotmap_etl::core::rate_limit::MinIntervalGate;
use shotmap_etl::utils::{logger, validation::Validate};
use shotmap_etl::TomlConfig;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "tone-screen")]
#[command(about = "Screen player images by media tone and quality")]
struct Args {
    /// TOML configuration with a [classifier] section
    #[arg(short, long, default_value = "shotmap.toml")]
    config: String,

    /// Directory of candidate images
    #[arg(short, long)]
    input_dir: PathBuf,

    /// Where kept images are copied, renamed with their tone
    #[arg(short, long, default_value = "./screened")]
    output_dir: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting tone screening");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("failed to load config file '{}'", args.config))?;
    config.validate().context("configuration validation failed")?;
    let classifier_config = config.classifier()?;

    let exemplars = Exemplars::load(classifier_config)
        .await
        .context("failed to read exemplar images")?;
    let limiter = Arc::new(MinIntervalGate::new(Duration::from_millis(
        classifier_config.min_interval_ms,
    )));
    let classifier = GeminiToneClassifier::new(classifier_config, exemplars, limiter)?;
    let screener = ToneScreener::new(classifier, ScreeningPolicy::from(classifier_config));

    let mut images: Vec<PathBuf> = std::fs::read_dir(&args.input_dir)
        .with_context(|| format!("cannot read {}", args.input_dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && classify::is_supported_image(path))
        .collect();
    images.sort();

    tokio::fs::create_dir_all(&args.output_dir).await?;
    tracing::info!("🖼️ Screening {} images", images.len());

    let report = screener.screen_batch(&images, &args.output_dir).await;

    println!("📋 Screening Summary:");
    println!("  Kept: {}", report.kept);
    println!("  Rejected: {}", report.rejected);
    println!("  Failed: {}", report.failed);
    println!("  Output: {}", args.output_dir.display());

    Ok(())
}
