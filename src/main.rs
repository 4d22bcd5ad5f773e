use clap::Parser;
use shotmap_etl::core::ConfigProvider;
use shotmap_etl::utils::error::{EtlError, ErrorSeverity};
use shotmap_etl::utils::{logger, validation::Validate};
use shotmap_etl::{CliConfig, EtlEngine, LocalStorage, ShotmapPipeline, SvgShotmapRenderer, TomlConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting shotmap CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入設定檔並套用命令列覆蓋
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match TomlConfig::from_file(path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", path, e);
                    eprintln!("💡 Make sure the file exists and is valid TOML format");
                    std::process::exit(1);
                }
            }
        }
        None => TomlConfig::default(),
    };
    cli.apply_overrides(&mut config);

    if let Err(e) = cli.validate().and_then(|_| config.validate()) {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = match ShotmapPipeline::new(storage, config, SvgShotmapRenderer::new(), cli.request()) {
        Ok(pipeline) => pipeline,
        Err(e) => exit_with(e),
    };

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No requests will be sent");
        print_dry_run(&pipeline);
        return Ok(());
    }

    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Shot map completed successfully!");
            println!("✅ Shot map completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => exit_with(e),
    }

    Ok(())
}

fn print_dry_run(pipeline: &ShotmapPipeline<LocalStorage, TomlConfig, SvgShotmapRenderer>) {
    let request = pipeline.request();
    println!("📋 Dry Run:");
    println!("  Player: {} (id {})", request.player_name, request.player_id);
    println!("  Competition: {}", request.competition);
    println!("  History pages:");
    for url in pipeline.planned_requests() {
        println!("    GET {}", url);
    }
    println!("  Then one shotmap request per matching match");
}

fn exit_with(e: EtlError) -> ! {
    tracing::error!(
        "❌ Shot map failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
