use clap::Parser;
use series_etl::config::toml_config::TomlConfig;
use series_etl::core::charts::ChartPlan;
use series_etl::core::ConfigProvider;
use series_etl::utils::{logger, validation::Validate};
use series_etl::{ChartPipeline, EtlEngine, LocalStorage};

#[derive(Parser)]
#[command(name = "toml-etl")]
#[command(about = "Chart series ETL with TOML configuration support")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "series-etl.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override output path from config
    #[arg(long)]
    output_path: Option<String>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌：--verbose 優先於設定檔
    if config.json_logs() {
        let level = if args.verbose {
            "debug"
        } else {
            config.log_level().unwrap_or("info")
        };
        logger::init_json_logger(level);
    } else {
        match config.log_level() {
            Some(level) if !args.verbose => logger::init_logger_with_level(level),
            _ => logger::init_cli_logger(args.verbose),
        }
    }

    tracing::info!("🚀 Starting TOML-based series ETL");
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(output_path) = args.output_path {
        tracing::info!("🔧 Output path overridden to: {}", output_path);
        config.load.output_path = output_path;
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    display_config_summary(&config, args.dry_run);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        return Ok(());
    }

    let storage =
        LocalStorage::new(config.output_path().to_string()).with_source_dir(config.source_dir());
    let pipeline = ChartPipeline::new(storage, config);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Charts built successfully");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, dry_run: bool) {
    println!("📋 Configuration Summary:");
    println!(
        "  Pipeline: {} v{}",
        config.pipeline.name,
        config.pipeline.version.as_deref().unwrap_or("-")
    );
    println!("  Source: {}/{}", config.source_dir(), config.source.file);
    println!("  Parse mode: {:?}", config.parse_mode());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.load.output_formats.join(", "));
    println!("  Compress: {}", config.compress());

    match config.chart_plan() {
        ChartPlan::Page(page) => {
            println!("  Page: {}", page.as_str());
            for chart in page.charts() {
                println!("    - {} ({:?})", chart.id(), chart.kind());
            }
        }
        ChartPlan::Custom(charts) => {
            println!("  Custom charts: {}", charts.len());
            for chart in &charts {
                println!(
                    "    - {} ({:?}): {:?} of {} by {}",
                    chart.id, chart.kind, chart.spec.merge, chart.spec.value_column, chart.spec.group_column
                );
            }
        }
    }

    if let Some(table) = &config.table {
        println!("  Table columns: {}", table.columns.join(", "));
    }

    if dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}
