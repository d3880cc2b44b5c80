use clap::Parser;
use simkey_etl::app::{print_summary, report_failure, run_pipeline};
use simkey_etl::core::ConfigProvider;
use simkey_etl::utils::{logger, validation::Validate};
use simkey_etl::{RunMode, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-simkey")]
#[command(about = "Similarity key runs driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "simkey.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Show what would be processed without calling the service
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置 (日誌格式由設定檔決定，所以先載入)
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(args.verbose);
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(e.exit_code());
        }
    };

    if config.json_logs() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Err(e) = config.validate() {
        std::process::exit(report_failure(&e));
    }

    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no requests will be made");
        perform_dry_run(&config).await;
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());

    match run_pipeline(config, monitor_enabled).await {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(e) => std::process::exit(report_failure(&e)),
    }
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Configuration Summary:");
    tracing::info!("  🔧 Mode: {}", config.mode());
    tracing::info!("  🔎 Kind: {} ({})", config.request_kind(), config.request_kind().endpoint());
    tracing::info!("  🌐 Service: {}", config.base_url());
    if let Some(algorithm) = config
        .algorithm()
        .or(config.request_kind().default_algorithm())
    {
        tracing::info!("  🧮 Algorithm: {}", algorithm);
    }
    tracing::info!("  ⏱️ Timeout: {:?}", config.timeout());
    tracing::info!("  ⚡ Concurrent requests: {}", config.concurrent_requests());
    tracing::info!(
        "  📁 Output: {}",
        config.output_path().unwrap_or("stdout")
    );
}

async fn perform_dry_run(config: &TomlConfig) {
    if config.mode() == RunMode::Lookup {
        println!(
            "Would look up one {} value: {:?}",
            config.request_kind(),
            config.lookup_value().unwrap_or_default()
        );
        return;
    }

    // validate() guarantees an input path outside lookup mode
    let Some(input) = config.input_path() else {
        return;
    };

    match tokio::fs::read_to_string(input).await {
        Ok(text) => {
            let lines = simkey_etl::core::pipeline::parse_lines(&text);
            println!(
                "Would look up {} {} values from {} ({} mode)",
                lines.len(),
                config.request_kind(),
                input,
                config.mode()
            );
            for line in lines.iter().take(5) {
                println!("  line {}: {:?}", line.sequence_index, line.value);
            }
        }
        Err(e) => {
            eprintln!("❌ Cannot read input '{}': {}", input, e);
        }
    }
}
