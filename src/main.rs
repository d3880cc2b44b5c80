use clap::Parser;
use simkey_etl::app::{print_summary, report_failure, run_pipeline};
use simkey_etl::utils::{logger, validation::Validate};
use simkey_etl::CliConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting simkey CLI");
    if config.verbose {
        tracing::debug!(
            "mode={} kind={} input={:?} output={:?} concurrency={}",
            config.mode,
            config.kind,
            config.input,
            config.output,
            config.concurrent_requests
        );
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        std::process::exit(report_failure(&e));
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 Resource monitoring enabled");
    }

    match run_pipeline(config, monitor_enabled).await {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(e) => std::process::exit(report_failure(&e)),
    }
}
