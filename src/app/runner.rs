use crate::adapters::storage::LocalStorage;
use crate::core::engine::EtlEngine;
use crate::core::pipeline::{SimkeyPipeline, STDOUT};
use crate::core::ConfigProvider;
use crate::domain::model::{RunMode, RunSummary};
use crate::utils::error::{EtlError, Result};

/// 以本機檔案系統與 HTTP client 執行一次完整流程
pub async fn run_pipeline<C: ConfigProvider>(config: C, monitor: bool) -> Result<RunSummary> {
    let pipeline = SimkeyPipeline::with_client(LocalStorage::current_dir(), config)?;
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor);
    engine.run().await
}

/// Operator-facing completion message on stderr; stdout may carry the report.
pub fn print_summary(summary: &RunSummary) {
    match summary.mode {
        RunMode::Report if summary.records == 0 => {
            eprintln!("No records with similarity keys found.");
        }
        RunMode::Report if summary.clusters == 0 => {
            eprintln!("No matching clusters among {} records.", summary.records);
        }
        RunMode::Report => {
            eprintln!(
                "✅ {} clusters from {} records",
                summary.clusters, summary.records
            );
        }
        RunMode::Append => {
            eprintln!(
                "✅ Done. {} rows ({} failed lookups) written to {}",
                summary.records, summary.lookups_failed, summary.output
            );
        }
        RunMode::Lookup => {}
    }

    if summary.output != STDOUT && summary.mode != RunMode::Append {
        eprintln!("📁 Output saved to: {}", summary.output);
    }
}

/// Logs the failure and returns the process exit code.
pub fn report_failure(e: &EtlError) -> i32 {
    tracing::error!("❌ Run failed: {} (Category: {:?})", e, e.category());
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    e.exit_code()
}
