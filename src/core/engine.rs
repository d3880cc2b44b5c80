use crate::core::Pipeline;
use crate::domain::model::{RunOutcome, RunSummary};
use crate::utils::error::Result;
use crate::utils::monitor::ResourceMonitor;
use chrono::Utc;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: ResourceMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: ResourceMonitor::new(monitor_enabled),
        }
    }

    /// 依序執行 extract → transform → load，回傳本次執行摘要
    pub async fn run(&self) -> Result<RunSummary> {
        let started_at = Utc::now();
        tracing::info!(
            "🚀 Starting {} run for {} values",
            self.pipeline.mode(),
            self.pipeline.kind()
        );

        let lines = self.pipeline.extract().await?;
        self.monitor.log_phase("Extract");

        let result = self.pipeline.transform(lines).await?;
        self.monitor.log_phase("Transform");

        let output = self.pipeline.load(&result).await?;
        self.monitor.log_phase("Load");
        self.monitor.log_final();

        let clusters = match &result.outcome {
            RunOutcome::Clustered(clusters) => clusters.len(),
            _ => 0,
        };

        let summary = RunSummary {
            mode: self.pipeline.mode(),
            kind: self.pipeline.kind(),
            lines_read: result.stats.lines_read,
            lookups_failed: result.stats.lookups_failed,
            warnings: result.stats.warnings,
            records: result.stats.records_kept,
            clusters,
            credits_remaining: result.stats.credits_remaining.clone(),
            started_at,
            finished_at: Utc::now(),
            output,
        };

        tracing::info!(
            "✅ {} lines, {} failed, {} warnings, {} records, {} clusters in {}ms",
            summary.lines_read,
            summary.lookups_failed,
            summary.warnings,
            summary.records,
            summary.clusters,
            summary.elapsed().num_milliseconds()
        );
        if let Some(credits) = &summary.credits_remaining {
            tracing::info!("💳 Remaining credits: {}", credits);
        }

        Ok(summary)
    }
}
