use crate::adapters::http::FingerprintClient;
use crate::core::clustering::cluster;
use crate::core::formatter::{render_append, render_report};
use crate::core::{ConfigProvider, FingerprintSource, Pipeline, Storage};
use crate::domain::model::{
    FingerprintResult, InputLine, LookupStats, Record, RecordStore, RequestKind, RunMode,
    RunOutcome, TransformResult,
};
use crate::utils::error::{EtlError, LookupError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

type LookupOutcome = std::result::Result<FingerprintResult, LookupError>;

pub const STDOUT: &str = "stdout";

/// 讀取輸入、逐行查詢指紋，依模式輸出附加檔或分群報表
pub struct SimkeyPipeline<S: Storage, C: ConfigProvider, F: FingerprintSource = FingerprintClient>
{
    storage: S,
    config: C,
    source: Arc<F>,
}

impl<S: Storage, C: ConfigProvider> SimkeyPipeline<S, C, FingerprintClient> {
    pub fn with_client(storage: S, config: C) -> Result<Self> {
        let client = FingerprintClient::from_config(&config)?;
        Ok(Self::new(storage, config, client))
    }
}

impl<S: Storage, C: ConfigProvider, F: FingerprintSource + 'static> SimkeyPipeline<S, C, F> {
    pub fn new(storage: S, config: C, source: F) -> Self {
        Self {
            storage,
            config,
            source: Arc::new(source),
        }
    }

    /// 併發查詢，結果依原始順序放回各自的槽位
    async fn lookup_all(&self, lines: &[InputLine]) -> Vec<LookupOutcome> {
        let kind = self.config.request_kind();
        let semaphore = Arc::new(Semaphore::new(self.config.concurrent_requests().max(1)));
        let mut tasks = JoinSet::new();
        let mut slot_of = HashMap::with_capacity(lines.len());

        for (slot, line) in lines.iter().enumerate() {
            // 先拿到許可才產生任務，呼叫依檔案順序開始，同時存在的任務不超過上限
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break;
            };
            let source = Arc::clone(&self.source);
            let value = line.value.clone();
            let handle = tasks.spawn(async move {
                let outcome = source.lookup(&value, kind).await;
                drop(permit);
                (slot, outcome)
            });
            slot_of.insert(handle.id(), slot);
        }

        let mut slots: Vec<Option<LookupOutcome>> = (0..lines.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((_, (slot, outcome))) => slots[slot] = Some(outcome),
                Err(e) => {
                    let reason = if e.is_panic() { "task panicked" } else { "task cancelled" };
                    if let Some(&slot) = slot_of.get(&e.id()) {
                        tracing::error!(
                            "💥 Lookup task for line {} aborted: {}",
                            lines[slot].sequence_index,
                            e
                        );
                        slots[slot] = Some(Err(LookupError::Interrupted {
                            reason: reason.to_string(),
                        }));
                    }
                }
            }
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    Err(LookupError::Interrupted {
                        reason: "task never started".to_string(),
                    })
                })
            })
            .collect()
    }

    fn note_success(stats: &mut LookupStats, line: &InputLine, result: &FingerprintResult) {
        stats.credits_remaining =
            lowest_credits(stats.credits_remaining.take(), &result.credits_remaining);
        if let Some(warning) = result.service_warning() {
            stats.warnings += 1;
            tracing::warn!(
                "⚠️ Line {} ({:?}): {}",
                line.sequence_index,
                line.value,
                warning
            );
        }
    }

    async fn write_output(&self, data: &[u8]) -> Result<String> {
        match self.config.output_path() {
            Some(path) => {
                self.storage.write_file(path, data).await?;
                Ok(path.to_string())
            }
            None => {
                let output_error = |source| EtlError::OutputError {
                    path: STDOUT.to_string(),
                    source,
                };
                let mut stdout = tokio::io::stdout();
                stdout.write_all(data).await.map_err(output_error)?;
                stdout.flush().await.map_err(output_error)?;
                Ok(STDOUT.to_string())
            }
        }
    }
}

/// 併發時完成順序不固定，保留看過的最低餘額；非數字的值以最新一筆為準
fn lowest_credits(current: Option<String>, reported: &str) -> Option<String> {
    if reported.is_empty() {
        return current;
    }
    match current {
        Some(seen) => match (seen.trim().parse::<i64>(), reported.trim().parse::<i64>()) {
            (Ok(low), Ok(new)) if low <= new => Some(seen),
            _ => Some(reported.to_string()),
        },
        None => Some(reported.to_string()),
    }
}

/// Non-empty lines with their 1-based line numbers. Values are not trimmed.
pub fn parse_lines(text: &str) -> Vec<InputLine> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .map(|(index, line)| InputLine {
            sequence_index: index + 1,
            value: line.to_string(),
        })
        .collect()
}

pub fn render_inspection(kind: RequestKind, value: &str, result: &FingerprintResult) -> String {
    format!(
        "Value: {}\n{}: {}\nResult Code: {}\nRemaining Credits: {}\n",
        value,
        kind.fingerprint_label(),
        result.fingerprint,
        result.status_code,
        result.credits_remaining
    )
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, F: FingerprintSource + 'static> Pipeline
    for SimkeyPipeline<S, C, F>
{
    fn mode(&self) -> RunMode {
        self.config.mode()
    }

    fn kind(&self) -> RequestKind {
        self.config.request_kind()
    }

    async fn extract(&self) -> Result<Vec<InputLine>> {
        if self.config.mode() == RunMode::Lookup {
            let value = self
                .config
                .lookup_value()
                .ok_or_else(|| EtlError::MissingConfigError {
                    field: "lookup value".to_string(),
                })?;
            return Ok(vec![InputLine {
                sequence_index: 1,
                value: value.to_string(),
            }]);
        }

        let path = self
            .config
            .input_path()
            .ok_or_else(|| EtlError::MissingConfigError {
                field: "input path".to_string(),
            })?;

        tracing::debug!("Reading input from {}", path);
        let bytes = self.storage.read_file(path).await?;
        let text = String::from_utf8(bytes).map_err(|_| EtlError::InputEncodingError {
            path: path.to_string(),
        })?;

        let lines = parse_lines(&text);
        tracing::info!("📥 Read {} non-blank lines from {}", lines.len(), path);
        Ok(lines)
    }

    async fn transform(&self, lines: Vec<InputLine>) -> Result<TransformResult> {
        let mode = self.config.mode();
        tracing::info!(
            "🔎 Looking up {} values ({} kind, {} concurrent)",
            lines.len(),
            self.config.request_kind(),
            self.config.concurrent_requests().max(1)
        );

        let outcomes = self.lookup_all(&lines).await;
        let mut stats = LookupStats {
            lines_read: lines.len(),
            ..LookupStats::default()
        };

        match mode {
            RunMode::Append => {
                let mut rows = Vec::with_capacity(lines.len());
                for (line, outcome) in lines.into_iter().zip(outcomes) {
                    let fingerprint = match outcome {
                        Ok(result) => {
                            Self::note_success(&mut stats, &line, &result);
                            result.fingerprint
                        }
                        Err(e) => {
                            stats.lookups_failed += 1;
                            tracing::warn!(
                                "❌ Lookup failed for line {} ({:?}): {}",
                                line.sequence_index,
                                line.value,
                                e
                            );
                            String::new()
                        }
                    };
                    rows.push(Record::new(line.value, fingerprint, line.sequence_index));
                }
                stats.records_kept = rows.len();
                Ok(TransformResult {
                    outcome: RunOutcome::Appended(rows),
                    stats,
                })
            }
            RunMode::Report => {
                let mut store = RecordStore::new();
                for (line, outcome) in lines.into_iter().zip(outcomes) {
                    match outcome {
                        Ok(result) => {
                            Self::note_success(&mut stats, &line, &result);
                            if result.fingerprint.is_empty() {
                                tracing::debug!(
                                    "Line {} has no fingerprint, dropped",
                                    line.sequence_index
                                );
                                continue;
                            }
                            store.push(Record::new(
                                line.value,
                                result.fingerprint,
                                line.sequence_index,
                            ));
                        }
                        Err(e) => {
                            stats.lookups_failed += 1;
                            tracing::warn!(
                                "❌ Lookup failed for line {} ({:?}): {}",
                                line.sequence_index,
                                line.value,
                                e
                            );
                        }
                    }
                }

                stats.records_kept = store.len();
                if store.is_empty() {
                    tracing::warn!("No records with similarity keys found.");
                    return Ok(TransformResult {
                        outcome: RunOutcome::NoRecords,
                        stats,
                    });
                }

                let clusters = cluster(store.records());
                tracing::info!(
                    "🧩 {} records formed {} clusters",
                    store.len(),
                    clusters.len()
                );
                Ok(TransformResult {
                    outcome: RunOutcome::Clustered(clusters),
                    stats,
                })
            }
            RunMode::Lookup => {
                let (line, outcome) = lines
                    .into_iter()
                    .zip(outcomes)
                    .next()
                    .ok_or_else(|| EtlError::MissingConfigError {
                        field: "lookup value".to_string(),
                    })?;
                let result = outcome.map_err(|source| EtlError::LookupFailed {
                    value: line.value.clone(),
                    source,
                })?;
                Self::note_success(&mut stats, &line, &result);
                stats.records_kept = 1;
                Ok(TransformResult {
                    outcome: RunOutcome::Inspected {
                        value: line.value,
                        result,
                    },
                    stats,
                })
            }
        }
    }

    async fn load(&self, result: &TransformResult) -> Result<String> {
        let rendered = match &result.outcome {
            RunOutcome::Appended(rows) => render_append(rows)?,
            RunOutcome::Clustered(clusters) => render_report(clusters)?,
            RunOutcome::NoRecords => String::new(),
            RunOutcome::Inspected { value, result } => {
                render_inspection(self.config.request_kind(), value, result)
            }
        };

        let destination = self.write_output(rendered.as_bytes()).await?;
        tracing::debug!("Wrote {} bytes to {}", rendered.len(), destination);
        Ok(destination)
    }
}
