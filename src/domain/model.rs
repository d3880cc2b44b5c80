use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 查詢種類：決定呼叫哪個端點、帶哪個參數、讀哪個回應欄位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Company,
    Person,
    Address,
    #[serde(alias = "org")]
    #[cfg_attr(feature = "cli", value(alias = "org"))]
    Organization,
}

impl RequestKind {
    pub fn endpoint(&self) -> &'static str {
        match self {
            RequestKind::Company => "getcompanymatchadvanced",
            RequestKind::Person => "getfullnamematch",
            RequestKind::Address => "getaddressmatchadvanced",
            RequestKind::Organization => "getorgstandard",
        }
    }

    /// Query parameter that carries the value being matched.
    pub fn value_param(&self) -> &'static str {
        match self {
            RequestKind::Company => "company",
            RequestKind::Person => "fullname",
            RequestKind::Address => "address",
            RequestKind::Organization => "org",
        }
    }

    pub fn fingerprint_field(&self) -> &'static str {
        match self {
            RequestKind::Organization => "Standard",
            _ => "SimKey",
        }
    }

    pub fn default_algorithm(&self) -> Option<&'static str> {
        match self {
            RequestKind::Company => Some("model-v4-wide"),
            RequestKind::Address => Some("model-v3-narrow"),
            RequestKind::Person | RequestKind::Organization => None,
        }
    }

    pub fn fingerprint_label(&self) -> &'static str {
        match self {
            RequestKind::Organization => "Standardized Value",
            _ => "Similarity Key",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestKind::Company => "company",
            RequestKind::Person => "person",
            RequestKind::Address => "address",
            RequestKind::Organization => "organization",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// One row per input line, fingerprint possibly empty.
    Append,
    /// Only clusters of two or more matching inputs.
    Report,
    /// Inspect a single value.
    Lookup,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunMode::Append => "append",
            RunMode::Report => "report",
            RunMode::Lookup => "lookup",
        };
        f.write_str(name)
    }
}

pub const SUCCESS_CODE: &str = "Success";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FingerprintResult {
    pub fingerprint: String,
    pub status_code: String,
    pub credits_remaining: String,
}

impl FingerprintResult {
    pub fn is_success(&self) -> bool {
        self.status_code == SUCCESS_CODE
    }

    /// 服務回報非成功代碼時只是警告，指紋仍可使用
    pub fn service_warning(&self) -> Option<crate::utils::error::LookupError> {
        if self.is_success() {
            None
        } else {
            Some(crate::utils::error::LookupError::SoftServiceWarning {
                code: self.status_code.clone(),
            })
        }
    }
}

/// 一行非空白輸入，sequence_index 為原始檔案的行號 (從 1 起算)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLine {
    pub sequence_index: usize,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub input: String,
    pub fingerprint: String,
    pub sequence_index: usize,
}

impl Record {
    pub fn new(
        input: impl Into<String>,
        fingerprint: impl Into<String>,
        sequence_index: usize,
    ) -> Self {
        Self {
            input: input.into(),
            fingerprint: fingerprint.into(),
            sequence_index,
        }
    }

    pub fn has_fingerprint(&self) -> bool {
        !self.fingerprint.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cluster {
    pub fingerprint: String,
    pub members: Vec<Record>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Append-only, kept in input order.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

/// Transform 階段的結果，依執行模式不同
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Every processed line, in input order.
    Appended(Vec<Record>),
    Clustered(Vec<Cluster>),
    /// Report mode found nothing with a fingerprint.
    NoRecords,
    Inspected {
        value: String,
        result: FingerprintResult,
    },
}

#[derive(Debug, Clone, Default)]
pub struct LookupStats {
    pub lines_read: usize,
    pub lookups_failed: usize,
    pub warnings: usize,
    /// Records that reached the output (append) or the store (report).
    pub records_kept: usize,
    pub credits_remaining: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub outcome: RunOutcome,
    pub stats: LookupStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub mode: RunMode,
    pub kind: RequestKind,
    pub lines_read: usize,
    pub lookups_failed: usize,
    pub warnings: usize,
    pub records: usize,
    pub clusters: usize,
    pub credits_remaining: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub output: String,
}

impl RunSummary {
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_kind_routing() {
        assert_eq!(RequestKind::Company.endpoint(), "getcompanymatchadvanced");
        assert_eq!(RequestKind::Person.value_param(), "fullname");
        assert_eq!(RequestKind::Address.default_algorithm(), Some("model-v3-narrow"));
        assert_eq!(RequestKind::Organization.fingerprint_field(), "Standard");
        assert_eq!(RequestKind::Person.default_algorithm(), None);
    }

    #[test]
    fn test_request_kind_deserializes_org_alias() {
        #[derive(Deserialize)]
        struct Holder {
            kind: RequestKind,
        }
        let holder: Holder = toml::from_str(r#"kind = "org""#).unwrap();
        assert_eq!(holder.kind, RequestKind::Organization);
        let holder: Holder = toml::from_str(r#"kind = "person""#).unwrap();
        assert_eq!(holder.kind, RequestKind::Person);
    }

    #[test]
    fn test_service_warning_only_on_non_success() {
        let ok = FingerprintResult {
            fingerprint: "K1".to_string(),
            status_code: "Success".to_string(),
            credits_remaining: "100".to_string(),
        };
        assert!(ok.service_warning().is_none());

        let soft = FingerprintResult {
            status_code: "Insufficient credits".to_string(),
            ..ok
        };
        assert!(soft.service_warning().is_some());
    }

    #[test]
    fn test_record_store_keeps_insertion_order() {
        let mut store = RecordStore::new();
        store.push(Record::new("b", "K2", 1));
        store.push(Record::new("a", "K1", 2));
        assert_eq!(store.len(), 2);
        assert_eq!(store.records()[0].input, "b");
        assert_eq!(store.into_records()[1].sequence_index, 2);
    }
}
