use crate::adapters::http::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::config::{validate_settings, DEFAULT_APPEND_OUTPUT, DEFAULT_CONCURRENT_REQUESTS};
use crate::core::ConfigProvider;
use crate::domain::model::{RequestKind, RunMode};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "simkey")]
#[command(about = "Append similarity keys to a file of values, or report groups of matching values")]
pub struct CliConfig {
    /// append: one row per line; report: matching clusters only; lookup: inspect one value
    #[arg(long, value_enum, default_value_t = RunMode::Append)]
    pub mode: RunMode,

    #[arg(long, value_enum, default_value_t = RequestKind::Company)]
    pub kind: RequestKind,

    /// Text file with one value per line
    #[arg(short, long)]
    pub input: Option<String>,

    /// Output file (append mode defaults to output.csv, report mode to stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Value to inspect in lookup mode
    #[arg(long)]
    pub value: Option<String>,

    #[arg(long, env = "INTERZOID_API_KEY", hide_env_values = true, default_value = "")]
    pub api_key: String,

    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Matching algorithm, for kinds that take one
    #[arg(long)]
    pub algorithm: Option<String>,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    #[arg(long, default_value_t = DEFAULT_CONCURRENT_REQUESTS)]
    pub concurrent_requests: usize,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

impl ConfigProvider for CliConfig {
    fn api_key(&self) -> &str {
        &self.api_key
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request_kind(&self) -> RequestKind {
        self.kind
    }

    fn algorithm(&self) -> Option<&str> {
        self.algorithm.as_deref()
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests
    }

    fn mode(&self) -> RunMode {
        self.mode
    }

    fn input_path(&self) -> Option<&str> {
        self.input.as_deref()
    }

    fn output_path(&self) -> Option<&str> {
        match (self.output.as_deref(), self.mode) {
            (Some(path), _) => Some(path),
            (None, RunMode::Append) => Some(DEFAULT_APPEND_OUTPUT),
            (None, _) => None,
        }
    }

    fn lookup_value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_settings(self)
    }
}
