use thiserror::Error;

/// 單筆查詢的失敗，只在該筆記錄範圍內處理，不會中止整個執行
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service returned HTTP {status}")]
    BadStatus { status: u16 },

    #[error("empty or unparseable response: {reason}")]
    EmptyResponse { reason: String },

    #[error("service reported non-success code: {code}")]
    SoftServiceWarning { code: String },

    /// 查詢任務 panic 或被取消，沒有任何回應
    #[error("lookup did not complete: {reason}")]
    Interrupted { reason: String },
}

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Cannot read input '{path}': {source}")]
    InputError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Input '{path}' is not valid UTF-8 text")]
    InputEncodingError { path: String },

    #[error("Cannot write output '{path}': {source}")]
    OutputError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("Lookup failed for '{value}': {source}")]
    LookupFailed {
        value: String,
        #[source]
        source: LookupError,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Output,
    Network,
    Configuration,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::InputError { .. } | EtlError::InputEncodingError { .. } => {
                ErrorCategory::Input
            }
            EtlError::OutputError { .. } | EtlError::CsvError(_) | EtlError::IoError(_) => {
                ErrorCategory::Output
            }
            EtlError::HttpClientError(_) | EtlError::LookupFailed { .. } => ErrorCategory::Network,
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    /// 給終端使用者看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("Input problem: {}", self),
            ErrorCategory::Output => format!("Output problem: {}", self),
            ErrorCategory::Network => format!("Service problem: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::InputError { .. } => "Check that the input file exists and is readable",
            EtlError::InputEncodingError { .. } => "Re-save the input file as UTF-8 text",
            EtlError::OutputError { .. } | EtlError::IoError(_) => {
                "Check that the output directory exists and is writable"
            }
            EtlError::CsvError(_) => "Check available disk space and output permissions",
            EtlError::HttpClientError(_) => "Check TLS support and the request timeout setting",
            EtlError::LookupFailed { .. } => {
                "Check the API key, the network connection and the service base URL"
            }
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => {
                "Review the command line flags or the TOML configuration file"
            }
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration => 2,
            ErrorCategory::Input => 3,
            ErrorCategory::Output => 4,
            ErrorCategory::Network => 5,
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
