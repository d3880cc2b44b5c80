#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::TomlConfig;

use crate::core::ConfigProvider;
use crate::domain::model::RunMode;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_api_key, validate_non_empty_string, validate_path, validate_positive_number,
    validate_required_field, validate_url,
};

pub const DEFAULT_APPEND_OUTPUT: &str = "output.csv";
pub const DEFAULT_CONCURRENT_REQUESTS: usize = 1;

/// 兩種設定來源共用的檢查
pub fn validate_settings<C: ConfigProvider>(config: &C) -> Result<()> {
    validate_api_key("api_key", config.api_key())?;
    validate_url("base_url", config.base_url())?;
    validate_positive_number("concurrent_requests", config.concurrent_requests(), 1)?;

    if config.timeout().is_zero() {
        return Err(EtlError::InvalidConfigValueError {
            field: "timeout".to_string(),
            value: "0".to_string(),
            reason: "Timeout must be at least one second".to_string(),
        });
    }

    if let Some(algorithm) = config.algorithm() {
        validate_non_empty_string("algorithm", algorithm)?;
    }

    match config.mode() {
        RunMode::Append | RunMode::Report => {
            validate_path("input", validate_required_field("input", &config.input_path())?)?;
        }
        RunMode::Lookup => {
            let lookup_value = config.lookup_value();
            let value = validate_required_field("value", &lookup_value)?;
            if value.is_empty() {
                return Err(EtlError::InvalidConfigValueError {
                    field: "value".to_string(),
                    value: String::new(),
                    reason: "Lookup value cannot be empty".to_string(),
                });
            }
        }
    }

    if let Some(output) = config.output_path() {
        validate_path("output", output)?;
    }

    Ok(())
}
