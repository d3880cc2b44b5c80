pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::{FingerprintClient, LocalStorage};
pub use crate::core::{clustering::cluster, engine::EtlEngine, pipeline::SimkeyPipeline};
pub use domain::model::{Cluster, FingerprintResult, Record, RecordStore, RequestKind, RunMode};
pub use utils::error::{EtlError, LookupError, Result};
