pub mod clustering;
pub mod engine;
pub mod formatter;
pub mod pipeline;
pub mod response;

pub use crate::domain::model::{Cluster, Record, RecordStore, TransformResult};
pub use crate::domain::ports::{ConfigProvider, FingerprintSource, Pipeline, Storage};
pub use crate::utils::error::Result;
