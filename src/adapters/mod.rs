// Adapters layer: concrete implementations for external systems.

pub mod http;
pub mod storage;

pub use http::FingerprintClient;
pub use storage::LocalStorage;
