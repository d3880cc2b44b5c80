use crate::domain::model::{FingerprintResult, InputLine, RequestKind, RunMode, TransformResult};
use crate::utils::error::{LookupError, Result};
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_key(&self) -> &str;
    fn base_url(&self) -> &str;
    fn request_kind(&self) -> RequestKind;
    /// Explicit algorithm; `None` falls back to the kind's default.
    fn algorithm(&self) -> Option<&str>;
    fn timeout(&self) -> Duration;
    fn concurrent_requests(&self) -> usize;
    fn mode(&self) -> RunMode;
    fn input_path(&self) -> Option<&str>;
    /// `None` means stdout.
    fn output_path(&self) -> Option<&str>;
    fn lookup_value(&self) -> Option<&str>;
}

/// 外部指紋服務的介面，一次呼叫只發一個請求
#[async_trait]
pub trait FingerprintSource: Send + Sync {
    async fn lookup(
        &self,
        value: &str,
        kind: RequestKind,
    ) -> std::result::Result<FingerprintResult, LookupError>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    fn mode(&self) -> RunMode;
    fn kind(&self) -> RequestKind;
    async fn extract(&self) -> Result<Vec<InputLine>>;
    async fn transform(&self, lines: Vec<InputLine>) -> Result<TransformResult>;
    /// Renders and writes the result, returning where it went.
    async fn load(&self, result: &TransformResult) -> Result<String>;
}
