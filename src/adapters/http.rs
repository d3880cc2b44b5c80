use crate::core::response::decode_response;
use crate::domain::model::{FingerprintResult, RequestKind};
use crate::domain::ports::{ConfigProvider, FingerprintSource};
use crate::utils::error::{LookupError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.interzoid.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// 呼叫遠端比對服務取得相似度指紋。不重試、不快取、不限速
pub struct FingerprintClient {
    client: Client,
    base_url: String,
    api_key: String,
    algorithm: Option<String>,
}

impl FingerprintClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        algorithm: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            algorithm,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.base_url(),
            config.api_key(),
            config.algorithm().map(str::to_string),
            config.timeout(),
        )
    }

    fn endpoint_url(&self, kind: RequestKind) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), kind.endpoint())
    }

    /// Only kinds with a default algorithm accept the parameter.
    fn algorithm_for(&self, kind: RequestKind) -> Option<&str> {
        let default = kind.default_algorithm()?;
        Some(self.algorithm.as_deref().unwrap_or(default))
    }
}

#[async_trait]
impl FingerprintSource for FingerprintClient {
    async fn lookup(
        &self,
        value: &str,
        kind: RequestKind,
    ) -> std::result::Result<FingerprintResult, LookupError> {
        let mut query: Vec<(&str, &str)> = vec![
            ("license", self.api_key.as_str()),
            (kind.value_param(), value),
        ];
        if let Some(algorithm) = self.algorithm_for(kind) {
            query.push(("algorithm", algorithm));
        }

        let url = self.endpoint_url(kind);
        tracing::debug!("Requesting {} lookup from {}", kind, url);

        let response = self.client.get(&url).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::BadStatus {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        decode_response(&body, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer, timeout: Duration) -> FingerprintClient {
        FingerprintClient::new(server.base_url(), "test-key", None, timeout).unwrap()
    }

    #[tokio::test]
    async fn test_company_lookup_sends_license_value_and_algorithm() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/getcompanymatchadvanced")
                .query_param("license", "test-key")
                .query_param("company", "Smith & Sons, Inc.")
                .query_param("algorithm", "model-v4-wide");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "SimKey": "K1",
                    "Code": "Success",
                    "Credits": "99"
                }));
        });

        let client = client_for(&server, Duration::from_secs(5));
        let result = client
            .lookup("Smith & Sons, Inc.", RequestKind::Company)
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(result.fingerprint, "K1");
        assert_eq!(result.credits_remaining, "99");
        assert!(result.service_warning().is_none());
    }

    #[tokio::test]
    async fn test_person_lookup_has_no_algorithm() {
        let server = MockServer::start();
        let with_algorithm = server.mock(|when, then| {
            when.method(GET)
                .path("/getfullnamematch")
                .query_param_exists("algorithm");
            then.status(400);
        });
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/getfullnamematch")
                .query_param("fullname", "James Johnston");
            then.status(200).json_body(serde_json::json!({
                "SimKey": "JJ",
                "Code": "Success",
                "Credits": "5"
            }));
        });

        let client = FingerprintClient::new(
            server.base_url(),
            "test-key",
            Some("model-v4-narrow".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        let result = client
            .lookup("James Johnston", RequestKind::Person)
            .await
            .unwrap();

        with_algorithm.assert_hits(0);
        api_mock.assert();
        assert_eq!(result.fingerprint, "JJ");
    }

    #[tokio::test]
    async fn test_configured_algorithm_overrides_default() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/getaddressmatchadvanced")
                .query_param("algorithm", "model-v3-wide");
            then.status(200).json_body(serde_json::json!({
                "SimKey": "A1",
                "Code": "Success",
                "Credits": "5"
            }));
        });

        let client = FingerprintClient::new(
            server.base_url(),
            "test-key",
            Some("model-v3-wide".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        let result = client
            .lookup("400 East Broadway St", RequestKind::Address)
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(result.fingerprint, "A1");
    }

    #[tokio::test]
    async fn test_non_success_code_is_soft_warning() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/getorgstandard");
            then.status(200).json_body(serde_json::json!({
                "Standard": "IBM",
                "Code": "Partial",
                "Credits": "3"
            }));
        });

        let client = client_for(&server, Duration::from_secs(5));
        let result = client
            .lookup("International Business Machines", RequestKind::Organization)
            .await
            .unwrap();

        assert_eq!(result.fingerprint, "IBM");
        assert!(matches!(
            result.service_warning(),
            Some(LookupError::SoftServiceWarning { code }) if code == "Partial"
        ));
    }

    #[tokio::test]
    async fn test_non_2xx_is_bad_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/getcompanymatchadvanced");
            then.status(403).body("license expired");
        });

        let client = client_for(&server, Duration::from_secs(5));
        let err = client.lookup("IBM", RequestKind::Company).await.unwrap_err();
        assert!(matches!(err, LookupError::BadStatus { status: 403 }));
    }

    #[tokio::test]
    async fn test_empty_body_is_empty_response() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/getcompanymatchadvanced");
            then.status(200).body("");
        });

        let client = client_for(&server, Duration::from_secs(5));
        let err = client.lookup("IBM", RequestKind::Company).await.unwrap_err();
        assert!(matches!(err, LookupError::EmptyResponse { .. }));
    }

    #[tokio::test]
    async fn test_timeout_is_transport_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/getcompanymatchadvanced");
            then.status(200)
                .delay(Duration::from_millis(1500))
                .json_body(serde_json::json!({"SimKey": "late", "Code": "Success"}));
        });

        let client = client_for(&server, Duration::from_millis(200));
        let err = client.lookup("IBM", RequestKind::Company).await.unwrap_err();
        assert!(matches!(err, LookupError::Transport(ref e) if e.is_timeout()));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_failure() {
        // Port 9 (discard) on localhost is not served by the mock.
        let client = FingerprintClient::new(
            "http://127.0.0.1:9",
            "test-key",
            None,
            Duration::from_secs(2),
        )
        .unwrap();
        let err = client.lookup("IBM", RequestKind::Company).await.unwrap_err();
        assert!(matches!(err, LookupError::Transport(_)));
    }
}
