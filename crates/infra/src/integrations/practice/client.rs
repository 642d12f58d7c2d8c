/// HTTP client for the legacy practice-management billing API
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use tallysync_domain::{
    DateWindow, PracticeConfig, RawBillingResponse, Result, TallySyncError,
};
use tallysync_core::BillingSource;
use tracing::{debug, warn};

use crate::http::HttpClient;

const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

/// Provides bearer tokens for the practice-management API.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Retrieve a bearer token to authorize billing API calls.
    async fn access_token(&self) -> Result<String>;
}

/// Token provider backed by a fixed API token, for deployments where the
/// legacy system issues long-lived keys.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

/// Client for the legacy billing records endpoint.
pub struct PracticeClient {
    base_url: String,
    http_client: HttpClient,
    access_token_provider: Arc<dyn AccessTokenProvider>,
}

impl PracticeClient {
    /// Create a new practice client from configuration.
    pub fn new(
        config: &PracticeConfig,
        access_token_provider: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .max_attempts(config.max_retries.max(1))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
            access_token_provider,
        })
    }

    /// Check if the practice-management server is reachable.
    ///
    /// Performs a lightweight HEAD request to the /health endpoint with a
    /// short timeout. Network failures read as "unreachable", not as errors.
    pub async fn check_health(&self) -> Result<bool> {
        let endpoint = format!("{}/health", self.base_url);

        let health_client = HttpClient::builder()
            .timeout(Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS))
            .max_attempts(1)
            .build()?;

        let builder = health_client.request(Method::HEAD, &endpoint);
        match health_client.send(builder).await {
            Ok(response) => Ok(response.status().is_success()),
            Err(TallySyncError::Network(_)) => {
                warn!("practice health check failed: network error");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl BillingSource for PracticeClient {
    async fn fetch_records(&self, window: &DateWindow) -> Result<RawBillingResponse> {
        let endpoint = format!(
            "{}/api/timecards?from={}&to={}",
            self.base_url, window.start, window.end
        );
        let token = self.access_token_provider.access_token().await?;

        let builder = self.http_client.request(Method::GET, &endpoint).bearer_auth(token);
        let response = self.http_client.send(builder).await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(TallySyncError::Auth(format!(
                "billing API rejected credentials ({status})"
            )));
        }
        if !status.is_success() {
            return Err(TallySyncError::Network(format!(
                "billing API returned {status} for {window}"
            )));
        }

        let body = response.text().await.map_err(|err| {
            TallySyncError::Network(format!("failed to read billing response body: {err}"))
        })?;

        // The legacy API occasionally returns HTML error pages with a 200
        // status; treat those as an empty window rather than failing the run.
        match serde_json::from_str::<RawBillingResponse>(&body) {
            Ok(parsed) => {
                debug!(
                    %window,
                    records = parsed.records.as_ref().map_or(0, Vec::len),
                    "fetched billing records"
                );
                Ok(parsed)
            }
            Err(err) => {
                warn!(%window, error = %err, "billing response was not valid JSON; treating as empty");
                Ok(RawBillingResponse::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_provider_returns_its_token() {
        let provider = StaticTokenProvider::new("secret-token");
        assert_eq!(provider.access_token().await.unwrap(), "secret-token");
    }

    #[test]
    fn base_url_is_normalized() {
        let config = PracticeConfig {
            base_url: "http://localhost:3000/".to_string(),
            timeout_secs: 30,
            max_retries: 3,
        };
        let client =
            PracticeClient::new(&config, Arc::new(StaticTokenProvider::new("t"))).unwrap();
        assert_eq!(client.base_url, "http://localhost:3000");
    }
}
