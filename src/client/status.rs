use std::time::Duration;

use moka::future::Cache;

use crate::status::handlers::StatusReport;

use super::{build_http_client, classify_status, transport_error, ClientError, ResponseClass};

const STATUS_PATH: &str = "/api/ultra-ai/status";
const STATUS_CACHE_KEY: &str = "status";
const DEFAULT_TTL: Duration = Duration::from_secs(5);

/// Reads the integration status report for the dashboard.
///
/// Responses are kept for a few seconds so several widgets rendering at
/// once share one request.
pub struct StatusClient {
    http: reqwest::Client,
    base_url: String,
    cache: Cache<&'static str, StatusReport>,
}

impl StatusClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Ok(Self::with_ttl(build_http_client()?, base_url, DEFAULT_TTL))
    }

    pub fn with_ttl(http: reqwest::Client, base_url: impl Into<String>, ttl: Duration) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache: Cache::builder().time_to_live(ttl).max_capacity(1).build(),
        }
    }

    pub async fn fetch(&self) -> Result<StatusReport, ClientError> {
        if let Some(report) = self.cache.get(STATUS_CACHE_KEY).await {
            return Ok(report);
        }

        let response = self
            .http
            .get(format!("{}{}", self.base_url, STATUS_PATH))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if classify_status(status) != ResponseClass::Success {
            return Err(ClientError::ServiceUnavailable(format!(
                "status endpoint responded with {}",
                status
            )));
        }

        let report: StatusReport = response.json().await.map_err(transport_error)?;
        self.cache.insert(STATUS_CACHE_KEY, report.clone()).await;
        Ok(report)
    }

    /// Drop the cached report so the next [`fetch`](Self::fetch) hits the server.
    pub async fn invalidate(&self) {
        self.cache.invalidate(STATUS_CACHE_KEY).await;
    }
}
