use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{json, Value};

use super::{Integration, IntegrationKind, ProbeError, StatusProbe};

const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);
const SIMULATED_SCHEME: &str = "simulated://";

/// Probes integrations over HTTP.
///
/// AI providers and government APIs get a `GET` that must return 2xx.
/// Blockchain nodes get a JSON-RPC `eth_blockNumber` call that must return a
/// `result`.
pub struct HttpProbe {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn probe_get(&self, url: &str) -> Result<(), ProbeError> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ProbeError::HttpStatus(status.as_u16()))
        }
    }

    async fn probe_json_rpc(&self, url: &str) -> Result<(), ProbeError> {
        let response = self
            .client
            .post(url)
            .timeout(self.timeout)
            .json(&json!({
                "jsonrpc": "2.0",
                "method": "eth_blockNumber",
                "params": [],
                "id": 1
            }))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::HttpStatus(status.as_u16()));
        }

        let body: Value = response.json().await.map_err(map_reqwest_error)?;
        check_rpc_body(&body)
    }
}

fn map_reqwest_error(e: reqwest::Error) -> ProbeError {
    if e.is_timeout() {
        ProbeError::Timeout
    } else {
        ProbeError::Network(e.to_string())
    }
}

fn check_rpc_body(body: &Value) -> Result<(), ProbeError> {
    if let Some(error) = body.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(ProbeError::Rpc(message.to_string()));
    }
    match body.get("result") {
        Some(Value::Null) | None => Err(ProbeError::Rpc("response has no result".to_string())),
        Some(_) => Ok(()),
    }
}

#[async_trait]
impl StatusProbe for HttpProbe {
    async fn probe(&self, integration: &Integration) -> Result<(), ProbeError> {
        if integration.url.starts_with(SIMULATED_SCHEME) {
            return Ok(());
        }
        match integration.kind {
            IntegrationKind::Blockchain => self.probe_json_rpc(&integration.url).await,
            IntegrationKind::AiProvider | IntegrationKind::GovernmentApi => {
                self.probe_get(&integration.url).await
            }
        }
    }
}

/// Probe with programmatically set outcomes. Integrations without an
/// explicit outcome are reported connected.
#[derive(Default)]
pub struct StaticProbe {
    outcomes: RwLock<HashMap<String, Result<(), ProbeError>>>,
}

impl StaticProbe {
    pub fn set_connected(&self, name: &str) {
        self.outcomes.write().insert(name.to_string(), Ok(()));
    }

    pub fn set_failure(&self, name: &str, error: ProbeError) {
        self.outcomes.write().insert(name.to_string(), Err(error));
    }
}

#[async_trait]
impl StatusProbe for StaticProbe {
    async fn probe(&self, integration: &Integration) -> Result<(), ProbeError> {
        self.outcomes
            .read()
            .get(&integration.name)
            .cloned()
            .unwrap_or(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_rpc_body() {
        assert!(check_rpc_body(&json!({"jsonrpc": "2.0", "id": 1, "result": "0x10d4f"})).is_ok());
        assert_eq!(
            check_rpc_body(&json!({"error": {"code": -32601, "message": "method not found"}})),
            Err(ProbeError::Rpc("method not found".to_string()))
        );
        assert!(check_rpc_body(&json!({"result": null})).is_err());
    }

    #[tokio::test]
    async fn test_simulated_integration_is_connected() {
        let probe = HttpProbe::new(reqwest::Client::new());
        let integration = Integration::new(
            "home-affairs-npr",
            IntegrationKind::GovernmentApi,
            "simulated://npr",
        );
        assert!(probe.probe(&integration).await.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        // Bind and immediately release a port so nothing is listening on it.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let probe = HttpProbe::new(reqwest::Client::new()).with_timeout(Duration::from_secs(2));
        let integration = Integration::new(
            "openai",
            IntegrationKind::AiProvider,
            format!("http://127.0.0.1:{}/health", port),
        );
        let err = probe.probe(&integration).await.unwrap_err();
        assert!(matches!(err, ProbeError::Network(_) | ProbeError::Timeout));
    }
}
