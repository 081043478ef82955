//! Shared application state handed to every handler.

use std::sync::Arc;

use prometheus::Registry;

use crate::auth::TokenService;
use crate::config::PortalConfig;
use crate::generation::{GenerationService, LocalGenerationService};
use crate::metrics::GenerationMetrics;
use crate::status::{HttpProbe, StatusMonitor};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<PortalConfig>,
    pub tokens: Arc<TokenService>,
    pub generator: Arc<dyn GenerationService>,
    pub monitor: Arc<StatusMonitor>,
    pub metrics: GenerationMetrics,
    pub registry: Registry,
}

impl AppState {
    /// Build the state with the local generator and start the status
    /// monitor. Must be called inside a Tokio runtime.
    pub fn new(config: PortalConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let http_client = reqwest::Client::builder()
            .pool_idle_timeout(std::time::Duration::from_secs(900))
            .user_agent(concat!("dha-document-portal/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let probe = Arc::new(HttpProbe::new(http_client));
        let monitor = StatusMonitor::start(
            config.integrations.clone(),
            probe,
            config.status_poll_interval,
        );
        let generator = Arc::new(LocalGenerationService::new(
            config.verification_base_url.clone(),
        ));

        Self::with_parts(config, generator, Arc::new(monitor))
    }

    pub fn with_parts(
        config: PortalConfig,
        generator: Arc<dyn GenerationService>,
        monitor: Arc<StatusMonitor>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let registry = Registry::new();
        let metrics = GenerationMetrics::new()?;
        metrics.register(&registry)?;

        Ok(Self {
            tokens: Arc::new(TokenService::new(config.jwt_secret.clone())),
            config: Arc::new(config),
            generator,
            monitor,
            metrics,
            registry,
        })
    }
}
