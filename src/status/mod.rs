//! Integration status monitoring for the dashboard.
//!
//! A single [`StatusMonitor`] owns one timer per configured integration and
//! fans probe results out to subscribers, so any number of dashboard views can
//! watch the same integrations without issuing duplicate probes.

pub mod handlers;
pub mod monitor;
pub mod probe;

pub use monitor::StatusMonitor;
pub use probe::{HttpProbe, StaticProbe};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationKind {
    AiProvider,
    Blockchain,
    GovernmentApi,
}

impl IntegrationKind {
    /// Parse the short form used in configuration: `ai`, `blockchain`, `government`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ai" | "ai_provider" => Some(Self::AiProvider),
            "blockchain" | "chain" => Some(Self::Blockchain),
            "government" | "gov" | "government_api" => Some(Self::GovernmentApi),
            _ => None,
        }
    }
}

/// An external system the dashboard reports on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Integration {
    pub name: String,
    pub kind: IntegrationKind,
    /// Health endpoint. Blockchain integrations point at a JSON-RPC node;
    /// `simulated://` URLs are always reported connected.
    pub url: String,
}

impl Integration {
    pub fn new(name: impl Into<String>, kind: IntegrationKind, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            url: url.into(),
        }
    }
}

/// Last-known connectivity of one integration. The latest poll wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationStatus {
    pub name: String,
    pub kind: IntegrationKind,
    pub connected: bool,
    /// `None` until the first probe completes.
    pub last_check: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl IntegrationStatus {
    pub fn pending(integration: &Integration) -> Self {
        Self {
            name: integration.name.clone(),
            kind: integration.kind,
            connected: false,
            last_check: None,
            latency_ms: None,
            last_error: None,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProbeError {
    #[error("network error: {0}")]
    Network(String),
    #[error("probe timed out")]
    Timeout,
    #[error("unexpected HTTP status {0}")]
    HttpStatus(u16),
    #[error("JSON-RPC error: {0}")]
    Rpc(String),
}

/// Checks whether one integration is reachable.
#[async_trait]
pub trait StatusProbe: Send + Sync {
    async fn probe(&self, integration: &Integration) -> Result<(), ProbeError>;
}
