//! Runtime configuration loaded from the environment (and `.env` when present).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::status::{Integration, IntegrationKind};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_JWT_SECRET: &str = "dha-portal-jwt-secret-change-in-production";
const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_VERIFICATION_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
const DEFAULT_STATIC_DIR: &str = "./static";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("invalid integration entry '{0}', expected name=kind:url")]
    InvalidIntegration(String),
}

/// Server-side configuration.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub bind_addr: String,
    pub port: u16,
    pub jwt_secret: String,
    pub admin_username: String,
    /// bcrypt hash of the operator password. When absent the server runs in
    /// development mode and accepts the default credentials.
    pub admin_password_hash: Option<String>,
    pub verification_base_url: String,
    pub status_poll_interval: Duration,
    pub integrations: Vec<Integration>,
    pub static_dir: PathBuf,
    pub allowed_origins: Vec<String>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            admin_username: DEFAULT_ADMIN_USERNAME.to_string(),
            admin_password_hash: None,
            verification_base_url: DEFAULT_VERIFICATION_BASE_URL.to_string(),
            status_poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            integrations: Vec::new(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            allowed_origins: vec![
                "http://localhost:5000".to_string(),
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5000".to_string(),
            ],
        }
    }
}

impl PortalConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let port = match env::var("PORT") {
            Ok(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT",
                value,
            })?,
            Err(_) => defaults.port,
        };

        let poll_secs: u64 = match env::var("STATUS_POLL_INTERVAL_SECS") {
            Ok(value) => match value.parse() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "STATUS_POLL_INTERVAL_SECS",
                        value,
                    })
                }
            },
            Err(_) => DEFAULT_POLL_INTERVAL_SECS,
        };

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            log::warn!("JWT_SECRET not set, using default secret. SET THIS IN PRODUCTION!");
            defaults.jwt_secret.clone()
        });

        let integrations = match env::var("INTEGRATIONS") {
            Ok(value) => parse_integrations(&value)?,
            Err(_) => defaults.integrations.clone(),
        };

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or(defaults.allowed_origins);

        Ok(Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port,
            jwt_secret,
            admin_username: env::var("ADMIN_USERNAME").unwrap_or(defaults.admin_username),
            admin_password_hash: env::var("ADMIN_PASSWORD_HASH")
                .ok()
                .filter(|s| !s.is_empty()),
            verification_base_url: env::var("VERIFICATION_BASE_URL")
                .unwrap_or(defaults.verification_base_url),
            status_poll_interval: Duration::from_secs(poll_secs),
            integrations,
            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            allowed_origins,
        })
    }
}

/// Parse `name=kind:url` entries separated by commas.
///
/// `kind` is one of `ai`, `blockchain` or `government`.
pub fn parse_integrations(value: &str) -> Result<Vec<Integration>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, rest) = entry
                .split_once('=')
                .ok_or_else(|| ConfigError::InvalidIntegration(entry.to_string()))?;
            let (kind, url) = rest
                .split_once(':')
                .ok_or_else(|| ConfigError::InvalidIntegration(entry.to_string()))?;
            let kind = IntegrationKind::parse(kind)
                .ok_or_else(|| ConfigError::InvalidIntegration(entry.to_string()))?;
            if name.trim().is_empty() || url.trim().is_empty() {
                return Err(ConfigError::InvalidIntegration(entry.to_string()));
            }
            Ok(Integration::new(name.trim(), kind, url.trim()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integrations() {
        let parsed = parse_integrations(
            "openai=ai:https://api.openai.com/v1/models, polygon=blockchain:https://polygon-rpc.com",
        )
        .unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].name, "openai");
        assert_eq!(parsed[0].kind, IntegrationKind::AiProvider);
        assert_eq!(parsed[0].url, "https://api.openai.com/v1/models");
        assert_eq!(parsed[1].kind, IntegrationKind::Blockchain);
    }

    #[test]
    fn test_parse_integrations_rejects_malformed_entry() {
        assert!(parse_integrations("openai").is_err());
        assert!(parse_integrations("openai=quantum:https://x").is_err());
    }

    #[test]
    fn test_default_poll_interval() {
        assert_eq!(
            PortalConfig::default().status_poll_interval,
            Duration::from_secs(30)
        );
    }
}
