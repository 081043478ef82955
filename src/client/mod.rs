//! HTTP clients for the portal API, used by the console front end.
//!
//! Every call is a single attempt: failures are classified and handed back,
//! the caller decides whether to try again.

pub mod auth;
pub mod status;

pub use auth::AuthClient;
pub use status::StatusClient;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::catalog;
use crate::forms::{validate_for, PersonalDataRecord, ValidationError, ValidationErrors};
use crate::generation::handlers::GenerateRequest;
use crate::generation::{GenerationOptions, GenerationResult};
use crate::session::{Session, StoreError, LOGIN_ROUTE};

const GENERATE_PATH: &str = "/api/dha/documents/generate";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("unknown document type '{0}'")]
    UnknownDocumentType(String),
    /// Rejected locally; nothing was sent.
    #[error("{0}")]
    Invalid(ValidationErrors),
    #[error("a submission is already in progress")]
    SubmissionInFlight,
    /// Rejected by the server.
    #[error("request rejected: {message}")]
    ValidationRejected {
        message: String,
        field_errors: Vec<ValidationError>,
    },
    #[error("not authorized: {message}")]
    Unauthorized {
        message: String,
        redirect: &'static str,
    },
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ClientError {
    /// Route the UI should navigate to, if any.
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            Self::Unauthorized { redirect, .. } => Some(redirect),
            _ => None,
        }
    }
}

/// Coarse outcome of an HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    Success,
    Rejected,
    Unauthorized,
    Unavailable,
}

pub fn classify_status(status: StatusCode) -> ResponseClass {
    match status.as_u16() {
        200..=299 => ResponseClass::Success,
        400 | 422 => ResponseClass::Rejected,
        401 | 403 => ResponseClass::Unauthorized,
        _ => ResponseClass::Unavailable,
    }
}

/// Body of an error response. Every field is optional so any JSON shape the
/// server returns still yields a message.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
    field_errors: Vec<ValidationError>,
}

impl ErrorBody {
    fn parse(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_default()
    }

    fn message_or(&self, fallback: &str) -> String {
        self.message
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| fallback.to_string())
    }
}

pub(crate) fn build_http_client() -> Result<reqwest::Client, ClientError> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("dha-document-portal/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ClientError::ServiceUnavailable(e.to_string()))
}

pub(crate) fn transport_error(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::ServiceUnavailable("request timed out".to_string())
    } else {
        ClientError::ServiceUnavailable(e.to_string())
    }
}

/// Clears `flag` when dropped.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Submits generation requests on behalf of the signed-in operator.
pub struct GenerationClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
    in_flight: AtomicBool,
}

impl GenerationClient {
    pub fn new(base_url: impl Into<String>, session: Arc<Session>) -> Result<Self, ClientError> {
        Ok(Self::with_http_client(build_http_client()?, base_url, session))
    }

    pub fn with_http_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        session: Arc<Session>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Validate `record` for `document_type` and submit it.
    ///
    /// Local validation failures never reach the network. On success the
    /// result is added to the session's recent documents.
    pub async fn generate(
        &self,
        document_type: &str,
        record: PersonalDataRecord,
        options: &GenerationOptions,
    ) -> Result<GenerationResult, ClientError> {
        let descriptor = catalog::find(document_type)
            .ok_or_else(|| ClientError::UnknownDocumentType(document_type.to_string()))?;
        let validated = validate_for(descriptor, record).map_err(ClientError::Invalid)?;

        let _guard =
            InFlightGuard::acquire(&self.in_flight).ok_or(ClientError::SubmissionInFlight)?;

        let Some(bearer) = self.session.bearer() else {
            return Err(self.unauthorized("Please sign in to generate documents".to_string()));
        };

        let request = GenerateRequest {
            document_type: descriptor.code.to_string(),
            personal_data: validated.record().clone(),
            options: options.clone(),
        };

        log::debug!("Submitting {} generation request", descriptor.code);
        let response = self
            .http
            .post(format!("{}{}", self.base_url, GENERATE_PATH))
            .header(AUTHORIZATION, bearer)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(transport_error)?;

        let result = match classify_status(status) {
            ResponseClass::Success => decode_success(&bytes)?,
            ResponseClass::Rejected => {
                let body = ErrorBody::parse(&bytes);
                return Err(ClientError::ValidationRejected {
                    message: body.message_or("The request was rejected"),
                    field_errors: body.field_errors,
                });
            }
            ResponseClass::Unauthorized => {
                let body = ErrorBody::parse(&bytes);
                return Err(self.unauthorized(body.message_or("Session expired")));
            }
            ResponseClass::Unavailable => {
                let body = ErrorBody::parse(&bytes);
                log::warn!("Generation request failed with {}", status);
                return Err(ClientError::ServiceUnavailable(
                    body.message_or(&format!("server responded with {}", status)),
                ));
            }
        };

        // History is a convenience; losing an entry must not lose the document.
        if let Err(e) = self
            .session
            .remember(&result, &validated.record().full_name)
        {
            log::warn!("Could not record {} in recent documents: {}", result.document_number, e);
        }

        Ok(result)
    }

    fn unauthorized(&self, message: String) -> ClientError {
        if let Err(e) = self.session.logout() {
            log::warn!("Failed to clear session: {}", e);
        }
        ClientError::Unauthorized {
            message,
            redirect: LOGIN_ROUTE,
        }
    }
}

fn decode_success(bytes: &[u8]) -> Result<GenerationResult, ClientError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| ClientError::ServiceUnavailable(format!("undecodable response: {}", e)))?;

    match value.get("success").and_then(Value::as_bool) {
        Some(true) => serde_json::from_value(value)
            .map_err(|e| ClientError::ServiceUnavailable(format!("undecodable response: {}", e))),
        Some(false) => {
            let body: ErrorBody = serde_json::from_value(value).unwrap_or_default();
            Err(ClientError::ValidationRejected {
                message: body.message_or("The request was rejected"),
                field_errors: body.field_errors,
            })
        }
        None => Err(ClientError::ServiceUnavailable(
            "response is missing the success flag".to_string(),
        )),
    }
}
