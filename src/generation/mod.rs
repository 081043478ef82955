//! Document generation - turns a validated record into a PDF plus the
//! identifiers printed on it.
//!
//! `GenerationService` is the seam to the PDF backend. The bundled
//! `LocalGenerationService` renders a single-page PDF with `lopdf` and mints
//! document and registration numbers in-process.

pub mod common;
pub mod handlers;
pub mod numbers;
pub mod pdf;
pub mod service;

pub use numbers::NumberIssuer;
pub use pdf::{DocumentLine, PdfRenderEngine};
pub use service::LocalGenerationService;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::forms::ValidatedRecord;

/// Errors that can occur during document generation.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("failed to build PDF: {0}")]
    Pdf(String),
    #[error("could not mint a unique document number after {0} attempts")]
    NumberCollision(u32),
}

fn default_include_qr_code() -> bool {
    true
}

/// Caller-selectable generation options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    /// Print the verification block (QR payload and URL) on the document.
    #[serde(default = "default_include_qr_code")]
    pub include_qr_code: bool,
    /// Text stamped across the page, e.g. `SPECIMEN`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watermark: Option<String>,
    /// Free-form client reference echoed onto the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            include_qr_code: true,
            watermark: None,
            reference: None,
        }
    }
}

/// Output of a successful generation call. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub document_type: String,
    pub document_number: String,
    pub registration_number: String,
    /// Base64-encoded PDF bytes.
    pub pdf_base64: String,
    /// Payload encoded in the verification QR code.
    pub qr_code: String,
    pub verification_url: String,
    pub filename: String,
    pub generated_at: DateTime<Utc>,
}

/// Backend that renders documents.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(
        &self,
        record: &ValidatedRecord,
        options: &GenerationOptions,
    ) -> Result<GenerationResult, GenerationError>;
}
