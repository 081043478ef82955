use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;

use super::common::{display_value, document_filename, format_long_date};
use super::numbers::NumberIssuer;
use super::pdf::{DocumentLine, PdfRenderEngine};
use super::{GenerationError, GenerationOptions, GenerationResult, GenerationService};
use crate::forms::ValidatedRecord;

/// In-process generation backend.
pub struct LocalGenerationService {
    issuer: NumberIssuer,
    verification_base_url: String,
}

impl LocalGenerationService {
    pub fn new(verification_base_url: impl Into<String>) -> Self {
        Self {
            issuer: NumberIssuer::new(),
            verification_base_url: verification_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn verification_url(&self, document_number: &str) -> String {
        format!("{}/verify/{}", self.verification_base_url, document_number)
    }

    fn layout(
        record: &ValidatedRecord,
        options: &GenerationOptions,
        document_number: &str,
        registration_number: &str,
        verification_url: &str,
        issued_on: &str,
    ) -> Vec<DocumentLine> {
        let descriptor = record.descriptor();
        let mut lines = vec![
            DocumentLine::label("REPUBLIC OF SOUTH AFRICA"),
            DocumentLine::label("DEPARTMENT OF HOME AFFAIRS"),
            DocumentLine::blank(),
            DocumentLine::heading(descriptor.display_name.to_uppercase()),
            DocumentLine::blank(),
            DocumentLine::label(format!("Document number: {}", document_number)),
            DocumentLine::label(format!("Registration number: {}", registration_number)),
            DocumentLine::body(format!("Date of issue: {}", issued_on)),
            DocumentLine::blank(),
        ];

        for spec in descriptor.fields {
            if let Some(value) = record.record().get(spec.key) {
                lines.push(DocumentLine::body(format!(
                    "{}: {}",
                    spec.label,
                    display_value(value)
                )));
            }
        }

        if let Some(reference) = options.reference.as_deref().filter(|r| !r.trim().is_empty()) {
            lines.push(DocumentLine::blank());
            lines.push(DocumentLine::body(format!("Reference: {}", reference.trim())));
        }

        if options.include_qr_code {
            lines.push(DocumentLine::blank());
            lines.push(DocumentLine::label("Verification"));
            lines.push(DocumentLine::body(format!(
                "Scan the QR code or visit {}",
                verification_url
            )));
        }

        lines
    }
}

#[async_trait]
impl GenerationService for LocalGenerationService {
    async fn generate(
        &self,
        record: &ValidatedRecord,
        options: &GenerationOptions,
    ) -> Result<GenerationResult, GenerationError> {
        let descriptor = record.descriptor();
        let now = Utc::now();

        let document_number = self.issuer.document_number(descriptor.number_prefix, now)?;
        let registration_number = self.issuer.registration_number(now);
        let verification_url = self.verification_url(&document_number);
        let issued_on = format_long_date(now.date_naive());

        let lines = Self::layout(
            record,
            options,
            &document_number,
            &registration_number,
            &verification_url,
            &issued_on,
        );
        let pdf = PdfRenderEngine::render(
            descriptor.display_name,
            &lines,
            options.watermark.as_deref(),
        )?;

        log::info!(
            "Generated {} {} ({} bytes)",
            descriptor.code,
            document_number,
            pdf.len()
        );

        Ok(GenerationResult {
            document_type: descriptor.code.to_string(),
            filename: document_filename(descriptor.code, &document_number, "pdf"),
            qr_code: verification_url.clone(),
            verification_url,
            registration_number,
            document_number,
            pdf_base64: BASE64.encode(&pdf),
            generated_at: now,
        })
    }
}
