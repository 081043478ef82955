//! Inline preview and download of a generated document.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;

use crate::generation::common::document_filename;
use crate::generation::GenerationResult;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("document payload is not valid base64: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    #[error("document payload is empty")]
    Empty,
    #[error("failed to save document: {0}")]
    Io(#[from] std::io::Error),
}

/// Detect MIME type from file content magic bytes.
pub fn detect_mime_from_bytes(data: &[u8]) -> Option<&'static str> {
    if data.len() < 4 {
        return None;
    }
    if data.starts_with(b"%PDF") {
        return Some("application/pdf");
    }
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        return Some("image/png");
    }
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if data.starts_with(b"{") || data.starts_with(b"[") {
        return Some("application/json");
    }
    if data.starts_with(b"<?xml") {
        return Some("application/xml");
    }
    if data.starts_with(b"<!DOCTYPE") || data.starts_with(b"<html") {
        return Some("text/html");
    }
    None
}

fn extension_for(mime: &str) -> &'static str {
    match mime {
        "application/pdf" => "pdf",
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "application/json" => "json",
        "application/xml" => "xml",
        "text/html" => "html",
        _ => "bin",
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Decoded view of a [`GenerationResult`]. The result itself is only read.
#[derive(Debug, Clone)]
pub struct DocumentPreview {
    document_type: String,
    document_number: String,
    mime_type: &'static str,
    bytes: Vec<u8>,
}

impl DocumentPreview {
    pub fn from_result(result: &GenerationResult) -> Result<Self, PreviewError> {
        let bytes = BASE64.decode(result.pdf_base64.trim())?;
        if bytes.is_empty() {
            return Err(PreviewError::Empty);
        }
        let mime_type = detect_mime_from_bytes(&bytes).unwrap_or("application/octet-stream");
        if mime_type != "application/pdf" {
            log::warn!(
                "Document {} payload sniffed as {}, not a PDF",
                result.document_number,
                mime_type
            );
        }

        Ok(Self {
            document_type: result.document_type.clone(),
            document_number: result.document_number.clone(),
            mime_type,
            bytes,
        })
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `<documentType>-<documentNumber>.<ext>`, safe to use as a file name.
    pub fn filename(&self) -> String {
        document_filename(
            &self.document_type,
            &self.document_number,
            extension_for(self.mime_type),
        )
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, BASE64.encode(&self.bytes))
    }

    /// Markup for an inline viewer.
    pub fn embed_html(&self) -> String {
        format!(
            r#"<iframe src="{}" title="{}" type="{}" width="100%" height="600" style="border:0"></iframe>"#,
            self.data_url(),
            escape_attr(&self.filename()),
            self.mime_type
        )
    }

    /// Write the document into `dir`, creating it if needed. Returns the path
    /// written.
    pub async fn save_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, PreviewError> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(self.filename());
        tokio::fs::write(&path, &self.bytes).await?;
        log::info!("Saved {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}
