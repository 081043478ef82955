use actix_web::{web, HttpRequest, HttpResponse};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use lopdf::Document;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{extract_code_blocks, CodeBlock};
use crate::auth::validate_request_token;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractCodeRequest {
    pub pdf_base64: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractCodeResponse {
    pub success: bool,
    pub page_count: usize,
    pub blocks: Vec<CodeBlock>,
}

/// Pull the text out of every page of a PDF.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<(usize, String), ApiError> {
    let document = Document::load_mem(bytes)
        .map_err(|e| ApiError::BadRequest(format!("not a readable PDF: {}", e)))?;
    let pages: Vec<u32> = document.get_pages().keys().copied().collect();
    let text = document
        .extract_text(&pages)
        .map_err(|e| ApiError::BadRequest(format!("could not extract text: {}", e)))?;
    Ok((pages.len(), text))
}

/// Extract classified code blocks from a PDF
#[utoipa::path(
    post,
    path = "/api/pdf/extract-code",
    tag = "Documents",
    request_body = ExtractCodeRequest,
    responses(
        (status = 200, description = "Classified code blocks", body = ExtractCodeResponse),
        (status = 400, description = "Payload is not a readable PDF", body = crate::ErrorResponse),
        (status = 401, description = "Missing or expired token", body = crate::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn extract_code(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<ExtractCodeRequest>,
) -> Result<HttpResponse, ApiError> {
    validate_request_token(&req, &state.tokens)?;

    let bytes = BASE64
        .decode(body.pdf_base64.trim())
        .map_err(|e| ApiError::BadRequest(format!("pdfBase64 is not valid base64: {}", e)))?;

    // lopdf parsing is CPU-bound.
    let (page_count, text) = web::block(move || extract_pdf_text(&bytes))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    let blocks = extract_code_blocks(&text);
    log::debug!(
        "Extracted {} code block(s) from {} page(s)",
        blocks.len(),
        page_count
    );

    Ok(HttpResponse::Ok().json(ExtractCodeResponse {
        success: true,
        page_count,
        blocks,
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/pdf/extract-code").route(web::post().to(extract_code)));
}
