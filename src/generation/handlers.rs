use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{GenerationOptions, GenerationResult};
use crate::auth::validate_request_token;
use crate::catalog;
use crate::error::ApiError;
use crate::forms::{validate_for, PersonalDataRecord, ValidationError, ValidationErrors};
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Catalog code, e.g. `smart_id_card`.
    pub document_type: String,
    pub personal_data: PersonalDataRecord,
    #[serde(default)]
    pub options: GenerationOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub success: bool,
    #[serde(flatten)]
    pub document: GenerationResult,
}

/// Generate a document
#[utoipa::path(
    post,
    path = "/api/dha/documents/generate",
    tag = "Documents",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Document generated", body = GenerateResponse),
        (status = 400, description = "Validation failed", body = crate::ErrorResponse),
        (status = 401, description = "Missing or expired token", body = crate::ErrorResponse),
        (status = 503, description = "Generation backend failed", body = crate::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn generate_document(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<GenerateRequest>,
) -> Result<HttpResponse, ApiError> {
    let claims = validate_request_token(&req, &state.tokens)?;
    let GenerateRequest {
        document_type,
        personal_data,
        options,
    } = body.into_inner();

    let descriptor = catalog::find(&document_type).ok_or_else(|| {
        state.metrics.record_failure("unknown_document_type");
        ApiError::Validation(ValidationErrors::from(vec![ValidationError::new(
            "documentType",
            format!("Unknown document type '{}'", document_type),
        )]))
    })?;

    let validated = validate_for(descriptor, personal_data).map_err(|errors| {
        log::info!(
            "Rejected {} request from '{}': {} validation error(s)",
            descriptor.code,
            claims.username,
            errors.len()
        );
        state.metrics.record_failure("validation");
        ApiError::Validation(errors)
    })?;

    let document = state
        .generator
        .generate(&validated, &options)
        .await
        .map_err(|e| {
            state.metrics.record_failure("generation");
            ApiError::from(e)
        })?;

    state.metrics.record_success(descriptor.code);
    log::info!(
        "Operator '{}' generated {} {}",
        claims.username,
        descriptor.code,
        document.document_number
    );

    Ok(HttpResponse::Ok().json(GenerateResponse {
        success: true,
        document,
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/dha/documents/generate").route(web::post().to(generate_document)))
        .service(web::resource("/pdf/generate").route(web::post().to(generate_document)));
}
