//! API error type rendered as a JSON [`ErrorResponse`](crate::ErrorResponse).

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::forms::ValidationErrors;
use crate::generation::GenerationError;
use crate::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("{0}")]
    Validation(ValidationErrors),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("document generation failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Generation(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            Self::Unauthorized(message) => ErrorResponse::unauthorized(message),
            Self::Validation(errors) => ErrorResponse::validation(errors),
            Self::BadRequest(message) => ErrorResponse::bad_request(message),
            Self::Generation(e) => {
                log::error!("Document generation failed: {}", e);
                ErrorResponse::service_unavailable("Document generation is unavailable")
            }
            Self::Internal(message) => {
                log::error!("Internal error: {}", message);
                ErrorResponse::internal_error("Internal server error")
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
