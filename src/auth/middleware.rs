use actix_web::HttpRequest;

use super::jwt::TokenService;
use super::model::Claims;
use crate::error::ApiError;

/// Extract token from Authorization header
fn extract_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Validate token from HttpRequest and return claims
pub fn validate_request_token(req: &HttpRequest, tokens: &TokenService) -> Result<Claims, ApiError> {
    let token = extract_token(req)
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization token".to_string()))?;

    let claims = tokens.validate_token(&token).map_err(|e| {
        log::warn!("Token validation failed: {:?}", e);
        ApiError::Unauthorized("Invalid or expired token".to_string())
    })?;

    if claims.token_type != "access" {
        return Err(ApiError::Unauthorized("Invalid token type".to_string()));
    }

    Ok(claims)
}
