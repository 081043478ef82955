use actix_web::{web, HttpRequest, HttpResponse};
use bcrypt::verify;

use super::middleware::validate_request_token;
use super::model::{LoginRequest, TokenResponse, UserInfo};
use crate::error::ApiError;
use crate::AppState;

const DEV_PASSWORD: &str = "admin123";

/// Login endpoint
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = crate::ErrorResponse)
    )
)]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let config = &state.config;
    if body.username != config.admin_username {
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let dev_mode = config.admin_password_hash.is_none();
    let password_valid = match &config.admin_password_hash {
        Some(hash) => verify(&body.password, hash).unwrap_or(false),
        None => {
            log::warn!("ADMIN_PASSWORD_HASH not set, accepting development credentials");
            body.password == DEV_PASSWORD
        }
    };
    if !password_valid {
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let user_id = format!("operator:{}", body.username);
    let access_token = state
        .tokens
        .generate_access_token(&user_id, &body.username)
        .map_err(|e| ApiError::Internal(format!("failed to generate access token: {:?}", e)))?;

    log::info!("Operator '{}' logged in", body.username);

    Ok(HttpResponse::Ok().json(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.access_token_expiry(),
        user: UserInfo {
            id: user_id,
            username: body.username.clone(),
            role: "operator".to_string(),
        },
        dev_mode,
    }))
}

/// Current operator
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Authentication",
    responses(
        (status = 200, description = "Authenticated operator", body = UserInfo),
        (status = 401, description = "Missing or expired token", body = crate::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let claims = validate_request_token(&req, &state.tokens)?;
    Ok(HttpResponse::Ok().json(UserInfo::from(&claims)))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/auth/login").route(web::post().to(login)))
        .service(web::resource("/auth/me").route(web::get().to(me)));
}
