//! Unit tests for authentication module

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{test, web, App};

    use crate::auth::handlers;
    use crate::auth::jwt::TokenService;
    use crate::auth::model::{LoginRequest, TokenResponse, UserInfo};
    use crate::config::PortalConfig;
    use crate::generation::LocalGenerationService;
    use crate::status::{StaticProbe, StatusMonitor};
    use crate::AppState;

    fn tokens() -> TokenService {
        TokenService::new("test-secret")
    }

    fn test_state(config: PortalConfig) -> AppState {
        let monitor = StatusMonitor::start(
            Vec::new(),
            Arc::new(StaticProbe::default()),
            config.status_poll_interval,
        );
        AppState::with_parts(
            config,
            Arc::new(LocalGenerationService::new("http://localhost")),
            Arc::new(monitor),
        )
        .unwrap()
    }

    #[::core::prelude::v1::test]
    fn test_generate_and_validate_access_token() {
        let token = tokens()
            .generate_access_token("operator:admin", "admin")
            .expect("Failed to generate access token");

        let claims = tokens().validate_token(&token).expect("Failed to validate token");

        assert_eq!(claims.sub, "operator:admin");
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.token_type, "access");
        assert!(claims.exp > claims.iat);
    }

    #[::core::prelude::v1::test]
    fn test_expired_token_is_rejected() {
        let issued_two_hours_ago = chrono::Utc::now().timestamp() - 2 * 60 * 60;
        let token = tokens()
            .generate_access_token_at("operator:admin", "admin", issued_two_hours_ago)
            .unwrap();
        assert!(tokens().validate_token(&token).is_err());
    }

    #[::core::prelude::v1::test]
    fn test_token_from_other_secret_is_rejected() {
        let token = TokenService::new("other")
            .generate_access_token("operator:admin", "admin")
            .unwrap();
        assert!(tokens().validate_token(&token).is_err());
    }

    #[::core::prelude::v1::test]
    fn test_invalid_token_returns_error() {
        assert!(tokens().validate_token("invalid.token.here").is_err());
    }

    #[actix_web::test]
    async fn test_login_with_dev_credentials() {
        let state = test_state(PortalConfig::default());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(web::scope("/api").configure(handlers::config)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(LoginRequest {
                username: "admin".to_string(),
                password: "admin123".to_string(),
            })
            .to_request();
        let body: TokenResponse = test::call_and_read_body_json(&app, req).await;
        assert!(body.dev_mode);
        assert_eq!(body.token_type, "Bearer");

        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", format!("Bearer {}", body.access_token)))
            .to_request();
        let user: UserInfo = test::call_and_read_body_json(&app, req).await;
        assert_eq!(user.username, "admin");
    }

    #[actix_web::test]
    async fn test_login_with_configured_hash() {
        let config = PortalConfig {
            admin_password_hash: Some(bcrypt::hash("s3cret!", 4).unwrap()),
            ..PortalConfig::default()
        };
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state(config)))
                .service(web::scope("/api").configure(handlers::config)),
        )
        .await;

        let wrong = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(LoginRequest {
                username: "admin".to_string(),
                password: "admin123".to_string(),
            })
            .to_request();
        assert_eq!(test::call_service(&app, wrong).await.status(), 401);

        let right = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(LoginRequest {
                username: "admin".to_string(),
                password: "s3cret!".to_string(),
            })
            .to_request();
        let body: TokenResponse = test::call_and_read_body_json(&app, right).await;
        assert!(!body.dev_mode);
    }

    #[actix_web::test]
    async fn test_me_without_token_is_unauthorized() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state(PortalConfig::default())))
                .service(web::scope("/api").configure(handlers::config)),
        )
        .await;
        let req = test::TestRequest::get().uri("/api/auth/me").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 401);
    }
}
