use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpResponse, HttpServer, Responder};
use actix_web_prometheus::PrometheusMetricsBuilder;
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod forms;
pub mod generation;
pub mod metrics;
pub mod preview;
pub mod session;
pub mod sniff;
pub mod state;
pub mod status;

pub use crate::state::AppState;

use crate::config::PortalConfig;
use crate::forms::{ValidationError, ValidationErrors};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<ValidationError>,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            success: false,
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            field_errors: Vec::new(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn unauthorized(message: &str) -> Self {
        Self::new("Unauthorized", message)
    }

    pub fn service_unavailable(message: &str) -> Self {
        Self::new("ServiceUnavailable", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }

    pub fn validation(errors: &ValidationErrors) -> Self {
        Self {
            field_errors: errors.iter().cloned().collect(),
            ..Self::new("ValidationError", &errors.summary())
        }
    }
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::me,
        crate::catalog::routes::list_document_types,
        crate::catalog::routes::get_document_type,
        crate::generation::handlers::generate_document,
        crate::status::handlers::get_status,
        crate::sniff::handlers::extract_code
    ),
    components(
        schemas(
            ErrorResponse,
            forms::ValidationError,
            forms::PersonalDataRecord,
            auth::LoginRequest,
            auth::TokenResponse,
            auth::UserInfo,
            catalog::routes::DocumentTypeInfo,
            catalog::routes::FieldInfo,
            generation::GenerationOptions,
            generation::GenerationResult,
            generation::handlers::GenerateRequest,
            generation::handlers::GenerateResponse,
            status::IntegrationStatus,
            status::IntegrationKind,
            status::handlers::StatusReport,
            sniff::Language,
            sniff::Classification,
            sniff::CodeBlock,
            sniff::handlers::ExtractCodeRequest,
            sniff::handlers::ExtractCodeResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Operator sign-in."),
        (name = "Catalog", description = "Supported document types and their fields."),
        (name = "Documents", description = "Document generation and PDF utilities."),
        (name = "Status", description = "Integration connectivity.")
    ),
    servers(
        (url = "http://127.0.0.1:5000", description = "Local server")
    )
)]
pub struct ApiDoc;

/// Application counters in Prometheus text format.
async fn app_metrics(state: web::Data<AppState>) -> impl Responder {
    let mut buffer = Vec::new();
    match TextEncoder::new().encode(&state.registry.gather(), &mut buffer) {
        Ok(()) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(buffer),
        Err(e) => {
            log::error!("Failed to encode metrics: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(
                "Failed to encode metrics",
            ))
        }
    }
}

/// Register every API route under the current scope.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.configure(auth::config)
        .configure(catalog::routes::config)
        .configure(generation::handlers::config)
        .configure(status::handlers::config)
        .configure(sniff::handlers::config);
}

pub async fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = PortalConfig::from_env()?;
    let bind = (config.bind_addr.clone(), config.port);
    let static_dir = config.static_dir.clone();
    let allowed_origins = config.allowed_origins.clone();

    let app_state = match AppState::new(config) {
        Ok(state) => web::Data::new(state),
        Err(e) => anyhow::bail!("failed to initialise application state: {}", e),
    };

    let prometheus = PrometheusMetricsBuilder::new("dha_portal")
        .endpoint("/metrics")
        .build()
        .map_err(|e| anyhow::anyhow!("failed to create Prometheus middleware: {}", e))?;

    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        let app_state = app_state.clone();
        let prometheus = prometheus.clone();
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus)
            .wrap(cors)
            .app_data(app_state)
            .service(web::resource("/metrics/app").route(web::get().to(app_metrics)))
            .service(web::scope("/api").configure(configure_api))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .service(actix_files::Files::new("/", static_dir.clone()).index_file("index.html"))
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
