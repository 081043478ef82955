#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use dha_document_portal::catalog::{DocumentTypeDescriptor, FieldRule};
use dha_document_portal::config::PortalConfig;
use dha_document_portal::forms::PersonalDataRecord;
use dha_document_portal::generation::{GenerationService, LocalGenerationService};
use dha_document_portal::status::{Integration, StaticProbe, StatusMonitor};
use dha_document_portal::{configure_api, AppState};

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn test_config() -> PortalConfig {
    PortalConfig {
        jwt_secret: TEST_SECRET.to_string(),
        verification_base_url: "http://verify.test".to_string(),
        ..PortalConfig::default()
    }
}

pub fn state_with(
    generator: Arc<dyn GenerationService>,
    integrations: Vec<Integration>,
    probe: Arc<StaticProbe>,
) -> AppState {
    let monitor = StatusMonitor::start(integrations, probe, Duration::from_secs(3600));
    AppState::with_parts(test_config(), generator, Arc::new(monitor)).unwrap()
}

pub fn test_state() -> AppState {
    state_with(
        Arc::new(LocalGenerationService::new("http://verify.test")),
        Vec::new(),
        Arc::new(StaticProbe::default()),
    )
}

pub fn bearer_for(state: &AppState) -> String {
    let token = state
        .tokens
        .generate_access_token("operator:admin", "admin")
        .unwrap();
    format!("Bearer {}", token)
}

/// Bind the API to an ephemeral port and serve it in the background.
/// Returns the base URL.
pub fn spawn_server(state: web::Data<AppState>) -> String {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(web::scope("/api").configure(configure_api))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{}", addr)
}

pub fn jane_doe() -> PersonalDataRecord {
    PersonalDataRecord::default()
        .with("fullName", "Jane Doe")
        .with("dateOfBirth", "1990-01-01")
        .with("nationality", "South African")
}

/// A record that satisfies every field of `descriptor`, optional ones included.
pub fn valid_record_for(descriptor: &DocumentTypeDescriptor) -> PersonalDataRecord {
    let mut record = PersonalDataRecord::default();
    for field in descriptor.fields {
        let value = match field.rules.first() {
            Some(FieldRule::Date) => "1990-01-01".to_string(),
            Some(FieldRule::OneOf(options)) => options[0].to_string(),
            Some(FieldRule::IdNumber) => "9001015009086".to_string(),
            Some(FieldRule::Email) => "jane.doe@example.com".to_string(),
            Some(FieldRule::Phone) => "+27 82 123 4567".to_string(),
            Some(FieldRule::MinLength(_)) | None => match field.key {
                "fullName" => "Jane Doe".to_string(),
                "passportNumber" => "A12345678".to_string(),
                _ => format!("Sample {}", field.label),
            },
        };
        record.set(field.key, value);
    }
    record
}
