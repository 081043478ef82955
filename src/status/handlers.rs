use std::convert::Infallible;

use actix_web::{web, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::IntegrationStatus;
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub integrations: Vec<IntegrationStatus>,
    pub connected: usize,
    pub total: usize,
    pub checked_at: DateTime<Utc>,
}

impl StatusReport {
    pub fn from_statuses(integrations: Vec<IntegrationStatus>) -> Self {
        Self {
            connected: integrations.iter().filter(|s| s.connected).count(),
            total: integrations.len(),
            integrations,
            checked_at: Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct StatusQuery {
    /// Probe every integration before answering.
    #[serde(default)]
    pub refresh: bool,
}

#[utoipa::path(
    get,
    path = "/api/ultra-ai/status",
    tag = "Status",
    params(StatusQuery),
    responses(
        (status = 200, description = "Connectivity of every configured integration", body = StatusReport)
    )
)]
pub async fn get_status(
    state: web::Data<AppState>,
    query: web::Query<StatusQuery>,
) -> impl Responder {
    if query.refresh {
        state.monitor.refresh().await;
    }
    HttpResponse::Ok().json(StatusReport::from_statuses(state.monitor.snapshot()))
}

/// Server-sent events, one `data:` frame per status change.
pub async fn status_events(state: web::Data<AppState>) -> impl Responder {
    let stream = state.monitor.subscribe().filter_map(|update| async move {
        match update {
            Ok(status) => serde_json::to_string(&status)
                .ok()
                .map(|json| Ok::<_, Infallible>(web::Bytes::from(format!("data: {}\n\n", json)))),
            // Lagged receivers just skip ahead.
            Err(_) => None,
        }
    });

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(stream)
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ultra-ai/status").route(web::get().to(get_status)))
        .service(web::resource("/integrations/status").route(web::get().to(get_status)))
        .service(web::resource("/integrations/events").route(web::get().to(status_events)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PortalConfig;
    use crate::generation::LocalGenerationService;
    use crate::status::{Integration, IntegrationKind, ProbeError, StaticProbe, StatusMonitor};
    use actix_web::{test, App};
    use std::sync::Arc;
    use std::time::Duration;

    #[actix_web::test]
    async fn test_status_refresh_reports_disconnected() {
        let probe = Arc::new(StaticProbe::default());
        probe.set_failure("ethereum", ProbeError::Timeout);
        let monitor = StatusMonitor::start(
            vec![
                Integration::new("anthropic", IntegrationKind::AiProvider, "https://a"),
                Integration::new("ethereum", IntegrationKind::Blockchain, "https://e"),
            ],
            probe,
            Duration::from_secs(3600),
        );
        let state = AppState::with_parts(
            PortalConfig::default(),
            Arc::new(LocalGenerationService::new("http://localhost")),
            Arc::new(monitor),
        )
        .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(web::scope("/api").configure(config)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/ultra-ai/status?refresh=true")
            .to_request();
        let report: StatusReport = test::call_and_read_body_json(&app, req).await;
        assert_eq!(report.total, 2);
        assert_eq!(report.connected, 1);
        let ethereum = report
            .integrations
            .iter()
            .find(|s| s.name == "ethereum")
            .unwrap();
        assert!(!ethereum.connected);
        assert_eq!(ethereum.last_error.as_deref(), Some("probe timed out"));
    }
}
