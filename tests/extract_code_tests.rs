mod common;

use actix_web::{http::StatusCode, test, web, App};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};

use dha_document_portal::configure_api;
use dha_document_portal::generation::{DocumentLine, PdfRenderEngine};

use common::{bearer_for, test_state};

#[actix_web::test]
async fn test_extract_code_classifies_pdf_text() {
    let state = test_state();
    let bearer = bearer_for(&state);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .service(web::scope("/api").configure(configure_api)),
    )
    .await;

    let pdf = PdfRenderEngine::render(
        "Query appendix",
        &[DocumentLine::body("SELECT id FROM permits WHERE status = 'active'")],
        None,
    )
    .unwrap();

    let req = test::TestRequest::post()
        .uri("/api/pdf/extract-code")
        .insert_header(("Authorization", bearer))
        .set_json(json!({ "pdfBase64": BASE64.encode(&pdf) }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["pageCount"], 1);
    let blocks = body["blocks"].as_array().unwrap();
    assert!(blocks.iter().any(|b| b["label"] == "sql"));
}

#[actix_web::test]
async fn test_extract_code_rejects_garbage() {
    let state = test_state();
    let bearer = bearer_for(&state);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .service(web::scope("/api").configure(configure_api)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/pdf/extract-code")
        .insert_header(("Authorization", bearer))
        .set_json(json!({ "pdfBase64": BASE64.encode(b"definitely not a pdf") }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
