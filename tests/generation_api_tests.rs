mod common;

use std::collections::HashSet;

use actix_web::{http::StatusCode, test, web, App};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};

use dha_document_portal::catalog;
use dha_document_portal::configure_api;

use common::{bearer_for, test_state, valid_record_for};

#[actix_web::test]
async fn test_smart_id_card_for_jane_doe() {
    let state = test_state();
    let bearer = bearer_for(&state);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .service(web::scope("/api").configure(configure_api)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/dha/documents/generate")
        .insert_header(("Authorization", bearer))
        .set_json(json!({
            "documentType": "smart_id_card",
            "personalData": {
                "fullName": "Jane Doe",
                "dateOfBirth": "1990-01-01",
                "nationality": "South African"
            },
            "options": {}
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["documentType"], "smart_id_card");
    let number = body["documentNumber"].as_str().unwrap();
    assert!(number.starts_with("ID"));
    let pdf = BASE64.decode(body["pdfBase64"].as_str().unwrap()).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
    assert_eq!(
        body["verificationUrl"],
        format!("http://verify.test/verify/{}", number)
    );
}

#[actix_web::test]
async fn test_pdf_generate_alias_requires_token() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(test_state()))
            .service(web::scope("/api").configure(configure_api)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/pdf/generate")
        .set_json(json!({
            "documentType": "smart_id_card",
            "personalData": { "fullName": "Jane Doe" }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Unauthorized");
}

#[actix_web::test]
async fn test_missing_date_of_birth_is_rejected_with_field_errors() {
    let state = test_state();
    let bearer = bearer_for(&state);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .service(web::scope("/api").configure(configure_api)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/dha/documents/generate")
        .insert_header(("Authorization", bearer))
        .set_json(json!({
            "documentType": "smart_id_card",
            "personalData": {
                "fullName": "Jane Doe",
                "dateOfBirth": "",
                "nationality": "South African"
            }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "ValidationError");
    assert_eq!(body["fieldErrors"][0]["field"], "dateOfBirth");
    assert_eq!(body["fieldErrors"][0]["message"], "Date of birth is required");
}

#[actix_web::test]
async fn test_unknown_document_type_is_rejected() {
    let state = test_state();
    let bearer = bearer_for(&state);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .service(web::scope("/api").configure(configure_api)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/dha/documents/generate")
        .insert_header(("Authorization", bearer))
        .set_json(json!({
            "documentType": "fishing_licence",
            "personalData": { "fullName": "Jane Doe" }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["fieldErrors"][0]["field"], "documentType");
}

#[actix_web::test]
async fn test_every_document_type_yields_a_unique_number() {
    let state = test_state();
    let bearer = bearer_for(&state);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .service(web::scope("/api").configure(configure_api)),
    )
    .await;

    let mut seen = HashSet::new();
    for descriptor in catalog::all() {
        for _ in 0..3 {
            let req = test::TestRequest::post()
                .uri("/api/dha/documents/generate")
                .insert_header(("Authorization", bearer.clone()))
                .set_json(json!({
                    "documentType": descriptor.code,
                    "personalData": valid_record_for(descriptor),
                }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK, "{} failed", descriptor.code);

            let body: Value = test::read_body_json(resp).await;
            let number = body["documentNumber"].as_str().unwrap().to_string();
            assert!(!number.is_empty());
            assert!(number.starts_with(descriptor.number_prefix));
            assert!(seen.insert(number), "duplicate number for {}", descriptor.code);
        }
    }
    assert_eq!(seen.len(), catalog::all().len() * 3);
}

#[actix_web::test]
async fn test_catalog_and_status_are_public() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(test_state()))
            .service(web::scope("/api").configure(configure_api)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/dha/document-types")
        .to_request();
    let types: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(types.as_array().unwrap().len(), catalog::all().len());

    let req = test::TestRequest::get()
        .uri("/api/integrations/status")
        .to_request();
    let status: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(status["total"], 0);
}
