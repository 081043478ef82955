use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{DocumentTypeDescriptor, FieldSpec};

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldInfo {
    pub key: String,
    pub label: String,
    pub required: bool,
    pub rules: Vec<String>,
}

impl From<&FieldSpec> for FieldInfo {
    fn from(spec: &FieldSpec) -> Self {
        Self {
            key: spec.key.to_string(),
            label: spec.label.to_string(),
            required: spec.required,
            rules: spec.rules.iter().map(|r| r.describe()).collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTypeInfo {
    pub code: String,
    pub display_name: String,
    pub category: String,
    pub required_fields: Vec<String>,
    pub fields: Vec<FieldInfo>,
}

impl From<&DocumentTypeDescriptor> for DocumentTypeInfo {
    fn from(descriptor: &DocumentTypeDescriptor) -> Self {
        Self {
            code: descriptor.code.to_string(),
            display_name: descriptor.display_name.to_string(),
            category: descriptor.category.as_str().to_string(),
            required_fields: descriptor
                .required_fields()
                .into_iter()
                .map(String::from)
                .collect(),
            fields: descriptor.fields.iter().map(FieldInfo::from).collect(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/dha/document-types",
    tag = "Catalog",
    responses(
        (status = 200, description = "All generatable document types", body = Vec<DocumentTypeInfo>)
    )
)]
pub async fn list_document_types() -> impl Responder {
    let types: Vec<DocumentTypeInfo> = super::all().iter().map(DocumentTypeInfo::from).collect();
    HttpResponse::Ok().json(types)
}

#[utoipa::path(
    get,
    path = "/api/dha/document-types/{code}",
    tag = "Catalog",
    params(
        ("code" = String, Path, description = "Document type code, e.g. smart_id_card")
    ),
    responses(
        (status = 200, description = "Document type found", body = DocumentTypeInfo),
        (status = 404, description = "Unknown document type")
    )
)]
pub async fn get_document_type(path: web::Path<String>) -> impl Responder {
    let code = path.into_inner();
    match super::find(&code) {
        Some(descriptor) => HttpResponse::Ok().json(DocumentTypeInfo::from(descriptor)),
        None => HttpResponse::NotFound().json(crate::ErrorResponse::not_found(&format!(
            "Unknown document type '{}'",
            code
        ))),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/dha/document-types").route(web::get().to(list_document_types)))
        .service(
            web::resource("/dha/document-types/{code}").route(web::get().to(get_document_type)),
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_list_document_types() {
        let app = test::init_service(App::new().service(web::scope("/api").configure(config))).await;
        let req = test::TestRequest::get()
            .uri("/api/dha/document-types")
            .to_request();
        let body: Vec<DocumentTypeInfo> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.len(), super::super::all().len());
        assert!(body.iter().any(|t| t.code == "smart_id_card"));
    }

    #[actix_web::test]
    async fn test_get_unknown_document_type() {
        let app = test::init_service(App::new().service(web::scope("/api").configure(config))).await;
        let req = test::TestRequest::get()
            .uri("/api/dha/document-types/nope")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }
}
