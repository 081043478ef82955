#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dha_document_portal::run().await
}
