#[actix_web::main]
async fn main() -> std::io::Result<()> {
    mtm_report::run().await
}
