// Web Server - main.rs
use actix_web::{middleware::Logger, App, HttpServer};
use common::{setup_tracing, Config};
use web_server::Gateway;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    setup_tracing();

    let config = Config::from_env();
    config
        .validate()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    let gateway = Gateway::from_config(&config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    let server_addr = config.server_addr.clone();

    tracing::info!(
        upstream = %config.api_base_url,
        environment = %config.environment,
        "Starting Agent Gateway on {}",
        server_addr
    );

    let app_gateway = gateway.clone();
    let result = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %b - %T"))
            .configure(|cfg| app_gateway.configure(cfg))
    })
    .bind(&server_addr)?
    .run()
    .await;

    gateway.shutdown().await;
    tracing::info!("Agent Gateway stopped");
    result
}
