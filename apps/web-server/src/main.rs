//! # Blogicum
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

use web_server::config::AppConfig;
use web_server::handlers;
use web_server::observability::RequestIdMiddleware;
use web_server::state::AppState;
use web_server::telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Logging first, so configuration warnings are seen
    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Blogicum on {}:{}",
        config.host,
        config.port
    );

    let state = web::Data::new(AppState::new(&config).await);
    tracing::info!(storage = state.storage(), "Storage ready");

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(RequestIdMiddleware)
            .app_data(state.clone())
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
