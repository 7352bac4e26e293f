use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use online_predictor::handlers::{self, AppState};
use online_predictor::{Config, ServingSession};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,online_predictor=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting online-predictor service");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;
    info!(
        feature_view = %config.feature_view_name,
        version = config.feature_view_version,
        artifact = %config.model_path().display(),
        "Configuration loaded and validated"
    );

    // No requests are served unless initialization succeeds
    let session = ServingSession::initialize(&config)
        .await
        .context("Failed to initialize serving session")?;
    let state = AppState::new(Arc::new(session));

    info!("Starting HTTP server on {}:{}", config.http_host, config.http_port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure)
    })
    .bind((config.http_host.as_str(), config.http_port))
    .context("Failed to bind HTTP server")?
    .run()
    .await
    .context("HTTP server error")
}
