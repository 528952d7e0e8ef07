use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use jobhound_client::ReqwestFetcher;
use jobhound_core::ScrapeConfig;
use jobhound_db::{Database, DatabaseConfig};
use jobhound_server::routes;
use jobhound_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("jobhound=info".parse()?))
        .with_target(false)
        .init();

    let api_key = std::env::var("JOBHOUND_SERVER_API_KEY")
        .context("JOBHOUND_SERVER_API_KEY must be set")?;
    let port = std::env::var("JOBHOUND_SERVER_PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{port}");

    let db = Database::connect(&DatabaseConfig::from_env()?).await?;
    db.migrate().await?;

    let scrape_config = ScrapeConfig::from_env()?;
    let sources: Vec<_> = scrape_config.sources.iter().map(|b| b.as_str()).collect();
    tracing::info!(?sources, "Configured job boards");

    let state = Arc::new(AppState::from_config(
        db,
        &scrape_config,
        ReqwestFetcher::new()?,
        api_key,
    )?);

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!("Starting server on {addr}");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install CTRL+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
