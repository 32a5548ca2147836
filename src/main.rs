// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::application::notification_service::spawn_poller;
use crate::infrastructure::config::{load_dashboard_config, load_settings};
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let settings = load_settings().context("Failed to load config/medconnect")?;
    let dashboard_config = load_dashboard_config().context("Failed to load config/dashboard")?;

    // Create application state
    let state = Arc::new(AppState::wire(&settings, dashboard_config)?);

    let poller = spawn_poller(
        state.notification_service.clone(),
        settings.notifications.poll_interval(),
    );

    // Build router (presentation layer)
    let router = build_router(state);

    // Start server
    let addr = settings.server.bind;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, backend = %settings.api.base_url, "Starting medconnect-reports service");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
        })
        .await?;

    poller.stop();
    tracing::info!("medconnect-reports stopped");

    Ok(())
}
