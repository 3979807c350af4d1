// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SATRF Analytics dashboard service
//!
//! Serves a member's competition analytics to the dashboard frontend,
//! backed by the SATRF API or, when none is configured, by a fixed
//! example dataset.

use satrf_analytics::{
    config::Config,
    services::{FileTokenStore, MemoryTokenStore, Monitoring, MonitoringConfig, TokenStore},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        offline = config.is_offline(),
        environment = ?config.environment,
        "Starting SATRF Analytics"
    );

    let tokens: Arc<dyn TokenStore> = match &config.token_file {
        Some(path) => {
            tracing::info!(path = %path.display(), "Using persisted token store");
            Arc::new(FileTokenStore::open(path))
        }
        None => Arc::new(MemoryTokenStore::new()),
    };

    let monitoring = Monitoring::new(MonitoringConfig::default());
    monitoring.init();

    let state = Arc::new(AppState::build(config.clone(), tokens, monitoring.clone())?);

    // Initial load, as when the dashboard mounts
    let outcome = state.analytics.load_analytics().await;
    tracing::info!(?outcome, "Initial analytics load");

    let auto_refresh = state.analytics.start_auto_refresh();

    // Build router
    let app = satrf_analytics::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    drop(auto_refresh);
    monitoring.shutdown();
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,satrf_analytics=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
