// SPDX-License-Identifier: MIT

//! Promptfolio API server.
//!
//! Serves the marketplace page routes behind the canonical route guard and
//! the profile/auth APIs against the hosted collaborators.

use promptfolio::{config::Config, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Promptfolio API");

    if !config.store_configured() {
        tracing::warn!(
            "STORE_URL / STORE_ANON_KEY missing or placeholders; \
             pages will report a setup message and the route guard is inert"
        );
    }

    // Build shared state (store, auth, storage clients)
    let state = Arc::new(AppState::from_config(config));

    // Build router
    let app = promptfolio::routes::create_router(state.clone());

    // Start server
    let addr = format!("0.0.0.0:{}", state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("promptfolio=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
