//! Web dashboard for monitoring chat transcripts.
//!
//! Serves a server-rendered dashboard plus a small JSON API aggregated
//! across every configured transcript context.

mod config;
mod display;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use monitor_core::AggregationEngine;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use transcript_store::{ContextRegistry, EnvEndpoints, TranscriptSource};

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting monitor web server");

    // Context pools are created lazily on first use
    let registry = ContextRegistry::with_pool_size(EnvEndpoints, config.pool_size);
    for binding in registry.bindings() {
        if binding.is_configured() {
            info!(context = %binding.context.key, "Context configured");
        } else {
            warn!(
                context = %binding.context.key,
                key = binding.context.config_key,
                "Context has no endpoint, skipping"
            );
        }
    }

    // Build application state
    let source: Arc<dyn TranscriptSource> = Arc::new(registry);
    let engine = AggregationEngine::new(source, config.engine);
    let state = AppState::new(engine);

    // Build router
    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    info!(addr = %config.addr, "Monitor web server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
