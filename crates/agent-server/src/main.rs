//! travel-agent HTTP Server
//!
//! Axum-based server that answers travel questions by letting a language
//! model call geocoding, weather, attraction and fare tools.

mod config;
mod handlers;
mod routes;
mod state;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::LlmProvider;
use agent_runtime::AnthropicProvider;
use travel_tools::{Endpoints, default_registry, fares::DistanceFareEstimator};

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    // Initialize LLM provider
    let provider: Option<Arc<dyn LlmProvider>> = match AnthropicProvider::from_env() {
        Ok(provider) => {
            tracing::info!("✓ Model configured: {}", provider.model());
            Some(Arc::new(provider))
        }
        Err(e) => {
            tracing::warn!("⚠ {} - queries will be refused", e);
            tracing::warn!("  Set ANTHROPIC_API_KEY in .env");
            None
        }
    };

    // Initialize tools
    let endpoints = Endpoints::from_env().context("invalid tool endpoint configuration")?;
    let tools = default_registry(&endpoints, Arc::new(DistanceFareEstimator::new()))?;

    tracing::info!("Registered {} tools:", tools.len());
    for name in tools.names() {
        tracing::info!("  • {}", name);
    }

    let addr = config.bind_addr.clone();
    let state = AppState {
        provider,
        tools: Arc::new(tools),
        config: Arc::new(config),
    };
    let app = routes::router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("🚀 travel-agent server running on http://{}", addr);
    tracing::info!("  GET  /health     - Health check");
    tracing::info!("  GET  /api/info   - Model and tool summary");
    tracing::info!("  POST /api/query  - Ask a travel question");

    axum::serve(listener, app).await?;

    Ok(())
}
