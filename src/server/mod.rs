//! Web server relaying ABAP uploads to an LLM provider.
//!
//! Exposes:
//! - `GET /api/config` with the provider settings established at startup
//! - `POST /api/analyze` accepting multipart `.abap` uploads plus settings
//! - `GET /api/agents` listing the review agents
//! - `GET /health`

mod error;
mod handlers;
mod routes;

pub use error::ApiError;
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::services::{AnalysisRelay, LlmRelay};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub relay: Arc<dyn AnalysisRelay>,
}

impl AppState {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let settings = Arc::new(settings);
        let relay = LlmRelay::new(settings.clone())?;

        Ok(Self {
            settings,
            relay: Arc::new(relay),
        })
    }

    /// State with a caller-supplied relay.
    pub fn with_relay(settings: Settings, relay: Arc<dyn AnalysisRelay>) -> Self {
        Self {
            settings: Arc::new(settings),
            relay,
        }
    }
}

/// Start the web server.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let addr: SocketAddr = settings.bind.parse()?;
    if !settings.provider.has_api_key() {
        tracing::warn!(
            provider = %settings.provider.api_provider,
            "No API key configured; requests must supply their own"
        );
    }

    let state = AppState::new(settings)?;
    let app = create_router(state);

    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
