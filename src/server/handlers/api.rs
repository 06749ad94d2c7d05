//! Read-only API endpoint handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use super::super::AppState;
use crate::models::AGENTS;

/// Health check endpoint for container orchestration.
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

/// Provider configuration established at startup.
pub async fn api_config(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.settings.provider.clone())
}

/// The agent catalog.
pub async fn api_agents() -> impl IntoResponse {
    Json(AGENTS)
}
