//! Liveness endpoint for the chat hub: dispatcher status and the live
//! connection count.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` once the dispatcher has stopped.
    pub status: &'static str,
    /// Registered WebSocket connections.
    pub connections: usize,
    /// Server time of the check.
    pub timestamp: DateTime<Utc>,
    /// Crate version.
    pub version: &'static str,
}

/// `GET /health` — Hub liveness and connection count.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns hub status, registered connections, version, and current timestamp.",
    responses(
        (status = 200, description = "Hub dispatcher is running", body = HealthResponse),
        (status = 503, description = "Hub dispatcher has stopped", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (status, code) = if state.hub.is_running() {
        ("healthy", StatusCode::OK)
    } else {
        ("degraded", StatusCode::SERVICE_UNAVAILABLE)
    };
    let connections = state.hub.stats().await.connections;
    (
        code,
        Json(HealthResponse {
            status,
            connections,
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}
