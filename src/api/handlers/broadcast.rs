//! Broadcast and hub statistics handlers.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{BroadcastRequest, BroadcastResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, HubError};
use crate::hub::HubStats;

/// `POST /broadcast` — Dispatch a message to an audience.
///
/// # Errors
///
/// Returns [`HubError`] on a malformed body or when the hub is shut down.
#[utoipa::path(
    post,
    path = "/api/v1/broadcast",
    tag = "Hub",
    summary = "Broadcast a message",
    description = "Routes an event to a channel, a workspace, every session of a user, or every connection. Delivery is best-effort: recipients with a full queue miss the message.",
    request_body = BroadcastRequest,
    responses(
        (status = 200, description = "Message dispatched", body = BroadcastResponse),
        (status = 400, description = "Malformed request", body = ErrorResponse),
        (status = 503, description = "Hub is shut down", body = ErrorResponse),
    )
)]
pub async fn broadcast(
    State(state): State<AppState>,
    body: Result<Json<BroadcastRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HubError> {
    let Json(req) = body.map_err(|rejection| HubError::InvalidRequest(rejection.body_text()))?;
    let envelope = req.into_envelope()?;
    let message_id = envelope.id;

    let report = state.hub.dispatch(envelope).await?;
    tracing::debug!(
        %message_id,
        delivered = report.delivered,
        dropped = report.dropped,
        "broadcast request dispatched"
    );

    Ok(Json(BroadcastResponse::new(message_id, report)))
}

/// `GET /stats` — Current hub counters.
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    tag = "Hub",
    summary = "Hub statistics",
    description = "Returns the number of registered connections, non-empty rooms, and connected users.",
    responses(
        (status = 200, description = "Hub counters", body = HubStats),
    )
)]
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.hub.stats().await)
}

/// Hub routes, mounted under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/broadcast", post(broadcast))
        .route("/stats", get(stats))
}
