//! Axum WebSocket upgrade handler.

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;

use super::connection::run_connection;
use crate::app_state::AppState;
use crate::domain::UserId;

/// Query parameters of the upgrade request.
///
/// The user id has already been resolved by the authentication layer in
/// front of this service.
#[derive(Debug, Deserialize)]
pub struct WsParams {
    /// Authenticated principal opening the connection.
    pub user_id: uuid::Uuid,
}

/// `GET /ws?user_id=<uuid>` — Upgrade HTTP connection to WebSocket.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let user_id = UserId::from_uuid(params.user_id);
    let hub = state.hub.clone();
    let settings = state.ws;

    ws.on_upgrade(move |socket| run_connection(socket, hub, user_id, settings))
}
