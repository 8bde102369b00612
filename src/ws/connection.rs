//! Per-connection WebSocket loop.
//!
//! Registers the connection with the hub, then multiplexes three sources
//! until one of them ends the session:
//!
//! - client frames (room commands, pongs, close);
//! - the connection's outbound queue, drained to the socket in FIFO order;
//! - the ping timer, which also enforces the idle timeout.
//!
//! Whatever ends the loop, the connection is unregistered on the way out.

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::time::{Instant, interval_at};

use super::messages::{WsCommand, WsMessage, WsRequest};
use crate::app_state::WsSettings;
use crate::domain::{Connection, ConnectionId, RoomKey, UserId};
use crate::error::HubError;
use crate::hub::HubHandle;

/// Runs the read/write loop for a single WebSocket connection.
pub async fn run_connection(
    socket: WebSocket,
    hub: HubHandle,
    user_id: UserId,
    settings: WsSettings,
) {
    let (conn, mut outbound) = Connection::open(user_id, settings.outbound_queue_capacity);
    let connection_id = conn.id();
    if let Err(err) = hub.register(conn).await {
        tracing::warn!(%connection_id, %user_id, error = %err, "ws registration failed");
        return;
    }

    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut ping = interval_at(Instant::now() + settings.ping_interval, settings.ping_interval);
    let mut last_seen = Instant::now();

    loop {
        tokio::select! {
            // Incoming frame from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        last_seen = Instant::now();
                        let response = handle_text_message(text.as_str(), &hub, connection_id).await;
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!(%connection_id, error = %err, "ws read error");
                        break;
                    }
                    Some(Ok(_)) => last_seen = Instant::now(),
                }
            }
            // Envelope routed to this connection
            envelope = outbound.recv() => {
                let Some(envelope) = envelope else {
                    tracing::debug!(%connection_id, "outbound queue closed by hub");
                    break;
                };
                let json = match serde_json::to_string(&WsMessage::event(&envelope)) {
                    Ok(json) => json,
                    Err(err) => {
                        tracing::warn!(
                            %connection_id,
                            message_id = %envelope.id,
                            error = %err,
                            "failed to encode event, skipping"
                        );
                        continue;
                    }
                };
                if ws_tx.send(Message::text(json)).await.is_err() {
                    break;
                }
            }
            _ = ping.tick() => {
                if last_seen.elapsed() >= settings.idle_timeout {
                    tracing::debug!(%connection_id, "ws connection idle, closing");
                    break;
                }
                if ws_tx.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    if let Err(err) = hub.unregister(connection_id).await {
        tracing::warn!(%connection_id, error = %err, "ws unregister failed");
    }
    let _ = ws_tx.close().await;
    tracing::debug!(%connection_id, "ws connection closed");
}

/// Handles a text frame from the client, returning an optional JSON reply.
async fn handle_text_message(
    text: &str,
    hub: &HubHandle,
    connection_id: ConnectionId,
) -> Option<String> {
    let request = match serde_json::from_str::<WsRequest>(text) {
        Ok(request) => request,
        Err(err) => {
            let err = HubError::InvalidRequest(format!("malformed command: {err}"));
            return serde_json::to_string(&WsMessage::error(String::new(), &err)).ok();
        }
    };

    let reply = match request.command {
        WsCommand::Join { scope, room_id } => {
            match hub.join_room(scope, room_id, connection_id).await {
                Ok(joined) => WsMessage::response(
                    request.id,
                    serde_json::json!({
                        "joined": RoomKey::new(scope, room_id).to_string(),
                        "new_member": joined,
                    }),
                ),
                Err(err) => WsMessage::error(request.id, &err),
            }
        }
        WsCommand::Leave { scope, room_id } => {
            let was_member = hub.leave_room(scope, room_id, connection_id).await;
            WsMessage::response(
                request.id,
                serde_json::json!({
                    "left": RoomKey::new(scope, room_id).to_string(),
                    "was_member": was_member,
                }),
            )
        }
        WsCommand::Ping => WsMessage::response(request.id, serde_json::json!({ "pong": true })),
    };
    serde_json::to_string(&reply).ok()
}
