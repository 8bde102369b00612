//! WebSocket message types: envelope, commands, and events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Envelope, RoomScope};
use crate::error::HubError;

/// Top-level server → client WebSocket message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for responses; message id for events.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Server → Client response to a command.
    Response,
    /// Server → Client broadcast event.
    Event,
    /// Server → Client error.
    Error,
}

impl WsMessage {
    /// Wraps a routed envelope as an event frame.
    #[must_use]
    pub fn event(envelope: &Envelope) -> Self {
        Self {
            id: envelope.id.to_string(),
            msg_type: WsMessageType::Event,
            timestamp: envelope.timestamp,
            payload: serde_json::json!({
                "audience": envelope.audience,
                "event": envelope.event,
                "data": envelope.payload,
            }),
        }
    }

    /// Builds a successful command response.
    #[must_use]
    pub fn response(id: String, payload: serde_json::Value) -> Self {
        Self {
            id,
            msg_type: WsMessageType::Response,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Builds an error reply from a [`HubError`].
    #[must_use]
    pub fn error(id: String, err: &HubError) -> Self {
        Self {
            id,
            msg_type: WsMessageType::Error,
            timestamp: Utc::now(),
            payload: serde_json::json!({
                "code": err.error_code(),
                "message": err.to_string(),
            }),
        }
    }
}

/// A client → server command with its correlation id.
#[derive(Debug, Clone, Deserialize)]
pub struct WsRequest {
    /// Correlation id echoed in the response.
    #[serde(default)]
    pub id: String,
    /// The command itself.
    #[serde(flatten)]
    pub command: WsCommand,
}

/// Commands that a client can send over WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Join a channel or workspace room.
    Join {
        /// Room scope.
        scope: RoomScope,
        /// Channel or workspace id.
        room_id: uuid::Uuid,
    },
    /// Leave a channel or workspace room.
    Leave {
        /// Room scope.
        scope: RoomScope,
        /// Channel or workspace id.
        room_id: uuid::Uuid,
    },
    /// Application-level liveness probe.
    Ping,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::Audience;

    #[test]
    fn parses_join_command() {
        let room = uuid::Uuid::new_v4();
        let raw = serde_json::json!({
            "id": "req-1",
            "command": "join",
            "scope": "workspace",
            "room_id": room,
        });
        let Ok(req) = serde_json::from_value::<WsRequest>(raw) else {
            panic!("join should parse");
        };
        assert_eq!(req.id, "req-1");
        let WsCommand::Join { scope, room_id } = req.command else {
            panic!("expected join");
        };
        assert_eq!(scope, RoomScope::Workspace);
        assert_eq!(room_id, room);
    }

    #[test]
    fn ping_needs_no_id() {
        let Ok(req) = serde_json::from_str::<WsRequest>(r#"{"command":"ping"}"#) else {
            panic!("ping should parse");
        };
        assert!(req.id.is_empty());
        assert!(matches!(req.command, WsCommand::Ping));
    }

    #[test]
    fn rejects_user_scope_rooms() {
        let raw = serde_json::json!({
            "command": "join",
            "scope": "user",
            "room_id": uuid::Uuid::new_v4(),
        });
        assert!(serde_json::from_value::<WsRequest>(raw).is_err());
    }

    #[test]
    fn event_frame_wraps_envelope() {
        let channel = uuid::Uuid::new_v4();
        let envelope = Envelope::new(
            Audience::Channel(channel),
            "message.created",
            serde_json::json!({ "text": "hi" }),
        );
        let msg = WsMessage::event(&envelope);
        assert_eq!(msg.msg_type, WsMessageType::Event);
        assert_eq!(msg.id, envelope.id.to_string());
        assert_eq!(msg.payload["event"], "message.created");
        assert_eq!(msg.payload["data"]["text"], "hi");
        assert_eq!(msg.payload["audience"]["scope"], "channel");
    }

    #[test]
    fn error_frame_carries_code_and_message() {
        let msg = WsMessage::error("r9".to_string(), &HubError::HubClosed);
        assert_eq!(msg.msg_type, WsMessageType::Error);
        assert_eq!(msg.id, "r9");
        assert_eq!(msg.payload["code"], 3001);
        assert_eq!(msg.payload["message"], "hub is shut down");
    }
}
