//! Message envelopes routed by the hub.
//!
//! An [`Envelope`] pairs an [`Audience`] with an opaque JSON payload. It is
//! built by a producer (REST endpoint, application event), consumed once by
//! the dispatcher, and shared between recipients behind an `Arc`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{RoomKey, RoomScope, UserId};

/// Audience selector of an envelope. Exactly one scope applies.
///
/// Serialized as `{"scope": "channel", "id": "<uuid>"}`, or
/// `{"scope": "global"}` for the global variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "id", rename_all = "snake_case")]
pub enum Audience {
    /// Members of a channel room.
    Channel(uuid::Uuid),
    /// Members of a workspace room.
    Workspace(uuid::Uuid),
    /// Every session of one user.
    User(UserId),
    /// Every registered connection.
    Global,
}

impl Audience {
    /// Returns the room key addressed by this audience, if it is room-scoped.
    #[must_use]
    pub const fn room_key(&self) -> Option<RoomKey> {
        match self {
            Self::Channel(id) => Some(RoomKey::new(RoomScope::Channel, *id)),
            Self::Workspace(id) => Some(RoomKey::new(RoomScope::Workspace, *id)),
            Self::User(_) | Self::Global => None,
        }
    }
}

/// A message addressed to an audience.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Server-generated message id.
    pub id: uuid::Uuid,
    /// Who receives the message.
    pub audience: Audience,
    /// Application event name (e.g. `"message.created"`).
    pub event: String,
    /// Opaque payload; the hub never inspects it.
    pub payload: serde_json::Value,
    /// Creation timestamp.
    pub timestamp: DateTime<Utc>,
}

impl Envelope {
    /// Builds a new envelope stamped with a fresh id and the current time.
    #[must_use]
    pub fn new(audience: Audience, event: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            audience,
            event: event.into(),
            payload,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn room_scoped_audiences_map_to_keys() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(
            Audience::Channel(id).room_key(),
            Some(RoomKey::new(RoomScope::Channel, id))
        );
        assert_eq!(
            Audience::Workspace(id).room_key(),
            Some(RoomKey::new(RoomScope::Workspace, id))
        );
        assert_eq!(Audience::User(UserId::from_uuid(id)).room_key(), None);
        assert_eq!(Audience::Global.room_key(), None);
    }

    #[test]
    fn audience_wire_shape() {
        let id = uuid::Uuid::new_v4();
        let Ok(json) = serde_json::to_value(Audience::Channel(id)) else {
            panic!("serialization failed");
        };
        assert_eq!(json, serde_json::json!({ "scope": "channel", "id": id }));

        let Ok(global) = serde_json::from_value::<Audience>(serde_json::json!({ "scope": "global" }))
        else {
            panic!("global audience should parse without an id");
        };
        assert_eq!(global, Audience::Global);
    }

    #[test]
    fn unknown_scope_is_rejected() {
        let parsed = serde_json::from_value::<Audience>(serde_json::json!({
            "scope": "galaxy",
            "id": uuid::Uuid::new_v4(),
        }));
        assert!(parsed.is_err());
    }
}
