//! Room keys: the addressable groups a connection can join.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Scope tag of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoomScope {
    /// A single chat channel.
    Channel,
    /// Every channel of a workspace.
    Workspace,
}

/// Index key of a room: scope tag plus scope-specific identifier.
///
/// Two keys are equal iff both the scope and the id are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoomKey {
    scope: RoomScope,
    id: uuid::Uuid,
}

impl RoomKey {
    /// Creates a room key.
    #[must_use]
    pub const fn new(scope: RoomScope, id: uuid::Uuid) -> Self {
        Self { scope, id }
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = match self.scope {
            RoomScope::Channel => "channel",
            RoomScope::Workspace => "workspace",
        };
        write!(f, "{scope}:{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_differ_by_scope() {
        let id = uuid::Uuid::new_v4();
        assert_ne!(
            RoomKey::new(RoomScope::Channel, id),
            RoomKey::new(RoomScope::Workspace, id)
        );
    }

    #[test]
    fn display_uses_scope_prefix() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(
            RoomKey::new(RoomScope::Workspace, id).to_string(),
            format!("workspace:{id}")
        );
    }
}
