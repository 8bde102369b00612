//! The message broadcast hub.
//!
//! [`Hub`] composes the registry, the room index, and the dispatcher behind
//! a single [`tokio::sync::RwLock`]:
//!
//! - register, unregister, join, and leave take the write lock;
//! - audience resolution takes the read lock, so broadcasts resolve
//!   concurrently with each other but never with a mutation.
//!
//! Delivery happens under the read lock but never waits: every enqueue is a
//! `try_send`, so no lock is held across a blocking point.
//!
//! [`HubHandle`] adds the serialized event stream on top: register,
//! unregister, and broadcast requests are queued to one dispatcher task and
//! applied in arrival order, while join and leave go straight to the hub.

pub mod dispatch;
pub mod runner;
pub mod state;

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use utoipa::ToSchema;

pub use dispatch::DispatchReport;
pub use runner::{HubEvent, HubHandle};
pub use state::HubState;

use crate::domain::{Connection, ConnectionId, Envelope, RoomKey, RoomScope};
use crate::error::HubError;

/// Point-in-time counters of the hub.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct HubStats {
    /// Registered connections.
    pub connections: usize,
    /// Non-empty rooms.
    pub rooms: usize,
    /// Distinct connected users.
    pub users: usize,
}

/// Registry, room index, and dispatcher behind one reader-writer lock.
#[derive(Debug, Default)]
pub struct Hub {
    state: RwLock<HubState>,
}

impl Hub {
    /// Creates an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits a connection; it becomes visible to global and user broadcasts.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::AlreadyRegistered`] if the id is already present.
    pub async fn register(&self, conn: Connection) -> Result<(), HubError> {
        let id = conn.id();
        let user_id = conn.user_id();
        let connections = {
            let mut state = self.state.write().await;
            state.register(conn)?;
            state.connection_count()
        };
        tracing::info!(connection_id = %id, %user_id, connections, "connection registered");
        Ok(())
    }

    /// Removes a connection from the registry and every room, and closes its
    /// outbound queue.
    ///
    /// Returns `false` if the connection was not registered; calling this
    /// twice is therefore a harmless no-op.
    pub async fn unregister(&self, id: ConnectionId) -> bool {
        let (removed, connections) = {
            let mut state = self.state.write().await;
            let removed = state.unregister(id);
            (removed, state.connection_count())
        };
        match removed {
            Some(conn) => {
                tracing::info!(
                    connection_id = %id,
                    user_id = %conn.user_id(),
                    connections,
                    "connection unregistered"
                );
                // Dropping the routing half closes the outbound queue.
                drop(conn);
                true
            }
            None => {
                tracing::debug!(connection_id = %id, "unregister of unknown connection ignored");
                false
            }
        }
    }

    /// Adds a registered connection to room `(scope, id)`.
    ///
    /// Returns `true` if it was not already a member.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotRegistered`] if the connection is unknown.
    pub async fn join_room(
        &self,
        scope: RoomScope,
        id: uuid::Uuid,
        conn: ConnectionId,
    ) -> Result<bool, HubError> {
        let key = RoomKey::new(scope, id);
        let joined = self.state.write().await.join(key, conn)?;
        if joined {
            tracing::debug!(connection_id = %conn, room = %key, "joined room");
        }
        Ok(joined)
    }

    /// Removes a connection from room `(scope, id)`, pruning the room if it
    /// becomes empty. Returns `true` if the connection was a member.
    pub async fn leave_room(&self, scope: RoomScope, id: uuid::Uuid, conn: ConnectionId) -> bool {
        let key = RoomKey::new(scope, id);
        let left = self.state.write().await.leave(key, conn);
        if left {
            tracing::debug!(connection_id = %conn, room = %key, "left room");
        }
        left
    }

    /// Resolves the envelope's audience and enqueues it on each recipient.
    ///
    /// Never waits for queue space; full queues drop the envelope for that
    /// recipient only.
    pub async fn broadcast(&self, envelope: Arc<Envelope>) -> DispatchReport {
        let state = self.state.read().await;
        let report = dispatch::deliver(state.recipients(&envelope.audience), &envelope);
        drop(state);
        tracing::trace!(
            message_id = %envelope.id,
            event = %envelope.event,
            delivered = report.delivered,
            dropped = report.dropped,
            recipients = report.recipients(),
            "broadcast dispatched"
        );
        report
    }

    #[cfg(test)]
    pub(crate) async fn room_members(
        &self,
        key: RoomKey,
    ) -> std::collections::HashSet<ConnectionId> {
        self.state.read().await.room_members(&key)
    }

    /// Returns current counters.
    pub async fn stats(&self) -> HubStats {
        let state = self.state.read().await;
        HubStats {
            connections: state.connection_count(),
            rooms: state.room_count(),
            users: state.user_count(),
        }
    }
}
