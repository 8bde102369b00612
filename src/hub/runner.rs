//! Serialized event stream in front of the hub.
//!
//! [`HubHandle::spawn`] starts the single dispatcher task. Register,
//! unregister, and broadcast requests are queued as [`HubEvent`]s on a
//! bounded [`tokio::sync::mpsc`] channel and applied one at a time, in
//! arrival order. Register and unregister carry a oneshot reply so the
//! caller observes the effect before it continues (a join issued right
//! after registration never races the dispatcher).
//!
//! Join and leave bypass the stream and go straight to the [`Hub`].
//!
//! The task exits once every handle has been dropped.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::{DispatchReport, Hub, HubStats};
use crate::domain::{Connection, ConnectionId, Envelope, RoomScope};
use crate::error::HubError;

/// A request queued to the dispatcher task.
#[derive(Debug)]
pub enum HubEvent {
    /// Admit a connection.
    Register {
        /// The routing half of the new connection.
        conn: Connection,
        /// Receives the outcome of the registration.
        reply: oneshot::Sender<Result<(), HubError>>,
    },
    /// Remove a connection and close its queue.
    Unregister {
        /// Connection to remove.
        id: ConnectionId,
        /// Receives `true` if the connection was registered.
        reply: oneshot::Sender<bool>,
    },
    /// Fan an envelope out to its audience.
    Broadcast {
        /// The message to deliver.
        envelope: Arc<Envelope>,
        /// Receives the delivery counts, if the producer asked for them.
        reply: Option<oneshot::Sender<DispatchReport>>,
    },
}

/// Cloneable handle to a running hub.
///
/// Pass one into every transport task that needs to register, broadcast,
/// or change room membership.
#[derive(Debug, Clone)]
pub struct HubHandle {
    hub: Arc<Hub>,
    events: mpsc::Sender<HubEvent>,
}

impl HubHandle {
    /// Spawns the dispatcher task for `hub` with an event stream of
    /// `capacity` pending requests (clamped to at least one).
    #[must_use]
    pub fn spawn(hub: Arc<Hub>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (events, rx) = mpsc::channel(capacity.max(1));
        let task = tokio::spawn(run(Arc::clone(&hub), rx));
        (Self { hub, events }, task)
    }

    /// Registers a connection through the event stream and waits until the
    /// dispatcher has applied it.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::HubClosed`] if the dispatcher is gone, or
    /// [`HubError::AlreadyRegistered`] for a duplicate id.
    pub async fn register(&self, conn: Connection) -> Result<(), HubError> {
        let (reply, rx) = oneshot::channel();
        self.send(HubEvent::Register { conn, reply }).await?;
        rx.await.map_err(|_| HubError::HubClosed)?
    }

    /// Unregisters a connection through the event stream and waits until
    /// the dispatcher has applied it. Returns `false` if it was not
    /// registered.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::HubClosed`] if the dispatcher is gone.
    pub async fn unregister(&self, id: ConnectionId) -> Result<bool, HubError> {
        let (reply, rx) = oneshot::channel();
        self.send(HubEvent::Unregister { id, reply }).await?;
        rx.await.map_err(|_| HubError::HubClosed)
    }

    /// Queues an envelope for dispatch without waiting for delivery.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::HubClosed`] if the dispatcher is gone.
    pub async fn broadcast(&self, envelope: Envelope) -> Result<(), HubError> {
        self.send(HubEvent::Broadcast {
            envelope: Arc::new(envelope),
            reply: None,
        })
        .await
    }

    /// Queues an envelope and waits for its delivery counts.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::HubClosed`] if the dispatcher is gone.
    pub async fn dispatch(&self, envelope: Envelope) -> Result<DispatchReport, HubError> {
        let (reply, rx) = oneshot::channel();
        self.send(HubEvent::Broadcast {
            envelope: Arc::new(envelope),
            reply: Some(reply),
        })
        .await?;
        rx.await.map_err(|_| HubError::HubClosed)
    }

    /// Joins a room directly, outside the event stream.
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
        self.hub.join_room(scope, id, conn).await
    }

    /// Leaves a room directly, outside the event stream.
    pub async fn leave_room(&self, scope: RoomScope, id: uuid::Uuid, conn: ConnectionId) -> bool {
        self.hub.leave_room(scope, id, conn).await
    }

    /// Returns `false` once the dispatcher task has stopped.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.events.is_closed()
    }

    /// Returns current hub counters.
    pub async fn stats(&self) -> HubStats {
        self.hub.stats().await
    }

    async fn send(&self, event: HubEvent) -> Result<(), HubError> {
        self.events
            .send(event)
            .await
            .map_err(|_| HubError::HubClosed)
    }
}

/// Dispatcher loop: applies queued events one at a time until every
/// sender is dropped.
async fn run(hub: Arc<Hub>, mut events: mpsc::Receiver<HubEvent>) {
    tracing::debug!("hub dispatcher started");
    while let Some(event) = events.recv().await {
        match event {
            HubEvent::Register { conn, reply } => {
                let result = hub.register(conn).await;
                if let Err(err) = &result {
                    tracing::warn!(error = %err, "registration rejected");
                }
                let _ = reply.send(result);
            }
            HubEvent::Unregister { id, reply } => {
                let _ = reply.send(hub.unregister(id).await);
            }
            HubEvent::Broadcast { envelope, reply } => {
                let report = hub.broadcast(envelope).await;
                if let Some(reply) = reply {
                    let _ = reply.send(report);
                }
            }
        }
    }
    tracing::debug!("hub dispatcher stopped");
}
