//! Connection handles and their bounded outbound queues.
//!
//! [`Connection::open`] splits one live client connection into two halves:
//!
//! - [`Connection`]: the routing half, moved into the hub on registration.
//!   It owns the only sender of the outbound queue, so dropping it (which
//!   the hub does on unregister) closes the queue.
//! - [`Outbound`]: the transport half, drained by the per-connection writer
//!   until it yields `None`.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::{ConnectionId, Envelope, UserId};

/// Outcome of a single non-blocking delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The envelope was enqueued.
    Delivered,
    /// The queue was full; the envelope was dropped for this recipient.
    Dropped,
    /// The transport side is gone; nothing will ever drain this queue.
    Closed,
}

/// Routing half of a live connection.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    user_id: UserId,
    sender: mpsc::Sender<Arc<Envelope>>,
}

impl Connection {
    /// Opens a new connection handle with an outbound queue of `capacity`
    /// envelopes (clamped to at least one).
    #[must_use]
    pub fn open(user_id: UserId, capacity: usize) -> (Self, Outbound) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let id = ConnectionId::new();
        (
            Self {
                id,
                user_id,
                sender,
            },
            Outbound { id, receiver },
        )
    }

    /// Returns the opaque connection identity.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the authenticated principal behind this connection.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Attempts to enqueue `envelope` without waiting for queue space.
    pub fn try_deliver(&self, envelope: &Arc<Envelope>) -> Delivery {
        match self.sender.try_send(Arc::clone(envelope)) {
            Ok(()) => Delivery::Delivered,
            Err(TrySendError::Full(_)) => Delivery::Dropped,
            Err(TrySendError::Closed(_)) => Delivery::Closed,
        }
    }
}

/// Transport half of a live connection: the receiving end of its queue.
#[derive(Debug)]
pub struct Outbound {
    id: ConnectionId,
    receiver: mpsc::Receiver<Arc<Envelope>>,
}

impl Outbound {
    /// Returns the identity of the connection this queue belongs to.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Waits for the next envelope.
    ///
    /// Returns `None` once the hub has closed the queue and every buffered
    /// envelope has been drained.
    pub async fn recv(&mut self) -> Option<Arc<Envelope>> {
        self.receiver.recv().await
    }

    /// Takes the next buffered envelope without waiting.
    pub fn try_recv(&mut self) -> Option<Arc<Envelope>> {
        self.receiver.try_recv().ok()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::Audience;

    fn envelope(n: u64) -> Arc<Envelope> {
        Arc::new(Envelope::new(
            Audience::Global,
            "test",
            serde_json::json!({ "n": n }),
        ))
    }

    fn user() -> UserId {
        UserId::from_uuid(uuid::Uuid::new_v4())
    }

    #[test]
    fn full_queue_drops_without_blocking() {
        let (conn, mut out) = Connection::open(user(), 1);
        assert_eq!(conn.try_deliver(&envelope(1)), Delivery::Delivered);
        assert_eq!(conn.try_deliver(&envelope(2)), Delivery::Dropped);

        let Some(first) = out.try_recv() else {
            panic!("expected the envelope that fit");
        };
        assert_eq!(first.payload["n"], 1);
        assert!(out.try_recv().is_none());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let (conn, _out) = Connection::open(user(), 0);
        assert_eq!(conn.try_deliver(&envelope(1)), Delivery::Delivered);
    }

    #[test]
    fn dropped_transport_reports_closed() {
        let (conn, out) = Connection::open(user(), 4);
        drop(out);
        assert_eq!(conn.try_deliver(&envelope(1)), Delivery::Closed);
    }

    #[tokio::test]
    async fn dropping_routing_half_closes_queue_after_drain() {
        let (conn, mut out) = Connection::open(user(), 4);
        assert_eq!(out.id(), conn.id());
        conn.try_deliver(&envelope(7));
        drop(conn);

        let Some(buffered) = out.recv().await else {
            panic!("buffered envelope should still drain");
        };
        assert_eq!(buffered.payload["n"], 7);
        assert!(out.recv().await.is_none());
    }
}
