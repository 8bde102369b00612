//! Best-effort fan-out of one envelope to its resolved recipients.

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Connection, Delivery, Envelope};

/// Per-broadcast delivery counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct DispatchReport {
    /// Recipients whose queue accepted the envelope.
    pub delivered: usize,
    /// Recipients whose queue was full.
    pub dropped: usize,
    /// Recipients whose transport had already gone away.
    pub closed: usize,
}

impl DispatchReport {
    /// Total number of recipients the audience resolved to.
    #[must_use]
    pub const fn recipients(&self) -> usize {
        self.delivered + self.dropped + self.closed
    }

    fn record(&mut self, outcome: Delivery) {
        match outcome {
            Delivery::Delivered => self.delivered += 1,
            Delivery::Dropped => self.dropped += 1,
            Delivery::Closed => self.closed += 1,
        }
    }
}

/// Enqueues `envelope` on every recipient without waiting on any of them.
///
/// A full or closed queue only affects its own recipient.
pub fn deliver<'a, I>(recipients: I, envelope: &Arc<Envelope>) -> DispatchReport
where
    I: IntoIterator<Item = &'a Connection>,
{
    let mut report = DispatchReport::default();
    for conn in recipients {
        let outcome = conn.try_deliver(envelope);
        match outcome {
            Delivery::Delivered => {}
            Delivery::Dropped => tracing::debug!(
                connection_id = %conn.id(),
                user_id = %conn.user_id(),
                message_id = %envelope.id,
                "outbound queue full, message dropped"
            ),
            Delivery::Closed => tracing::debug!(
                connection_id = %conn.id(),
                message_id = %envelope.id,
                "outbound queue closed"
            ),
        }
        report.record(outcome);
    }
    report
}
