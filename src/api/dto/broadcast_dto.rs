//! Broadcast DTOs for the application producer endpoint.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Audience, Envelope};
use crate::error::HubError;
use crate::hub::DispatchReport;

/// Request body for `POST /broadcast`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BroadcastRequest {
    /// Audience selector, e.g. `{"scope": "channel", "id": "<uuid>"}` or
    /// `{"scope": "global"}`.
    #[schema(value_type = Object)]
    pub audience: Audience,
    /// Application event name (e.g. `"message.created"`).
    pub event: String,
    /// Opaque payload forwarded to every recipient.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub payload: serde_json::Value,
}

impl BroadcastRequest {
    /// Validates the request and turns it into an envelope.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::InvalidRequest`] if the event name is blank.
    pub fn into_envelope(self) -> Result<Envelope, HubError> {
        let event = self.event.trim();
        if event.is_empty() {
            return Err(HubError::InvalidRequest(
                "event must not be empty".to_string(),
            ));
        }
        Ok(Envelope::new(self.audience, event, self.payload))
    }
}

/// Response body for `POST /broadcast`.
#[derive(Debug, Serialize, ToSchema)]
pub struct BroadcastResponse {
    /// Id assigned to the dispatched message.
    pub message_id: uuid::Uuid,
    /// Recipients whose queue accepted the message.
    pub delivered: usize,
    /// Recipients whose queue was full.
    pub dropped: usize,
    /// Recipients whose connection was already closing.
    pub closed: usize,
}

impl BroadcastResponse {
    /// Builds the response from the dispatched message id and its report.
    #[must_use]
    pub const fn new(message_id: uuid::Uuid, report: DispatchReport) -> Self {
        Self {
            message_id,
            delivered: report.delivered,
            dropped: report.dropped,
            closed: report.closed,
        }
    }
}
