//! Hub error types with HTTP status code mapping.
//!
//! [`HubError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! Capacity exhaustion is deliberately absent: a full outbound queue is a
//! drop, not an error.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ConnectionId;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid request: unknown room scope",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Hub error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                  |
/// |-----------|-----------------|------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request              |
/// | 2000–2999 | Caller misuse   | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server          | 503 Service Unavailable      |
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Room membership change for a connection that is not registered.
    #[error("connection not registered: {0}")]
    NotRegistered(ConnectionId),

    /// A connection with this id is already registered.
    #[error("connection already registered: {0}")]
    AlreadyRegistered(ConnectionId),

    /// The dispatcher task is no longer running.
    #[error("hub is shut down")]
    HubClosed,
}

impl HubError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::NotRegistered(_) => 2001,
            Self::AlreadyRegistered(_) => 2002,
            Self::HubClosed => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotRegistered(_) => StatusCode::NOT_FOUND,
            Self::AlreadyRegistered(_) => StatusCode::CONFLICT,
            Self::HubClosed => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Renders this error as the structured body used by HTTP and WebSocket
    /// error replies.
    #[must_use]
    pub fn to_body(&self) -> ErrorResponse {
        ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        }
    }
}

impl IntoResponse for HubError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut response = axum::Json(self.to_body()).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_statuses_line_up() {
        let err = HubError::NotRegistered(ConnectionId::new());
        assert_eq!(err.error_code(), 2001);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(HubError::HubClosed.error_code(), 3001);
        assert_eq!(HubError::HubClosed.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        let dup = HubError::AlreadyRegistered(ConnectionId::new());
        assert_eq!(dup.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn body_carries_message() {
        let body = HubError::InvalidRequest("bad scope".to_string()).to_body();
        assert_eq!(body.error.code, 1001);
        assert_eq!(body.error.message, "invalid request: bad scope");
        assert!(body.error.details.is_none());
    }
}
