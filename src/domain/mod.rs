//! Domain layer: identities, room keys, envelopes, and connection handles.
//!
//! These are the value types the hub routes on. None of them hold shared
//! state; the hub module owns the registry and room index built from them.

pub mod connection;
pub mod envelope;
pub mod ids;
pub mod room;

pub use connection::{Connection, Delivery, Outbound};
pub use envelope::{Audience, Envelope};
pub use ids::{ConnectionId, UserId};
pub use room::{RoomKey, RoomScope};
