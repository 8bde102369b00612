//! WebSocket transport: upgrade, per-connection loop, wire messages.
//!
//! The endpoint at `/ws` admits a connection to the hub, lets the client
//! join and leave rooms, and streams every envelope routed to it.

pub mod connection;
pub mod handler;
pub mod messages;
