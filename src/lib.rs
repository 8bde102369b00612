//! # chat-hub
//!
//! In-process message broadcast hub for a real-time chat backend.
//!
//! The hub tracks live WebSocket connections, groups them into rooms keyed
//! by channel or workspace, and routes each message to a room, a user, or
//! everyone without ever blocking the sender. Delivery is best-effort: a
//! recipient whose outbound queue is full misses the message.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)      POST /api/v1/broadcast
//!     ├── WS Handler (ws/)          join / leave / receive
//!     │
//!     ├── HubHandle (hub/runner)    serialized register/unregister/broadcast
//!     ├── Hub (hub/)                RwLock<registry + room index>
//!     │
//!     └── Connection queues (domain/)  bounded, try_send only
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod hub;
pub mod ws;
