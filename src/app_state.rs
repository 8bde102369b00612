//! Shared application state injected into all Axum handlers.

use std::time::Duration;

use crate::config::HubConfig;
use crate::hub::HubHandle;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Handle to the running broadcast hub.
    pub hub: HubHandle,
    /// Per-connection WebSocket settings.
    pub ws: WsSettings,
}

/// Settings the WebSocket transport needs for every connection.
#[derive(Debug, Clone, Copy)]
pub struct WsSettings {
    /// Capacity of each connection's outbound queue.
    pub outbound_queue_capacity: usize,
    /// Interval between server pings.
    pub ping_interval: Duration,
    /// Close the connection after this long without inbound frames.
    pub idle_timeout: Duration,
}

impl From<&HubConfig> for WsSettings {
    fn from(config: &HubConfig) -> Self {
        Self {
            outbound_queue_capacity: config.outbound_queue_capacity,
            ping_interval: config.ping_interval,
            idle_timeout: config.idle_timeout,
        }
    }
}

impl AppState {
    /// Builds state from a hub handle and the loaded configuration.
    #[must_use]
    pub fn new(hub: HubHandle, config: &HubConfig) -> Self {
        Self {
            hub,
            ws: WsSettings::from(config),
        }
    }
}
