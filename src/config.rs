//! Hub configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;
use std::time::Duration;

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Top-level service configuration.
///
/// Loaded once at startup via [`HubConfig::from_env`].
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:8080`).
    pub listen_addr: SocketAddr,

    /// Capacity of each connection's outbound queue. Messages beyond this
    /// are dropped for that connection.
    pub outbound_queue_capacity: usize,

    /// Capacity of the dispatcher's event stream.
    pub event_queue_capacity: usize,

    /// Interval between server-initiated WebSocket pings.
    pub ping_interval: Duration,

    /// A connection that sends nothing (not even a pong) for this long is
    /// closed.
    pub idle_timeout: Duration,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            outbound_queue_capacity: 256,
            event_queue_capacity: 1024,
            ping_interval: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(60),
            log_format: LogFormat::Pretty,
        }
    }
}

impl HubConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file, then
    /// defers to [`HubConfig::from_vars`].
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds configuration from a variable lookup.
    ///
    /// Missing or unparsable numeric values fall back to defaults; zero
    /// capacities and durations are clamped to one.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is present but not a valid
    /// [`SocketAddr`].
    pub fn from_vars<F>(var: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parse = |key: &str, default: u64| -> u64 {
            var(key).and_then(|v| v.trim().parse().ok()).unwrap_or(default)
        };
        let capacity = |key: &str, default: usize| -> usize {
            var(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
                .max(1)
        };

        let listen_addr = match var("LISTEN_ADDR") {
            Some(raw) => raw.trim().parse()?,
            None => defaults.listen_addr,
        };

        let log_format = match var("LOG_FORMAT").as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            listen_addr,
            outbound_queue_capacity: capacity(
                "OUTBOUND_QUEUE_CAPACITY",
                defaults.outbound_queue_capacity,
            ),
            event_queue_capacity: capacity("EVENT_QUEUE_CAPACITY", defaults.event_queue_capacity),
            ping_interval: Duration::from_secs(
                parse("WS_PING_INTERVAL_SECS", defaults.ping_interval.as_secs()).max(1),
            ),
            idle_timeout: Duration::from_secs(
                parse("WS_IDLE_TIMEOUT_SECS", defaults.idle_timeout.as_secs()).max(1),
            ),
            log_format,
        })
    }
}
