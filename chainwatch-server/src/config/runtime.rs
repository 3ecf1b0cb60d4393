//! Validated runtime configuration.
//!
//! The monitor section is converted into `chainwatch_core::config::MonitorConfig`,
//! which the hub and producers consume.

use std::net::SocketAddr;

pub use chainwatch_core::config::MonitorConfig;

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// The address and port the API listens on.
    pub listen: SocketAddr,
}
