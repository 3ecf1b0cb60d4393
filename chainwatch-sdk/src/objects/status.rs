use serde::{Deserialize, Serialize};

/// Current API version reported in [`Status`].
pub const API_VERSION: u32 = 1;

/// Snapshot of the daemon's chain view, served by `GET /status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Whether the block-data store has caught up with the chain tip.
    pub ready: bool,
    /// Height of the best block in the store.
    pub height: u32,
    /// Peer connections reported by the chain daemon.
    pub node_connections: i64,
    pub api_version: u32,
    /// Version of the chainwatch daemon.
    pub version: String,
}

impl Status {
    /// A ready status at `height` for the given daemon version.
    pub fn ready_at(height: u32, version: impl Into<String>) -> Self {
        Self {
            ready: true,
            height,
            node_connections: 0,
            api_version: API_VERSION,
            version: version.into(),
        }
    }
}
