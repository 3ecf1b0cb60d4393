//! TOML file configuration structures.
//!
//! These structs directly map to the `chainwatch.toml` file format.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port the API listens on (e.g., "127.0.0.1:7777").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 7777))
}

/// Monitor configuration section. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Disable block data collection.
    pub no_collect_block_data: bool,
    /// Disable stake info collection.
    pub no_collect_stake_info: bool,
    /// Disable all chain monitoring.
    pub no_monitor: bool,
    /// Monitor every transaction entering the mempool.
    pub monitor_mempool: bool,
    /// Addresses to watch for received and spent transactions.
    pub watch_addresses: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parsing() {
        let toml_str = r#"
[server]
listen = "0.0.0.0:3000"

[monitor]
no_collect_stake_info = true
monitor_mempool = true
watch_addresses = ["DsUxwT6KbiSNJWm7CoQwdNzKYdJV2F8bbYQ", "DsTgRBEeRHm2gyaYS5UUXQqpD8Xt1zWUFfa"]
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 3000);
        assert!(config.monitor.no_collect_stake_info);
        assert!(!config.monitor.no_collect_block_data);
        assert!(config.monitor.monitor_mempool);
        assert_eq!(config.monitor.watch_addresses.len(), 2);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.listen, default_listen_addr());
        assert!(!config.monitor.no_monitor);
        assert!(!config.monitor.monitor_mempool);
        assert!(config.monitor.watch_addresses.is_empty());
    }
}
