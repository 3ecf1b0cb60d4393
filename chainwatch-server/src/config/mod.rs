//! Configuration module for chainwatch-server.
//!
//! Handles loading configuration from a TOML file and applying command
//! line overrides.

pub mod file;
pub mod runtime;

use crate::config::file::FileConfig;
use crate::config::runtime::{MonitorConfig, ServerConfig};
use compact_str::CompactString;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Command line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub listen: Option<SocketAddr>,
    pub no_monitor: bool,
    pub monitor_mempool: bool,
    /// Appended to the file's watch list.
    pub watch_addresses: Vec<String>,
}

/// Loaded configuration result containing all parts.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub monitor: MonitorConfig,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    overrides: Overrides,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, overrides: Overrides) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            overrides,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    /// 4. Build the loaded configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        self.load_str(&config_content)
    }

    fn load_str(&self, content: &str) -> Result<LoadedConfig, ConfigError> {
        let mut file_config: FileConfig = toml::from_str(content)?;
        self.apply_overrides(&mut file_config);
        validate(&file_config)?;
        Ok(build_loaded_config(file_config))
    }

    fn apply_overrides(&self, config: &mut FileConfig) {
        let overrides = &self.overrides;
        if let Some(listen) = overrides.listen {
            config.server.listen = listen;
        }
        config.monitor.no_monitor |= overrides.no_monitor;
        config.monitor.monitor_mempool |= overrides.monitor_mempool;
        config
            .monitor
            .watch_addresses
            .extend(overrides.watch_addresses.iter().cloned());
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for address in &config.monitor.watch_addresses {
        if address.is_empty() || address.chars().any(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "invalid watch address {address:?}"
            )));
        }
        if !seen.insert(address.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "watch address {address} listed more than once"
            )));
        }
    }
    Ok(())
}

fn build_loaded_config(file_config: FileConfig) -> LoadedConfig {
    let monitor = file_config.monitor;
    LoadedConfig {
        server: ServerConfig {
            listen: file_config.server.listen,
        },
        monitor: MonitorConfig {
            no_collect_block_data: monitor.no_collect_block_data,
            no_collect_stake_info: monitor.no_collect_stake_info,
            no_monitor: monitor.no_monitor,
            monitor_mempool: monitor.monitor_mempool,
            watch_addresses: monitor
                .watch_addresses
                .into_iter()
                .map(CompactString::from)
                .collect(),
        },
    }
}
