//! Monitor configuration.

use compact_str::CompactString;

/// Runtime monitoring configuration.
///
/// The `no_*` switches are opt-out and default to `false`; mempool
/// monitoring and address watching are opt-in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Disable block data collection.
    pub no_collect_block_data: bool,
    /// Disable stake info collection.
    pub no_collect_stake_info: bool,
    /// Disable all chain monitoring.
    pub no_monitor: bool,
    /// Watch every transaction entering the mempool.
    pub monitor_mempool: bool,
    /// Addresses whose received and spent transactions are tracked.
    pub watch_addresses: Vec<CompactString>,
}
