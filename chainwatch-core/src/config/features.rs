use super::MonitorConfig;
use crate::events::EventClass;

/// Feature flags derived from a [`MonitorConfig`].
///
/// These gate both channel allocation in the hub and the producers and
/// consumers that use each channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    pub collect_block_data: bool,
    pub collect_stake_info: bool,
    pub monitor_enabled: bool,
    pub has_watched_addresses: bool,
    pub monitor_mempool: bool,
}

impl FeatureFlags {
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            collect_block_data: !config.no_collect_block_data,
            collect_stake_info: !config.no_collect_stake_info,
            monitor_enabled: !config.no_monitor,
            has_watched_addresses: !config.watch_addresses.is_empty(),
            monitor_mempool: config.monitor_mempool,
        }
    }

    /// Whether the channel for `class` is needed.
    pub fn wants(&self, class: EventClass) -> bool {
        match class {
            EventClass::BlockConnected => self.collect_block_data && self.monitor_enabled,
            EventClass::StakeInfoConnected => self.collect_stake_info && self.monitor_enabled,
            // Relevant mempool txs come from address matching, so they share
            // the watched-address guard.
            EventClass::AddressReceived
            | EventClass::AddressSpent
            | EventClass::RelevantMempoolTx => self.has_watched_addresses && self.monitor_enabled,
            EventClass::NewMempoolTx => self.monitor_mempool,
        }
    }
}

impl From<&MonitorConfig> for FeatureFlags {
    fn from(config: &MonitorConfig) -> Self {
        Self::from_config(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_collects_blocks_and_stake() {
        let flags = FeatureFlags::from_config(&MonitorConfig::default());
        assert!(flags.collect_block_data);
        assert!(flags.collect_stake_info);
        assert!(flags.monitor_enabled);
        assert!(!flags.has_watched_addresses);
        assert!(!flags.monitor_mempool);

        let wanted: Vec<_> = EventClass::ALL
            .into_iter()
            .filter(|c| flags.wants(*c))
            .collect();
        assert_eq!(
            wanted,
            vec![EventClass::BlockConnected, EventClass::StakeInfoConnected]
        );
    }

    #[test]
    fn test_no_monitor_leaves_only_mempool() {
        let config = MonitorConfig {
            no_monitor: true,
            monitor_mempool: true,
            watch_addresses: vec!["DsUxwT6KbiSNJWm7CoQwdNzKYdJV2F8bbYQ".into()],
            ..Default::default()
        };
        let flags = FeatureFlags::from_config(&config);
        for class in EventClass::ALL {
            assert_eq!(flags.wants(class), class == EventClass::NewMempoolTx);
        }
    }

    #[test]
    fn test_watched_addresses_gate_address_classes() {
        let config = MonitorConfig {
            watch_addresses: vec!["DsA".into()],
            ..Default::default()
        };
        let flags = FeatureFlags::from(&config);
        assert!(flags.wants(EventClass::AddressReceived));
        assert!(flags.wants(EventClass::AddressSpent));
        assert!(flags.wants(EventClass::RelevantMempoolTx));
        assert!(!flags.wants(EventClass::NewMempoolTx));
    }
}
