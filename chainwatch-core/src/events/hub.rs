//! The notification hub and its lifecycle.
//!
//! The hub is built once from the feature flags and shared (behind `Arc`)
//! with every producer and consumer. It is shut down exactly once by the
//! orchestrator that built it.

use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

use super::channels::NotificationChannel;
use super::types::{BlockHash, BlockHeight, BlockWatchedTx, EventClass, Transaction, TxHash};
use crate::config::FeatureFlags;
use std::sync::Arc;

/// Errors from hub lifecycle operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HubError {
    #[error("notification hub is already shut down")]
    AlreadyShutDown,
}

/// Classes closed by [`NotificationHub::shutdown`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownSummary {
    pub closed: Vec<EventClass>,
}

/// Typed channels for every event class, each present only when the
/// configuration needs it.
pub struct NotificationHub {
    /// Block hashes for the block-data collector.
    pub block_connected: NotificationChannel<BlockHash>,
    /// Block heights for the stake-info collector.
    pub stake_info_connected: NotificationChannel<BlockHeight>,
    pub address_received: NotificationChannel<Arc<BlockWatchedTx>>,
    pub address_spent: NotificationChannel<Arc<BlockWatchedTx>>,
    pub relevant_mempool_tx: NotificationChannel<Arc<Transaction>>,
    pub new_mempool_tx: NotificationChannel<TxHash>,
    shut_down: AtomicBool,
}

impl NotificationHub {
    /// Allocate exactly the channels the flags call for.
    pub fn initialize(flags: &FeatureFlags) -> Self {
        let hub = Self {
            block_connected: channel(flags, EventClass::BlockConnected),
            stake_info_connected: channel(flags, EventClass::StakeInfoConnected),
            address_received: channel(flags, EventClass::AddressReceived),
            address_spent: channel(flags, EventClass::AddressSpent),
            relevant_mempool_tx: channel(flags, EventClass::RelevantMempoolTx),
            new_mempool_tx: channel(flags, EventClass::NewMempoolTx),
            shut_down: AtomicBool::new(false),
        };

        for class in hub.allocated() {
            info!(class = %class, capacity = class.capacity(), "Allocated notification channel");
        }
        hub
    }

    /// Whether the channel for `class` was allocated.
    pub fn is_present(&self, class: EventClass) -> bool {
        match class {
            EventClass::BlockConnected => self.block_connected.is_present(),
            EventClass::StakeInfoConnected => self.stake_info_connected.is_present(),
            EventClass::AddressReceived => self.address_received.is_present(),
            EventClass::AddressSpent => self.address_spent.is_present(),
            EventClass::RelevantMempoolTx => self.relevant_mempool_tx.is_present(),
            EventClass::NewMempoolTx => self.new_mempool_tx.is_present(),
        }
    }

    /// Allocated classes, in declaration order.
    pub fn allocated(&self) -> Vec<EventClass> {
        EventClass::ALL
            .into_iter()
            .filter(|class| self.is_present(*class))
            .collect()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// Close every allocated channel.
    ///
    /// Consumers receive what is still buffered and then the end of the
    /// stream. Only the first call closes anything; later calls return
    /// [`HubError::AlreadyShutDown`].
    pub async fn shutdown(&self) -> Result<ShutdownSummary, HubError> {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return Err(HubError::AlreadyShutDown);
        }

        let mut summary = ShutdownSummary::default();
        let mut record = |class: EventClass, closed: bool| {
            if closed {
                debug!(class = %class, "Closed notification channel");
                summary.closed.push(class);
            }
        };
        record(EventClass::BlockConnected, self.block_connected.close().await);
        record(
            EventClass::StakeInfoConnected,
            self.stake_info_connected.close().await,
        );
        record(EventClass::AddressReceived, self.address_received.close().await);
        record(EventClass::AddressSpent, self.address_spent.close().await);
        record(
            EventClass::RelevantMempoolTx,
            self.relevant_mempool_tx.close().await,
        );
        record(EventClass::NewMempoolTx, self.new_mempool_tx.close().await);

        info!(closed = summary.closed.len(), "Notification hub shut down");
        Ok(summary)
    }
}

/// Allocate the channel for `class` if the flags want it.
fn channel<T>(flags: &FeatureFlags, class: EventClass) -> NotificationChannel<T> {
    NotificationChannel::allocate_if(flags.wants(class), class.capacity())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::channels::{ChannelState, NotifyError};

    fn all_flag_combinations() -> impl Iterator<Item = FeatureFlags> {
        (0u8..32).map(|bits| FeatureFlags {
            collect_block_data: bits & 1 != 0,
            collect_stake_info: bits & 2 != 0,
            monitor_enabled: bits & 4 != 0,
            has_watched_addresses: bits & 8 != 0,
            monitor_mempool: bits & 16 != 0,
        })
    }

    fn expected(flags: &FeatureFlags) -> Vec<EventClass> {
        let mut out = Vec::new();
        if flags.collect_block_data && flags.monitor_enabled {
            out.push(EventClass::BlockConnected);
        }
        if flags.collect_stake_info && flags.monitor_enabled {
            out.push(EventClass::StakeInfoConnected);
        }
        if flags.has_watched_addresses && flags.monitor_enabled {
            out.push(EventClass::AddressReceived);
            out.push(EventClass::AddressSpent);
            out.push(EventClass::RelevantMempoolTx);
        }
        if flags.monitor_mempool {
            out.push(EventClass::NewMempoolTx);
        }
        out
    }

    #[test]
    fn test_initialize_allocates_exactly_flagged_channels() {
        for flags in all_flag_combinations() {
            let hub = NotificationHub::initialize(&flags);
            assert_eq!(hub.allocated(), expected(&flags), "flags: {flags:?}");
        }
    }

    #[test]
    fn test_no_watched_addresses_means_no_address_channels() {
        for flags in all_flag_combinations().filter(|f| !f.has_watched_addresses) {
            let hub = NotificationHub::initialize(&flags);
            assert!(!hub.address_received.is_present());
            assert!(!hub.address_spent.is_present());
            assert!(!hub.relevant_mempool_tx.is_present());
        }
    }

    #[test]
    fn test_capacities_follow_event_class() {
        let flags = FeatureFlags {
            collect_block_data: true,
            collect_stake_info: true,
            monitor_enabled: true,
            has_watched_addresses: true,
            monitor_mempool: true,
        };
        let hub = NotificationHub::initialize(&flags);
        assert_eq!(hub.block_connected.capacity(), Some(8));
        assert_eq!(hub.stake_info_connected.capacity(), Some(8));
        assert_eq!(hub.address_received.capacity(), Some(8));
        assert_eq!(hub.address_spent.capacity(), Some(8));
        assert_eq!(hub.relevant_mempool_tx.capacity(), Some(512));
        assert_eq!(hub.new_mempool_tx.capacity(), Some(2000));
    }

    #[tokio::test]
    async fn test_shutdown_closes_only_present_channels() {
        for flags in all_flag_combinations() {
            let hub = NotificationHub::initialize(&flags);
            let summary = hub.shutdown().await.unwrap();
            assert_eq!(summary.closed, expected(&flags));

            let state = hub.block_connected.state().await;
            if hub.is_present(EventClass::BlockConnected) {
                assert_eq!(state, ChannelState::Closed);
            } else {
                assert_eq!(state, ChannelState::Absent);
            }
        }
    }

    #[tokio::test]
    async fn test_second_shutdown_is_rejected() {
        let hub = NotificationHub::initialize(&FeatureFlags::from_config(&Default::default()));
        assert!(!hub.is_shut_down());
        hub.shutdown().await.unwrap();
        assert!(hub.is_shut_down());
        assert_eq!(hub.shutdown().await, Err(HubError::AlreadyShutDown));
    }

    #[tokio::test]
    async fn test_consumer_drains_then_stops_after_shutdown() {
        let hub = Arc::new(NotificationHub::initialize(&FeatureFlags {
            monitor_mempool: true,
            ..Default::default()
        }));
        let mut rx = hub.new_mempool_tx.take_receiver().await.unwrap();

        let consumer = tokio::spawn(async move {
            let mut seen = Vec::new();
            while let Some(hash) = rx.recv().await {
                seen.push(hash);
            }
            seen
        });

        for n in 0..5u8 {
            hub.new_mempool_tx.send(TxHash::new([n; 32])).await.unwrap();
        }
        hub.shutdown().await.unwrap();
        assert_eq!(
            hub.new_mempool_tx.send(TxHash::default()).await,
            Err(NotifyError::Closed)
        );

        let seen = consumer.await.unwrap();
        let expected: Vec<_> = (0..5u8).map(|n| TxHash::new([n; 32])).collect();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn test_disabled_feature_notify_is_noop() {
        let hub = NotificationHub::initialize(&FeatureFlags::default());
        assert!(hub.allocated().is_empty());
        assert_eq!(hub.block_connected.notify(BlockHash::default()).await, Ok(false));
        assert_eq!(hub.stake_info_connected.notify(7).await, Ok(false));
    }

    #[tokio::test]
    async fn test_each_channel_carries_its_payload_type() {
        let hub = NotificationHub::initialize(&FeatureFlags {
            collect_block_data: true,
            collect_stake_info: true,
            monitor_enabled: true,
            has_watched_addresses: true,
            monitor_mempool: true,
        });
        let tx = Arc::new(Transaction {
            hash: TxHash::new([3; 32]),
            inputs: vec![],
            outputs: vec![],
        });

        assert_eq!(hub.block_connected.notify(BlockHash::new([1; 32])).await, Ok(true));
        assert_eq!(hub.stake_info_connected.notify(42).await, Ok(true));
        assert_eq!(
            hub.address_received.notify(Arc::new(BlockWatchedTx::new(42))).await,
            Ok(true)
        );
        assert_eq!(
            hub.address_spent.notify(Arc::new(BlockWatchedTx::new(42))).await,
            Ok(true)
        );
        assert_eq!(hub.relevant_mempool_tx.notify(tx.clone()).await, Ok(true));
        assert_eq!(hub.new_mempool_tx.notify(tx.hash).await, Ok(true));

        let mut heights = hub.stake_info_connected.take_receiver().await.unwrap();
        assert_eq!(heights.recv().await, Some(42));
        let mut relevant = hub.relevant_mempool_tx.take_receiver().await.unwrap();
        assert_eq!(relevant.recv().await.unwrap().hash, TxHash::new([3; 32]));
    }
}
