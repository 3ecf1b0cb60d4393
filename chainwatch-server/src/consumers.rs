//! Consumer task orchestration.
//!
//! Spawns one consumer task per allocated channel group and stops them in
//! order at shutdown: close the hub, let consumers drain, then force the
//! quit signal on whatever is still running.

use chainwatch_core::events::NotificationHub;
use chainwatch_core::processors::{
    AddressWatcher, BlockDataCollector, ChainSource, MempoolMonitor, StakeInfoCollector,
};
use chainwatch_core::store::{MemoryBlockStore, StatusStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;

/// Running consumer tasks.
pub struct Consumers {
    tasks: JoinSet<()>,
    quit_tx: watch::Sender<bool>,
}

impl Consumers {
    /// Spawn a consumer for every present channel in `hub`.
    pub async fn spawn(
        hub: &NotificationHub,
        source: Arc<dyn ChainSource>,
        store: Arc<MemoryBlockStore>,
        status: StatusStore,
    ) -> Self {
        let (quit_tx, quit_rx) = watch::channel(false);
        let mut tasks = JoinSet::new();

        if let Some(rx) = hub.block_connected.take_receiver().await {
            let collector = BlockDataCollector::new(
                source.clone(),
                store.clone(),
                status,
                env!("CARGO_PKG_VERSION"),
            );
            tasks.spawn(collector.run(quit_rx.clone(), rx));
        }

        if let Some(rx) = hub.stake_info_connected.take_receiver().await {
            let collector = StakeInfoCollector::new(source, store);
            tasks.spawn(collector.run(quit_rx.clone(), rx));
        }

        let received_rx = hub.address_received.take_receiver().await;
        let spent_rx = hub.address_spent.take_receiver().await;
        if received_rx.is_some() || spent_rx.is_some() {
            let shutdown_rx = quit_rx.clone();
            tasks.spawn(async move {
                let watcher = AddressWatcher::new()
                    .run(shutdown_rx, received_rx, spent_rx)
                    .await;
                tracing::info!(txs_seen = watcher.txs_seen(), "Address watcher stopped");
            });
        }

        let new_rx = hub.new_mempool_tx.take_receiver().await;
        let relevant_rx = hub.relevant_mempool_tx.take_receiver().await;
        if new_rx.is_some() || relevant_rx.is_some() {
            tasks.spawn(async move {
                MempoolMonitor::new().run(quit_rx, new_rx, relevant_rx).await;
            });
        }

        Self { tasks, quit_tx }
    }

    pub fn count(&self) -> usize {
        self.tasks.len()
    }

    /// Close the hub and wait up to `grace` for consumers to drain.
    ///
    /// Consumers still running after `grace` get the quit signal.
    pub async fn stop(mut self, hub: &NotificationHub, grace: Duration) {
        match hub.shutdown().await {
            Ok(summary) => tracing::info!(closed = ?summary.closed, "Closed notification channels"),
            Err(e) => tracing::error!(error = %e, "Failed to shut down notification hub"),
        }

        let drained = tokio::time::timeout(grace, join_all(&mut self.tasks)).await;
        if drained.is_err() {
            tracing::warn!(
                remaining = self.tasks.len(),
                "Consumers did not drain in time, sending quit signal"
            );
            let _ = self.quit_tx.send(true);
            join_all(&mut self.tasks).await;
        }
        tracing::info!("Consumers stopped");
    }
}

async fn join_all(tasks: &mut JoinSet<()>) {
    while let Some(result) = tasks.join_next().await {
        if let Err(e) = result {
            tracing::error!(error = %e, "Consumer task failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainwatch_core::config::{FeatureFlags, MonitorConfig};
    use chainwatch_core::processors::{ChainEventProducer, ConnectedBlock, StagedBlocks};
    use chainwatch_core::store::BlockDataReader;

    use crate::api::tests::block_data;

    #[tokio::test]
    async fn test_spawns_one_consumer_per_channel_group() {
        let config = MonitorConfig {
            monitor_mempool: true,
            watch_addresses: vec!["DsA".into()],
            ..Default::default()
        };
        let hub = NotificationHub::initialize(&FeatureFlags::from_config(&config));
        let consumers = Consumers::spawn(
            &hub,
            Arc::new(StagedBlocks::new()),
            Arc::new(MemoryBlockStore::new()),
            StatusStore::new(),
        )
        .await;
        // block data, stake info, address watcher, mempool monitor
        assert_eq!(consumers.count(), 4);
        consumers.stop(&hub, Duration::from_secs(5)).await;
        assert!(hub.is_shut_down());
    }

    #[tokio::test]
    async fn test_end_to_end_block_reaches_store() {
        let config = MonitorConfig::default();
        let hub = Arc::new(NotificationHub::initialize(&FeatureFlags::from_config(&config)));
        let staged = StagedBlocks::new();
        let store = Arc::new(MemoryBlockStore::new());
        let status = StatusStore::new();

        let consumers =
            Consumers::spawn(&hub, Arc::new(staged.clone()), store.clone(), status.clone()).await;
        let producer = ChainEventProducer::new(hub.clone(), staged, config.watch_addresses);

        let data = block_data(42);
        let hash = data.summary.hash.parse().unwrap();
        producer
            .block_connected(ConnectedBlock {
                hash,
                data,
                stake_info: None,
                transactions: vec![],
            })
            .await
            .unwrap();

        consumers.stop(&hub, Duration::from_secs(5)).await;
        assert_eq!(store.summary(42).await.unwrap().height, 42);
        assert_eq!(status.current().unwrap().height, 42);
    }
}
