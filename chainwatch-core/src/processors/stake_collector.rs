//! StakeInfoCollector processor.
//!
//! Receives block heights from the `stake_info_connected` channel, resolves
//! extended stake info through a [`ChainSource`] and stores it by height.

use kanau::processor::Processor;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info};

use super::block_collector::CollectError;
use super::chain_source::ChainSource;
use crate::events::{BlockHeight, NotificationReceiver};
use crate::store::MemoryBlockStore;

pub struct StakeInfoCollector {
    source: Arc<dyn ChainSource>,
    store: Arc<MemoryBlockStore>,
}

impl StakeInfoCollector {
    pub fn new(source: Arc<dyn ChainSource>, store: Arc<MemoryBlockStore>) -> Self {
        Self { source, store }
    }

    /// Run until the channel is closed and drained, or shutdown is signaled.
    pub async fn run(
        self,
        mut shutdown_rx: watch::Receiver<bool>,
        mut height_rx: NotificationReceiver<BlockHeight>,
    ) {
        info!("StakeInfoCollector started");

        loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("StakeInfoCollector received shutdown signal");
                        break;
                    }
                }

                height = height_rx.recv() => {
                    let Some(height) = height else {
                        info!("Stake info channel closed");
                        break;
                    };
                    if let Err(e) = self.process(height).await {
                        error!(height, error = %e, "Failed to collect stake info");
                    }
                }
            }
        }

        info!("StakeInfoCollector shutdown complete");
    }
}

impl Processor<BlockHeight> for StakeInfoCollector {
    type Output = ();
    type Error = CollectError;

    async fn process(&self, height: BlockHeight) -> Result<(), CollectError> {
        let info = self.source.stake_info(height).await?;
        debug!(
            height,
            stake_diff = %info.stake_diff,
            pool_size = info.pool_info.size,
            "Collected stake info"
        );
        self.store.store_stake_info(height, info).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::StagedBlocks;
    use crate::store::BlockDataReader;
    use crate::store::memory_tests::stake_info;

    #[tokio::test]
    async fn test_stores_stake_info_by_height() {
        let staged = StagedBlocks::new();
        let store = Arc::new(MemoryBlockStore::new());
        let collector = StakeInfoCollector::new(Arc::new(staged.clone()), store.clone());

        staged.stage_stake_info(144, stake_info(144)).await;
        collector.process(144).await.unwrap();
        assert!(matches!(
            collector.process(145).await,
            Err(CollectError::Source(_))
        ));

        let stored = store.stake_info_extended(144).await.unwrap();
        assert_eq!(stored.price_window_num, 1);
        assert_eq!(stored.idx_block_in_window, 0);
    }
}
