//! In-memory block-data store keyed by height.

use async_trait::async_trait;
use chainwatch_sdk::objects::{BlockHeader, BlockSummary, FeeInfo, StakeInfoExtended};
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::{BlockData, BlockDataReader};

#[derive(Default)]
struct Inner {
    blocks: BTreeMap<u32, BlockData>,
    stake_info: BTreeMap<u32, StakeInfoExtended>,
    best_height: Option<u32>,
}

/// Block data and stake info cached by height.
///
/// The best block is the highest height stored so far.
#[derive(Default)]
pub struct MemoryBlockStore {
    inner: RwLock<Inner>,
}

impl MemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store data for a block, replacing any previous record at its height.
    pub async fn store_block(&self, data: BlockData) {
        let height = data.height();
        let mut inner = self.inner.write().await;
        inner.blocks.insert(height, data);
        if inner.best_height.is_none_or(|best| height > best) {
            inner.best_height = Some(height);
        }
        debug!(height, "Stored block data");
    }

    pub async fn store_stake_info(&self, height: u32, info: StakeInfoExtended) {
        self.inner.write().await.stake_info.insert(height, info);
        debug!(height, "Stored stake info");
    }

    pub async fn best_height(&self) -> Option<u32> {
        self.inner.read().await.best_height
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.blocks.len()
    }
}

#[async_trait]
impl BlockDataReader for MemoryBlockStore {
    async fn best_block_summary(&self) -> Option<BlockSummary> {
        let inner = self.inner.read().await;
        let best = inner.best_height?;
        inner.blocks.get(&best).map(|b| b.summary.clone())
    }

    async fn summary(&self, index: u32) -> Option<BlockSummary> {
        let inner = self.inner.read().await;
        inner.blocks.get(&index).map(|b| b.summary.clone())
    }

    async fn header(&self, index: u32) -> Option<BlockHeader> {
        let inner = self.inner.read().await;
        inner.blocks.get(&index).map(|b| b.header.clone())
    }

    async fn fee_info(&self, index: u32) -> Option<FeeInfo> {
        let inner = self.inner.read().await;
        inner.blocks.get(&index).map(|b| b.fee_info.clone())
    }

    async fn stake_info_extended(&self, index: u32) -> Option<StakeInfoExtended> {
        self.inner.read().await.stake_info.get(&index).cloned()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chainwatch_sdk::objects::TicketPoolInfo;
    use rust_decimal::Decimal;

    pub(crate) fn block_data(height: u32) -> BlockData {
        let hash = format!("{height:064x}");
        BlockData {
            summary: BlockSummary {
                height,
                size: 1000 + height,
                hash: hash.clone(),
                difficulty: 1.5,
                stake_diff: Decimal::new(10, 0),
                time: 1_500_000_000 + i64::from(height) * 300,
                ticket_pool: TicketPoolInfo::default(),
            },
            header: BlockHeader {
                hash,
                confirmations: 1,
                version: 6,
                previous_block_hash: format!("{:064x}", height.saturating_sub(1)),
                merkle_root: "0".repeat(64),
                stake_root: "0".repeat(64),
                vote_bits: 1,
                voters: 5,
                fresh_stake: 0,
                revocations: 0,
                pool_size: 0,
                bits: "1d00ffff".to_string(),
                sbits: Decimal::new(10, 0),
                height,
                size: 1000 + height,
                time: 1_500_000_000 + i64::from(height) * 300,
                nonce: height,
                stake_version: 5,
                difficulty: 1.5,
                next_block_hash: None,
            },
            fee_info: FeeInfo {
                height,
                ..Default::default()
            },
        }
    }

    pub(crate) fn stake_info(height: u32) -> StakeInfoExtended {
        StakeInfoExtended {
            fee_info: FeeInfo {
                height,
                number: 3,
                min: Decimal::new(1, 4),
                max: Decimal::new(3, 4),
                mean: Decimal::new(2, 4),
                median: Decimal::new(2, 4),
            },
            stake_diff: Decimal::new(10, 0),
            price_window_num: height / 144,
            idx_block_in_window: height % 144,
            pool_info: TicketPoolInfo::default(),
        }
    }

    #[tokio::test]
    async fn test_best_block_tracks_highest_height() {
        let store = MemoryBlockStore::new();
        assert!(store.best_block_summary().await.is_none());

        store.store_block(block_data(5)).await;
        store.store_block(block_data(3)).await;
        assert_eq!(store.best_height().await, Some(5));
        assert_eq!(store.best_block_summary().await.unwrap().height, 5);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_reads_by_index() {
        let store = MemoryBlockStore::new();
        store.store_block(block_data(2)).await;

        assert_eq!(store.summary(2).await.unwrap().size, 1002);
        assert_eq!(store.header(2).await.unwrap().nonce, 2);
        assert_eq!(store.fee_info(2).await.unwrap().height, 2);
        assert!(store.summary(3).await.is_none());
        assert!(store.stake_info_extended(2).await.is_none());

        store.store_stake_info(2, stake_info(2)).await;
        assert_eq!(store.stake_info_extended(2).await.unwrap().fee_info.number, 3);
    }
}
