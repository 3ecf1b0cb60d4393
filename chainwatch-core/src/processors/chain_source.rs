//! Where collectors resolve the data behind a notification.
//!
//! Block-connected events carry only a hash or height, so the collectors
//! look the rest up through a [`ChainSource`]. A chain daemon RPC client
//! implements this trait in a full deployment; [`StagedBlocks`] serves
//! data handed over in-process by the [`ChainEventProducer`].
//!
//! [`ChainEventProducer`]: super::ChainEventProducer

use async_trait::async_trait;
use chainwatch_sdk::objects::StakeInfoExtended;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::events::{BlockHash, BlockHeight};
use crate::store::BlockData;

/// Errors returned by a [`ChainSource`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainSourceError {
    #[error("block {0} not found")]
    BlockNotFound(BlockHash),

    #[error("stake info for height {0} not found")]
    StakeInfoNotFound(BlockHeight),
}

/// Lookup of block and stake data by hash or height.
#[async_trait]
pub trait ChainSource: Send + Sync {
    async fn block_data(&self, hash: &BlockHash) -> Result<BlockData, ChainSourceError>;

    async fn stake_info(&self, height: BlockHeight) -> Result<StakeInfoExtended, ChainSourceError>;
}

#[derive(Default)]
struct Staged {
    blocks: HashMap<BlockHash, BlockData>,
    stake_info: HashMap<BlockHeight, StakeInfoExtended>,
}

/// Data staged by the producer until a collector picks it up.
///
/// Entries are removed when read, so each staged block is collected once.
#[derive(Clone, Default)]
pub struct StagedBlocks {
    inner: Arc<Mutex<Staged>>,
}

impl StagedBlocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn stage_block(&self, hash: BlockHash, data: BlockData) {
        self.inner.lock().await.blocks.insert(hash, data);
    }

    pub async fn stage_stake_info(&self, height: BlockHeight, info: StakeInfoExtended) {
        self.inner.lock().await.stake_info.insert(height, info);
    }

    /// Number of staged entries not yet collected (blocks, stake info).
    pub async fn pending(&self) -> (usize, usize) {
        let staged = self.inner.lock().await;
        (staged.blocks.len(), staged.stake_info.len())
    }
}

#[async_trait]
impl ChainSource for StagedBlocks {
    async fn block_data(&self, hash: &BlockHash) -> Result<BlockData, ChainSourceError> {
        self.inner
            .lock()
            .await
            .blocks
            .remove(hash)
            .ok_or(ChainSourceError::BlockNotFound(*hash))
    }

    async fn stake_info(&self, height: BlockHeight) -> Result<StakeInfoExtended, ChainSourceError> {
        self.inner
            .lock()
            .await
            .stake_info
            .remove(&height)
            .ok_or(ChainSourceError::StakeInfoNotFound(height))
    }
}
