//! Block-data storage read by the HTTP API.
//!
//! The collector processors write into a [`MemoryBlockStore`]; the API
//! layer only sees the [`BlockDataReader`] contract.

mod memory;
mod status;

pub use memory::MemoryBlockStore;
pub use status::StatusStore;

#[cfg(test)]
pub(crate) use memory::tests as memory_tests;

use async_trait::async_trait;
use chainwatch_sdk::objects::{BlockHeader, BlockSummary, FeeInfo, StakeInfoExtended};

/// Everything collected for a single connected block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockData {
    pub summary: BlockSummary,
    pub header: BlockHeader,
    pub fee_info: FeeInfo,
}

impl BlockData {
    pub fn height(&self) -> u32 {
        self.summary.height
    }
}

/// Read contract of the block-data store.
///
/// All reads hit already-populated memory; `None` means the store has no
/// record for that index.
#[async_trait]
pub trait BlockDataReader: Send + Sync {
    async fn best_block_summary(&self) -> Option<BlockSummary>;

    async fn summary(&self, index: u32) -> Option<BlockSummary>;

    async fn header(&self, index: u32) -> Option<BlockHeader>;

    async fn fee_info(&self, index: u32) -> Option<FeeInfo>;

    async fn stake_info_extended(&self, index: u32) -> Option<StakeInfoExtended>;
}
