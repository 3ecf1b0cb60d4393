//! ChainEventProducer.
//!
//! Turns chain activity observed by the front end into hub events:
//! - A connected block notifies the block-data and stake-info collectors
//!   and, when addresses are watched, the received/spent address channels
//! - A new mempool transaction notifies the mempool firehose and, when it
//!   touches a watched address, the relevant-mempool channel
//!
//! Every send goes through `notify`, so a disabled feature costs nothing.

use chainwatch_sdk::objects::StakeInfoExtended;
use compact_str::CompactString;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace};

use super::chain_source::StagedBlocks;
use crate::events::{BlockHash, BlockWatchedTx, NotificationHub, NotifyError, Transaction};
use crate::store::BlockData;

/// A block that was just connected to the main chain.
#[derive(Debug, Clone)]
pub struct ConnectedBlock {
    pub hash: BlockHash,
    pub data: BlockData,
    /// Stake info, when the front end has it at connect time.
    pub stake_info: Option<StakeInfoExtended>,
    pub transactions: Vec<Arc<Transaction>>,
}

/// Which notifications a producer call delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivered {
    pub block: bool,
    pub stake_info: bool,
    pub address_received: bool,
    pub address_spent: bool,
    pub new_mempool_tx: bool,
    pub relevant_mempool_tx: bool,
}

/// Producer side of the notification hub.
pub struct ChainEventProducer {
    hub: Arc<NotificationHub>,
    staged: StagedBlocks,
    watched: HashSet<CompactString>,
}

impl ChainEventProducer {
    /// Create a producer for `hub`.
    ///
    /// `staged` is shared with the collectors so they can resolve the
    /// hashes and heights this producer sends.
    pub fn new(
        hub: Arc<NotificationHub>,
        staged: StagedBlocks,
        watch_addresses: impl IntoIterator<Item = CompactString>,
    ) -> Self {
        Self {
            hub,
            staged,
            watched: watch_addresses.into_iter().collect(),
        }
    }

    fn is_watched(&self, address: &str) -> bool {
        self.watched.contains(address)
    }

    /// Split a block's transactions into received and spent records for the
    /// watched addresses.
    pub fn watched_records(
        &self,
        height: i64,
        transactions: &[Arc<Transaction>],
    ) -> (BlockWatchedTx, BlockWatchedTx) {
        let mut received = BlockWatchedTx::new(height);
        let mut spent = BlockWatchedTx::new(height);

        for tx in transactions {
            for address in tx.receiving_addresses().filter(|a| self.is_watched(a)) {
                received.push(address, tx.clone());
            }
            for address in tx.spending_addresses().filter(|a| self.is_watched(a)) {
                spent.push(address, tx.clone());
            }
        }
        (received, spent)
    }

    /// Fan out a connected block.
    ///
    /// Waits for buffer space on each channel in turn. Address records are
    /// sent for every block, empty or not, so watchers see each height.
    pub async fn block_connected(&self, block: ConnectedBlock) -> Result<Delivered, NotifyError> {
        let hub = &self.hub;
        let height = block.data.height();
        let mut delivered = Delivered::default();

        if hub.block_connected.is_present() {
            self.staged.stage_block(block.hash, block.data).await;
            delivered.block = hub.block_connected.notify(block.hash).await?;
        }

        if hub.stake_info_connected.is_present() {
            if let Some(info) = block.stake_info {
                self.staged.stage_stake_info(height, info).await;
            }
            delivered.stake_info = hub.stake_info_connected.notify(height).await?;
        }

        if hub.address_received.is_present() || hub.address_spent.is_present() {
            let (received, spent) = self.watched_records(i64::from(height), &block.transactions);
            trace!(
                height,
                received = received.txs_for_address.len(),
                spent = spent.txs_for_address.len(),
                "Built watched address records"
            );
            delivered.address_received = hub.address_received.notify(Arc::new(received)).await?;
            delivered.address_spent = hub.address_spent.notify(Arc::new(spent)).await?;
        }

        debug!(hash = %block.hash, height, ?delivered, "Block connected notifications sent");
        Ok(delivered)
    }

    /// Fan out a transaction that entered the mempool.
    pub async fn mempool_tx(&self, tx: Transaction) -> Result<Delivered, NotifyError> {
        let hub = &self.hub;
        let mut delivered = Delivered {
            new_mempool_tx: hub.new_mempool_tx.notify(tx.hash).await?,
            ..Default::default()
        };

        if hub.relevant_mempool_tx.is_present() {
            let relevant = tx
                .receiving_addresses()
                .chain(tx.spending_addresses())
                .any(|a| self.is_watched(a));
            if relevant {
                delivered.relevant_mempool_tx =
                    hub.relevant_mempool_tx.notify(Arc::new(tx)).await?;
            }
        }
        Ok(delivered)
    }
}
