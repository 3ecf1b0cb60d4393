//! BlockDataCollector processor.
//!
//! The BlockDataCollector is responsible for:
//! - Receiving block hashes from the `block_connected` channel
//! - Resolving the block data through a [`ChainSource`]
//! - Writing it to the [`MemoryBlockStore`]
//! - Publishing the new height to the [`StatusStore`]

use kanau::processor::Processor;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info};

use super::chain_source::{ChainSource, ChainSourceError};
use crate::events::{BlockHash, BlockHeight, NotificationReceiver};
use crate::store::{MemoryBlockStore, StatusStore};

/// Errors that can occur while collecting data for a notification.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("chain source error: {0}")]
    Source(#[from] ChainSourceError),

    /// The source returned data for a different block than requested.
    #[error("requested block {requested} but source returned {returned}")]
    HashMismatch { requested: BlockHash, returned: String },
}

/// Collects block data for every connected block.
pub struct BlockDataCollector {
    source: Arc<dyn ChainSource>,
    store: Arc<MemoryBlockStore>,
    status: StatusStore,
    version: String,
}

impl BlockDataCollector {
    /// Create a new BlockDataCollector.
    ///
    /// # Arguments
    ///
    /// * `source` - Where block data is resolved by hash
    /// * `store` - Store written for the API
    /// * `status` - Status updated with each collected height
    /// * `version` - Daemon version reported in a freshly created status
    pub fn new(
        source: Arc<dyn ChainSource>,
        store: Arc<MemoryBlockStore>,
        status: StatusStore,
        version: impl Into<String>,
    ) -> Self {
        Self {
            source,
            store,
            status,
            version: version.into(),
        }
    }

    /// Run until the channel is closed and drained, or shutdown is signaled.
    pub async fn run(
        self,
        mut shutdown_rx: watch::Receiver<bool>,
        mut block_rx: NotificationReceiver<BlockHash>,
    ) {
        info!("BlockDataCollector started");

        loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("BlockDataCollector received shutdown signal");
                        break;
                    }
                }

                hash = block_rx.recv() => {
                    let Some(hash) = hash else {
                        info!("Block connected channel closed");
                        break;
                    };
                    if let Err(e) = self.process(hash).await {
                        error!(%hash, error = %e, "Failed to collect block data");
                    }
                }
            }
        }

        info!("BlockDataCollector shutdown complete");
    }
}

impl Processor<BlockHash> for BlockDataCollector {
    type Output = BlockHeight;
    type Error = CollectError;

    async fn process(&self, hash: BlockHash) -> Result<BlockHeight, CollectError> {
        let data = self.source.block_data(&hash).await?;
        if data.summary.hash != hash.to_string() {
            return Err(CollectError::HashMismatch {
                requested: hash,
                returned: data.summary.hash,
            });
        }

        let height = data.height();
        self.store.store_block(data).await;
        self.status.set_height(height, &self.version);
        debug!(%hash, height, "Collected block data");
        Ok(height)
    }
}
