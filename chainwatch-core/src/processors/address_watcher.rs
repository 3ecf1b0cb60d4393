//! AddressWatcher processor.
//!
//! Consumes the `address_received` and `address_spent` channels and logs
//! every watched address touched by a connected block. Either channel may
//! be absent; the watcher stops once every channel it was given is closed.

use kanau::processor::Processor;
use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{info, warn};

use super::recv_or_pending;
use crate::events::{BlockWatchedTx, NotificationReceiver};

/// Direction of a watched-address record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressDirection {
    Received,
    Spent,
}

/// One record taken from either address channel.
#[derive(Debug, Clone)]
pub struct WatchedAddressEvent {
    pub direction: AddressDirection,
    pub record: Arc<BlockWatchedTx>,
}

pub struct AddressWatcher {
    last_received_height: AtomicI64,
    last_spent_height: AtomicI64,
    txs_seen: AtomicU64,
}

impl AddressWatcher {
    pub fn new() -> Self {
        Self {
            last_received_height: AtomicI64::new(-1),
            last_spent_height: AtomicI64::new(-1),
            txs_seen: AtomicU64::new(0),
        }
    }

    /// Last block height seen on the given channel, if any.
    pub fn last_height(&self, direction: AddressDirection) -> Option<i64> {
        let height = match direction {
            AddressDirection::Received => self.last_received_height.load(Ordering::Relaxed),
            AddressDirection::Spent => self.last_spent_height.load(Ordering::Relaxed),
        };
        (height >= 0).then_some(height)
    }

    /// Total watched transactions logged so far.
    pub fn txs_seen(&self) -> u64 {
        self.txs_seen.load(Ordering::Relaxed)
    }

    pub async fn run(
        self,
        mut shutdown_rx: watch::Receiver<bool>,
        mut received_rx: Option<NotificationReceiver<Arc<BlockWatchedTx>>>,
        mut spent_rx: Option<NotificationReceiver<Arc<BlockWatchedTx>>>,
    ) -> Self {
        info!("AddressWatcher started");

        while received_rx.is_some() || spent_rx.is_some() {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("AddressWatcher received shutdown signal");
                        break;
                    }
                }

                record = recv_or_pending(&mut received_rx) => match record {
                    Some(record) => {
                        let _ = self.process(WatchedAddressEvent {
                            direction: AddressDirection::Received,
                            record,
                        }).await;
                    }
                    None => {
                        info!("Address received channel closed");
                        received_rx = None;
                    }
                },

                record = recv_or_pending(&mut spent_rx) => match record {
                    Some(record) => {
                        let _ = self.process(WatchedAddressEvent {
                            direction: AddressDirection::Spent,
                            record,
                        }).await;
                    }
                    None => {
                        info!("Address spent channel closed");
                        spent_rx = None;
                    }
                },
            }
        }

        info!("AddressWatcher shutdown complete");
        self
    }
}

impl Default for AddressWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor<WatchedAddressEvent> for AddressWatcher {
    type Output = ();
    type Error = Infallible;

    async fn process(&self, event: WatchedAddressEvent) -> Result<(), Infallible> {
        let height = event.record.block_height;
        let last = match event.direction {
            AddressDirection::Received => &self.last_received_height,
            AddressDirection::Spent => &self.last_spent_height,
        };
        let previous = last.swap(height, Ordering::Relaxed);
        if height < previous {
            warn!(
                direction = ?event.direction,
                height,
                previous,
                "Watched address record went back in height, possible reorg"
            );
        }

        for (address, txs) in &event.record.txs_for_address {
            for tx in txs {
                info!(
                    direction = ?event.direction,
                    height,
                    %address,
                    tx = %tx.hash,
                    "Watched address transaction"
                );
                self.txs_seen.fetch_add(1, Ordering::Relaxed);
            }
        }
        Ok(())
    }
}
