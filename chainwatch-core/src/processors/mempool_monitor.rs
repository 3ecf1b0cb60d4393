//! MempoolMonitor processor.
//!
//! Counts every transaction hash on the `new_mempool_tx` firehose and logs
//! transactions on `relevant_mempool_tx` that touch watched addresses.

use kanau::processor::Processor;
use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, info};

use super::recv_or_pending;
use crate::events::{NotificationReceiver, Transaction, TxHash};

/// An event taken from either mempool channel.
#[derive(Debug, Clone)]
pub enum MempoolEvent {
    New(TxHash),
    Relevant(Arc<Transaction>),
}

#[derive(Default)]
pub struct MempoolMonitor {
    new_txs: AtomicU64,
    relevant_txs: AtomicU64,
}

impl MempoolMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transactions seen on the firehose.
    pub fn new_txs(&self) -> u64 {
        self.new_txs.load(Ordering::Relaxed)
    }

    /// Transactions touching watched addresses.
    pub fn relevant_txs(&self) -> u64 {
        self.relevant_txs.load(Ordering::Relaxed)
    }

    pub async fn run(
        self,
        mut shutdown_rx: watch::Receiver<bool>,
        mut new_rx: Option<NotificationReceiver<TxHash>>,
        mut relevant_rx: Option<NotificationReceiver<Arc<Transaction>>>,
    ) -> Self {
        info!("MempoolMonitor started");

        while new_rx.is_some() || relevant_rx.is_some() {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("MempoolMonitor received shutdown signal");
                        break;
                    }
                }

                // Relevant txs first so the firehose can't starve them.
                tx = recv_or_pending(&mut relevant_rx) => match tx {
                    Some(tx) => {
                        let _ = self.process(MempoolEvent::Relevant(tx)).await;
                    }
                    None => {
                        info!("Relevant mempool channel closed");
                        relevant_rx = None;
                    }
                },

                hash = recv_or_pending(&mut new_rx) => match hash {
                    Some(hash) => {
                        let _ = self.process(MempoolEvent::New(hash)).await;
                    }
                    None => {
                        info!("New mempool channel closed");
                        new_rx = None;
                    }
                },
            }
        }

        info!(
            new_txs = self.new_txs(),
            relevant_txs = self.relevant_txs(),
            "MempoolMonitor shutdown complete"
        );
        self
    }
}

impl Processor<MempoolEvent> for MempoolMonitor {
    type Output = ();
    type Error = Infallible;

    async fn process(&self, event: MempoolEvent) -> Result<(), Infallible> {
        match event {
            MempoolEvent::New(hash) => {
                self.new_txs.fetch_add(1, Ordering::Relaxed);
                debug!(%hash, "New mempool transaction");
            }
            MempoolEvent::Relevant(tx) => {
                self.relevant_txs.fetch_add(1, Ordering::Relaxed);
                info!(
                    hash = %tx.hash,
                    inputs = tx.inputs.len(),
                    outputs = tx.outputs.len(),
                    "Mempool transaction touches watched address"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counts_until_channels_closed() {
        let (new_tx, new_rx) = tokio::sync::mpsc::channel(16);
        let (relevant_tx, relevant_rx) = tokio::sync::mpsc::channel(16);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        for n in 0..5u8 {
            new_tx.send(TxHash::new([n; 32])).await.unwrap();
        }
        relevant_tx
            .send(Arc::new(Transaction {
                hash: TxHash::new([1; 32]),
                inputs: vec![],
                outputs: vec![],
            }))
            .await
            .unwrap();
        drop(new_tx);
        drop(relevant_tx);

        let monitor = MempoolMonitor::new()
            .run(shutdown_rx, Some(new_rx), Some(relevant_rx))
            .await;
        assert_eq!(monitor.new_txs(), 5);
        assert_eq!(monitor.relevant_txs(), 1);
    }

    #[tokio::test]
    async fn test_firehose_only() {
        let (new_tx, new_rx) = tokio::sync::mpsc::channel(4);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        new_tx.send(TxHash::default()).await.unwrap();
        drop(new_tx);

        let monitor = MempoolMonitor::new().run(shutdown_rx, Some(new_rx), None).await;
        assert_eq!(monitor.new_txs(), 1);
        assert_eq!(monitor.relevant_txs(), 0);
    }
}
