//! Producers and consumers around the notification hub.
//!
//! - `ChainEventProducer`: Observed chain activity -> hub channels
//! - `BlockDataCollector`: Receives `block_connected`, writes block data
//! - `StakeInfoCollector`: Receives `stake_info_connected`, writes stake info
//! - `AddressWatcher`: Receives `address_received` and `address_spent`
//! - `MempoolMonitor`: Receives `new_mempool_tx` and `relevant_mempool_tx`

pub mod address_watcher;
pub mod block_collector;
pub mod chain_source;
pub mod mempool_monitor;
pub mod producer;
pub mod stake_collector;

pub use address_watcher::{AddressDirection, AddressWatcher, WatchedAddressEvent};
pub use block_collector::{BlockDataCollector, CollectError};
pub use chain_source::{ChainSource, ChainSourceError, StagedBlocks};
pub use mempool_monitor::{MempoolEvent, MempoolMonitor};
pub use producer::{ChainEventProducer, ConnectedBlock, Delivered};
pub use stake_collector::StakeInfoCollector;

use crate::events::NotificationReceiver;

/// Receive from an optional receiver, staying pending forever without one.
pub(crate) async fn recv_or_pending<T>(rx: &mut Option<NotificationReceiver<T>>) -> Option<T> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
