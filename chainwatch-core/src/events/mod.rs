//! Event notification hub.
//!
//! Decouples the chain-monitoring front end from the consumer routines that
//! react to each event class.
//!
//! # Event Flow
//!
//! 1. Block connected -> `block_connected` (hash) -> `BlockDataCollector`
//! 2. Block connected -> `stake_info_connected` (height) -> `StakeInfoCollector`
//! 3. Block connected -> `address_received` / `address_spent` -> `AddressWatcher`
//! 4. Mempool tx -> `new_mempool_tx` (hash) and `relevant_mempool_tx` -> `MempoolMonitor`
//!
//! Delivery is FIFO per channel only; there is no ordering across classes.

pub mod channels;
pub mod hub;
pub mod types;

pub use channels::{
    BLOCK_CONNECTED_BUFFER, ChannelState, NEW_TX_BUFFER, NotificationChannel,
    NotificationReceiver, NotifyError, PresentChannel, RELEVANT_MEMPOOL_TX_BUFFER,
};
pub use hub::{HubError, NotificationHub, ShutdownSummary};
pub use types::{
    BlockHash, BlockHeight, BlockWatchedTx, EventClass, HashParseError, Transaction, TxHash,
    TxInput, TxOutput,
};
