//! Event payload definitions for the notification hub.
//!
//! Events are ephemeral. Hash-only payloads (block connected, new mempool
//! transaction) require consumers to resolve full data themselves; the
//! watched-address payloads carry the matching transactions directly since
//! they are already filtered by the producer.

use compact_str::CompactString;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use super::channels::{BLOCK_CONNECTED_BUFFER, NEW_TX_BUFFER, RELEVANT_MEMPOOL_TX_BUFFER};

/// Height of a block in the main chain.
pub type BlockHeight = u32;

/// Error returned when parsing a hex-encoded 32-byte hash.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HashParseError {
    #[error("invalid hash hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

macro_rules! hash_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub [u8; 32]);

        impl $name {
            pub const fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = HashParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_hash(s).map(Self)
            }
        }
    };
}

hash_newtype!(
    /// Hash identifying a block.
    BlockHash
);

hash_newtype!(
    /// Hash identifying a transaction.
    TxHash
);

fn parse_hash(s: &str) -> Result<[u8; 32], HashParseError> {
    let mut out = [0u8; 32];
    hex::decode_to_slice(s, &mut out)?;
    Ok(out)
}

/// A transaction input. Only the address of the spent output matters to
/// the hub; coinbase and stakebase inputs have none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxInput {
    pub previous_address: Option<CompactString>,
}

/// A transaction output paying `value` to `address` (if standard).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    pub address: Option<CompactString>,
    pub value: Decimal,
}

/// A transaction as seen by producers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub hash: TxHash,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
}

impl Transaction {
    /// Addresses receiving funds from this transaction.
    pub fn receiving_addresses(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().filter_map(|o| o.address.as_deref())
    }

    /// Addresses whose outputs are spent by this transaction.
    pub fn spending_addresses(&self) -> impl Iterator<Item = &str> {
        self.inputs
            .iter()
            .filter_map(|i| i.previous_address.as_deref())
    }
}

/// Transactions in one block that touch watched addresses.
///
/// Keys are the watched addresses with at least one relevant transaction
/// in the block. An address absent from the map had none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockWatchedTx {
    pub block_height: i64,
    pub txs_for_address: HashMap<CompactString, Vec<Arc<Transaction>>>,
}

impl BlockWatchedTx {
    pub fn new(block_height: i64) -> Self {
        Self {
            block_height,
            txs_for_address: HashMap::new(),
        }
    }

    /// Record `tx` under `address`, keeping insertion order per address.
    ///
    /// A transaction that touches the same address more than once is
    /// recorded a single time.
    pub fn push(&mut self, address: &str, tx: Arc<Transaction>) {
        let txs = self
            .txs_for_address
            .entry(CompactString::from(address))
            .or_default();
        if !txs.iter().any(|t| t.hash == tx.hash) {
            txs.push(tx);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.txs_for_address.is_empty()
    }

    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.txs_for_address.keys().map(CompactString::as_str)
    }

    pub fn txs_for(&self, address: &str) -> &[Arc<Transaction>] {
        self.txs_for_address
            .get(address)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// The classes of events routed through the hub. Each maps to one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventClass {
    /// Block connected, consumed by the block-data collector.
    BlockConnected,
    /// Block connected, consumed by the stake-info collector.
    StakeInfoConnected,
    AddressReceived,
    AddressSpent,
    RelevantMempoolTx,
    /// Every transaction entering the mempool.
    NewMempoolTx,
}

impl EventClass {
    /// All classes, in hub declaration order.
    pub const ALL: [EventClass; 6] = [
        EventClass::BlockConnected,
        EventClass::StakeInfoConnected,
        EventClass::AddressReceived,
        EventClass::AddressSpent,
        EventClass::RelevantMempoolTx,
        EventClass::NewMempoolTx,
    ];

    /// Buffer capacity allocated for this class.
    pub const fn capacity(self) -> usize {
        match self {
            EventClass::BlockConnected
            | EventClass::StakeInfoConnected
            | EventClass::AddressReceived
            | EventClass::AddressSpent => BLOCK_CONNECTED_BUFFER,
            EventClass::RelevantMempoolTx => RELEVANT_MEMPOOL_TX_BUFFER,
            EventClass::NewMempoolTx => NEW_TX_BUFFER,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            EventClass::BlockConnected => "block_connected",
            EventClass::StakeInfoConnected => "stake_info_connected",
            EventClass::AddressReceived => "address_received",
            EventClass::AddressSpent => "address_spent",
            EventClass::RelevantMempoolTx => "relevant_mempool_tx",
            EventClass::NewMempoolTx => "new_mempool_tx",
        }
    }
}

impl fmt::Display for EventClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(n: u8) -> Arc<Transaction> {
        Arc::new(Transaction {
            hash: TxHash::new([n; 32]),
            inputs: vec![],
            outputs: vec![],
        })
    }

    #[test]
    fn test_hash_hex_round_trip() {
        let text = "00ff".repeat(16);
        let hash: BlockHash = text.parse().unwrap();
        assert_eq!(hash.as_bytes()[1], 0xff);
        assert_eq!(hash.to_string(), text);
    }

    #[test]
    fn test_hash_parse_rejects_bad_input() {
        assert_eq!(
            "abcd".parse::<TxHash>(),
            Err(HashParseError::Hex(hex::FromHexError::InvalidStringLength))
        );
        assert_eq!(
            "abc".parse::<TxHash>(),
            Err(HashParseError::Hex(hex::FromHexError::OddLength))
        );
        let bad = format!("zz{}", "0".repeat(62));
        assert_eq!(
            bad.parse::<TxHash>(),
            Err(HashParseError::Hex(hex::FromHexError::InvalidHexCharacter {
                c: 'z',
                index: 0
            }))
        );
    }

    #[test]
    fn test_block_watched_tx_groups_by_address() {
        let mut record = BlockWatchedTx::new(10);
        assert!(record.is_empty());

        record.push("DsA", tx(1));
        record.push("DsA", tx(2));
        record.push("DsA", tx(1));
        record.push("DsB", tx(3));

        assert_eq!(record.txs_for("DsA").len(), 2);
        assert_eq!(record.txs_for("DsA")[0].hash, TxHash::new([1; 32]));
        assert_eq!(record.txs_for("DsB").len(), 1);
        assert!(record.txs_for("DsC").is_empty());

        let mut addresses: Vec<_> = record.addresses().collect();
        addresses.sort();
        assert_eq!(addresses, vec!["DsA", "DsB"]);
    }

    #[test]
    fn test_mempool_channel_is_largest() {
        assert!(EventClass::NewMempoolTx.capacity() > EventClass::RelevantMempoolTx.capacity());
        assert!(EventClass::RelevantMempoolTx.capacity() > EventClass::BlockConnected.capacity());
    }
}
