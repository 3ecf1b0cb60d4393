//! Block-level objects.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::stake::TicketPoolInfo;

/// Basic block data, served by `GET /block/{idx}` and `GET /block/best`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSummary {
    pub height: u32,
    /// Serialized block size in bytes.
    pub size: u32,
    /// Block hash, hex encoded.
    pub hash: String,
    pub difficulty: f64,
    /// Ticket price at this block.
    pub stake_diff: Decimal,
    /// Block timestamp (unix seconds).
    pub time: i64,
    pub ticket_pool: TicketPoolInfo,
}

/// Verbose block header, served by `GET /block/{idx}/header`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub hash: String,
    pub confirmations: i64,
    pub version: i32,
    pub previous_block_hash: String,
    pub merkle_root: String,
    pub stake_root: String,
    pub vote_bits: u16,
    pub voters: u16,
    pub fresh_stake: u8,
    pub revocations: u8,
    pub pool_size: u32,
    /// Compact difficulty target.
    pub bits: String,
    /// Ticket price, in coins.
    pub sbits: Decimal,
    pub height: u32,
    pub size: u32,
    pub time: i64,
    pub nonce: u32,
    pub stake_version: u32,
    pub difficulty: f64,
    /// Empty until a successor block is connected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_block_hash: Option<String>,
}

/// Ticket fee statistics for a block, served by `GET /block/{idx}/fee`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeInfo {
    pub height: u32,
    /// Number of tickets included in the block.
    pub number: u32,
    pub min: Decimal,
    pub max: Decimal,
    pub mean: Decimal,
    pub median: Decimal,
}
