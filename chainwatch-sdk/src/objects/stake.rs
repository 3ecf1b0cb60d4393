//! Stake and ticket pool objects.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::block::FeeInfo;

/// Ticket pool summary at a given block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketPoolInfo {
    /// Number of live tickets.
    pub size: u32,
    /// Total value locked in the pool.
    pub value: Decimal,
    /// Average ticket value.
    pub val_avg: Decimal,
}

/// Extended stake information for a block, served by `GET /block/{idx}/stake`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeInfoExtended {
    /// Ticket fee statistics for the block.
    pub fee_info: FeeInfo,
    /// Ticket price in effect for the block.
    pub stake_diff: Decimal,
    /// Index of the ticket price window containing the block.
    pub price_window_num: u32,
    /// Position of the block within its price window.
    pub idx_block_in_window: u32,
    pub pool_info: TicketPoolInfo,
}
