pub mod block;
pub mod stake;
pub mod status;

pub use block::{BlockHeader, BlockSummary, FeeInfo};
pub use stake::{StakeInfoExtended, TicketPoolInfo};
pub use status::Status;
