//! Application state shared across all request handlers.

use chainwatch_core::store::{BlockDataReader, StatusStore};
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Read side of the block-data store.
    pub store: Arc<dyn BlockDataReader>,
    /// Latest chain status, absent until the first block is collected.
    pub status: StatusStore,
}

impl AppState {
    pub fn new(store: Arc<dyn BlockDataReader>, status: StatusStore) -> Self {
        Self { store, status }
    }
}
