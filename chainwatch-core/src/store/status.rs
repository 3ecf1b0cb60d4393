//! Chain status published to the API.

use chainwatch_sdk::objects::Status;
use tokio::sync::watch;

/// Latest [`Status`] snapshot.
///
/// Holds `None` until the first status is published. Cloning shares the
/// same underlying value.
#[derive(Clone)]
pub struct StatusStore {
    tx: watch::Sender<Option<Status>>,
}

impl StatusStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    pub fn publish(&self, status: Status) {
        self.tx.send_replace(Some(status));
    }

    /// Update the height of the current status, creating a ready status for
    /// `version` if none was published yet.
    pub fn set_height(&self, height: u32, version: &str) {
        self.tx.send_modify(|current| match current {
            Some(status) => {
                status.height = height;
                status.ready = true;
            }
            None => *current = Some(Status::ready_at(height, version)),
        });
    }

    pub fn current(&self) -> Option<Status> {
        (*self.tx.borrow()).clone()
    }
}

impl Default for StatusStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_absent_until_published() {
        let store = StatusStore::new();
        assert!(store.current().is_none());

        store.set_height(10, "0.1.0");
        let status = store.current().unwrap();
        assert_eq!(status.height, 10);
        assert!(status.ready);

        store.set_height(11, "ignored");
        let status = store.current().unwrap();
        assert_eq!(status.height, 11);
        assert_eq!(status.version, "0.1.0");
    }
}
