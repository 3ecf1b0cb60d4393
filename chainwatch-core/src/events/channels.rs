//! Notification channels with explicit presence.
//!
//! A [`NotificationChannel`] is either absent (the feature that would
//! consume it is disabled) or present with a fixed-capacity buffer chosen
//! at allocation time. Present channels are open until the hub shuts them
//! down, after which consumers drain what is buffered and then see the end
//! of the stream.

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, RwLock, mpsc};

/// Buffer size for channels fed once per connected block.
pub const BLOCK_CONNECTED_BUFFER: usize = 8;

/// Buffer size for the channel carrying ANY transaction added to mempool.
pub const NEW_TX_BUFFER: usize = 2000;

/// Buffer size for the channel carrying mempool transactions that touch
/// watched addresses.
pub const RELEVANT_MEMPOOL_TX_BUFFER: usize = 512;

/// Receiver handed to the single consumer of a channel.
pub type NotificationReceiver<T> = mpsc::Receiver<T>;

/// Errors returned when sending on a [`NotificationChannel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    /// The channel was never allocated for this configuration.
    #[error("channel is not allocated")]
    Absent,
    /// The hub has shut the channel down, or its consumer is gone.
    #[error("channel is closed")]
    Closed,
    /// Non-blocking send on a full buffer.
    #[error("channel buffer is full")]
    Full,
}

/// Observable state of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Absent,
    Open,
    Closed,
}

/// A hub entry: absent, or a present buffered channel.
pub enum NotificationChannel<T> {
    Absent,
    Present(PresentChannel<T>),
}

/// An allocated channel.
///
/// The hub keeps the only long-lived sender. Producers clone it for the
/// duration of a single send, so dropping it in [`close`](Self::close)
/// ends the stream for the consumer once in-flight sends complete.
pub struct PresentChannel<T> {
    capacity: usize,
    tx: RwLock<Option<mpsc::Sender<T>>>,
    rx: Mutex<Option<mpsc::Receiver<T>>>,
}

impl<T> NotificationChannel<T> {
    /// Allocate a present channel with a fixed buffer capacity.
    pub fn allocate(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        NotificationChannel::Present(PresentChannel {
            capacity,
            tx: RwLock::new(Some(tx)),
            rx: Mutex::new(Some(rx)),
        })
    }

    /// Allocate with `capacity` when `wanted`, otherwise leave absent.
    pub fn allocate_if(wanted: bool, capacity: usize) -> Self {
        if wanted {
            Self::allocate(capacity)
        } else {
            NotificationChannel::Absent
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, NotificationChannel::Present(_))
    }

    pub fn as_present(&self) -> Option<&PresentChannel<T>> {
        match self {
            NotificationChannel::Absent => None,
            NotificationChannel::Present(channel) => Some(channel),
        }
    }

    /// Buffer capacity, or `None` when absent.
    pub fn capacity(&self) -> Option<usize> {
        self.as_present().map(|c| c.capacity)
    }

    pub async fn state(&self) -> ChannelState {
        match self {
            NotificationChannel::Absent => ChannelState::Absent,
            NotificationChannel::Present(channel) if channel.is_closed().await => {
                ChannelState::Closed
            }
            NotificationChannel::Present(_) => ChannelState::Open,
        }
    }

    /// Send, waiting for buffer space if the channel is full.
    pub async fn send(&self, value: T) -> Result<(), NotifyError> {
        match self {
            NotificationChannel::Absent => Err(NotifyError::Absent),
            NotificationChannel::Present(channel) => channel.send(value).await,
        }
    }

    /// Send without waiting. Fails with [`NotifyError::Full`] when the
    /// buffer has no room.
    pub async fn try_send(&self, value: T) -> Result<(), NotifyError> {
        match self {
            NotificationChannel::Absent => Err(NotifyError::Absent),
            NotificationChannel::Present(channel) => channel.try_send(value).await,
        }
    }

    /// Send when present, do nothing when absent.
    ///
    /// Returns `Ok(true)` if the value was delivered to the buffer and
    /// `Ok(false)` if the channel is absent.
    pub async fn notify(&self, value: T) -> Result<bool, NotifyError> {
        match self {
            NotificationChannel::Absent => Ok(false),
            NotificationChannel::Present(channel) => channel.send(value).await.map(|()| true),
        }
    }

    /// Take the receiver for the channel's single consumer.
    ///
    /// Returns `None` when absent or when the receiver was already taken.
    pub async fn take_receiver(&self) -> Option<NotificationReceiver<T>> {
        match self {
            NotificationChannel::Absent => None,
            NotificationChannel::Present(channel) => channel.take_receiver().await,
        }
    }

    /// Close the channel. Returns `true` if an open channel was closed.
    pub(crate) async fn close(&self) -> bool {
        match self {
            NotificationChannel::Absent => false,
            NotificationChannel::Present(channel) => channel.close().await,
        }
    }
}

impl<T> PresentChannel<T> {
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn is_closed(&self) -> bool {
        self.tx.read().await.is_none()
    }

    async fn sender(&self) -> Result<mpsc::Sender<T>, NotifyError> {
        let guard = self.tx.read().await;
        guard.as_ref().cloned().ok_or(NotifyError::Closed)
    }

    pub async fn send(&self, value: T) -> Result<(), NotifyError> {
        let tx = self.sender().await?;
        tx.send(value).await.map_err(|_| NotifyError::Closed)
    }

    pub async fn try_send(&self, value: T) -> Result<(), NotifyError> {
        let tx = self.sender().await?;
        tx.try_send(value).map_err(|e| match e {
            TrySendError::Full(_) => NotifyError::Full,
            TrySendError::Closed(_) => NotifyError::Closed,
        })
    }

    pub async fn take_receiver(&self) -> Option<NotificationReceiver<T>> {
        self.rx.lock().await.take()
    }

    async fn close(&self) -> bool {
        self.tx.write().await.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_absent_channel_rejects_sends() {
        let channel: NotificationChannel<u32> = NotificationChannel::Absent;
        assert!(!channel.is_present());
        assert_eq!(channel.capacity(), None);
        assert_eq!(channel.state().await, ChannelState::Absent);
        assert_eq!(channel.send(1).await, Err(NotifyError::Absent));
        assert_eq!(channel.try_send(1).await, Err(NotifyError::Absent));
        assert_eq!(channel.notify(1).await, Ok(false));
        assert!(channel.take_receiver().await.is_none());
        assert!(!channel.close().await);
    }

    #[tokio::test]
    async fn test_fifo_delivery() {
        let channel = NotificationChannel::allocate(16);
        let mut rx = channel.take_receiver().await.unwrap();

        for i in 0..10u32 {
            channel.send(i).await.unwrap();
        }
        for i in 0..10u32 {
            assert_eq!(rx.recv().await, Some(i));
        }
    }

    #[tokio::test]
    async fn test_receiver_taken_once() {
        let channel: NotificationChannel<u32> = NotificationChannel::allocate(1);
        assert!(channel.take_receiver().await.is_some());
        assert!(channel.take_receiver().await.is_none());
    }

    #[tokio::test]
    async fn test_try_send_reports_full_buffer() {
        let channel = NotificationChannel::allocate(2);
        let _rx = channel.take_receiver().await.unwrap();

        channel.try_send(1u32).await.unwrap();
        channel.try_send(2u32).await.unwrap();
        assert_eq!(channel.try_send(3u32).await, Err(NotifyError::Full));
    }

    #[tokio::test]
    async fn test_close_drains_then_ends_stream() {
        let channel = NotificationChannel::allocate(4);
        let mut rx = channel.take_receiver().await.unwrap();

        channel.send("a").await.unwrap();
        channel.send("b").await.unwrap();
        assert!(channel.close().await);
        assert_eq!(channel.state().await, ChannelState::Closed);

        assert_eq!(channel.send("c").await, Err(NotifyError::Closed));
        assert_eq!(rx.recv().await, Some("a"));
        assert_eq!(rx.recv().await, Some("b"));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_blocked_send_resumes_when_consumer_reads() {
        let channel = std::sync::Arc::new(NotificationChannel::allocate(1));
        let mut rx = channel.take_receiver().await.unwrap();
        channel.send(1u32).await.unwrap();

        let producer = {
            let channel = channel.clone();
            tokio::spawn(async move { channel.send(2u32).await })
        };

        assert_eq!(rx.recv().await, Some(1));
        assert_eq!(producer.await.unwrap(), Ok(()));
        assert_eq!(rx.recv().await, Some(2));
    }

    #[tokio::test]
    async fn test_receiver_as_stream_ends_after_close() {
        use tokio_stream::{StreamExt, wrappers::ReceiverStream};

        let channel = NotificationChannel::allocate(8);
        let rx = channel.take_receiver().await.unwrap();
        for i in 0..5u32 {
            channel.send(i).await.unwrap();
        }
        channel.close().await;

        let drained: Vec<u32> = ReceiverStream::new(rx).collect().await;
        assert_eq!(drained, vec![0, 1, 2, 3, 4]);
    }
}
