use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{BridgeError, BridgeResult};

/// Outbound chat notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub chat_id: String,
    pub text: String,
}

/// Trait for delivering notifications to the chat backend.
///
/// Implementations should:
/// - Deliver the text to the chat named by the notification
/// - Return an error when delivery fails; the caller decides what to do with it
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Deliver a single notification.
    async fn send_notification(&self, notification: &Notification) -> BridgeResult<()>;
}

/// Thread-safe, non-blocking handoff into the dispatch loop.
///
/// Submissions never wait: when the queue is full the notification is dropped
/// and the caller gets [`BridgeError::QueueFull`].
#[derive(Clone)]
pub struct NotificationQueue {
    tx: mpsc::Sender<Notification>,
}

impl NotificationQueue {
    /// Create a queue with the given capacity, returning the submission
    /// handle and the receiving end for the dispatch loop.
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<Notification>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    pub fn submit(&self, notification: Notification) -> BridgeResult<()> {
        self.tx.try_send(notification).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => BridgeError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => BridgeError::QueueClosed,
        })
    }
}
