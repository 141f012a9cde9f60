use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::domain::{Notification, NotificationSender};

/// Single consumer loop that owns the outbound sender.
///
/// Delivery is fire-and-forget: a failed send is logged and the loop moves on
/// to the next notification.
pub struct NotificationDispatcher {
    rx: mpsc::Receiver<Notification>,
    sender: Arc<dyn NotificationSender>,
}

impl NotificationDispatcher {
    pub fn new(rx: mpsc::Receiver<Notification>, sender: Arc<dyn NotificationSender>) -> Self {
        Self { rx, sender }
    }

    pub async fn run(mut self, ctx: CancellationToken) -> anyhow::Result<()> {
        info!("starting notification dispatcher");

        loop {
            tokio::select! {
                _ = ctx.cancelled() => {
                    info!("received shutdown signal, stopping dispatcher");
                    break;
                }
                notification = self.rx.recv() => {
                    match notification {
                        Some(notification) => self.dispatch(notification).await,
                        None => {
                            debug!("notification queue closed, stopping dispatcher");
                            break;
                        }
                    }
                }
            }
        }

        info!("notification dispatcher stopped");
        Ok(())
    }

    async fn dispatch(&self, notification: Notification) {
        debug!(chat_id = %notification.chat_id, "delivering notification");

        if let Err(err) = self.sender.send_notification(&notification).await {
            error!(
                chat_id = %notification.chat_id,
                error = %err,
                "failed to deliver notification"
            );
        }
    }
}
