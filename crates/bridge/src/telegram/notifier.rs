use async_trait::async_trait;

use crate::domain::{BridgeResult, Notification, NotificationSender};
use crate::telegram::TelegramClient;

/// Delivers notifications through the Telegram Bot API.
pub struct TelegramNotifier {
    client: TelegramClient,
}

impl TelegramNotifier {
    pub fn new(client: TelegramClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationSender for TelegramNotifier {
    async fn send_notification(&self, notification: &Notification) -> BridgeResult<()> {
        self.client
            .send_message(&notification.chat_id, &notification.text)
            .await
    }
}
