use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::domain::{BridgeError, BridgeResult};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Minimal Telegram Bot API client for sending chat messages.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

/// Envelope every Bot API response is wrapped in.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramClient {
    pub fn new(token: String, timeout: Duration) -> BridgeResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| BridgeError::Transport(err.into()))?;

        Ok(Self {
            http,
            base_url: TELEGRAM_API_BASE.to_string(),
            token,
        })
    }

    /// Override the API base URL, e.g. for tests against a local server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Send a text message to a chat.
    pub async fn send_message(&self, chat_id: &str, text: &str) -> BridgeResult<()> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);

        let response = self
            .http
            .post(&url)
            .json(&json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await
            .map_err(|err| BridgeError::Transport(err.into()))?;

        let status = response.status();
        let body: ApiResponse = response
            .json()
            .await
            .map_err(|err| BridgeError::Transport(err.into()))?;

        if !body.ok {
            let description = body
                .description
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(BridgeError::ApiRejected(description));
        }

        debug!(chat_id = %chat_id, "message accepted by telegram");
        Ok(())
    }
}
