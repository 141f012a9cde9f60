use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Span};

use crate::domain::AlertService;

/// Connection settings for the broker subscription.
#[derive(Debug, Clone)]
pub struct MqttSettings {
    pub host: String,
    pub port: u16,
    pub topic: String,
    pub username: String,
    pub password: String,
    pub client_id: String,
    pub keep_alive: Duration,
    pub max_retry_attempts: u32,
    pub retry_delay: Duration,
}

/// Long-running broker subscription feeding the alert service.
///
/// Subscribes to the configured topic on every successful connect, so the
/// subscription survives broker reconnects.
pub struct MqttSubscriber {
    settings: MqttSettings,
    service: Arc<AlertService>,
}

impl MqttSubscriber {
    pub fn new(settings: MqttSettings, service: Arc<AlertService>) -> Self {
        Self { settings, service }
    }

    /// Run the subscription until cancelled or the retry attempts are
    /// exhausted.
    pub async fn run(self, ctx: CancellationToken) -> anyhow::Result<()> {
        info!(
            host = %self.settings.host,
            port = self.settings.port,
            topic = %self.settings.topic,
            "starting MQTT subscriber"
        );

        let mut retry_count: u32 = 0;

        loop {
            if ctx.is_cancelled() {
                debug!("MQTT subscriber cancelled before connection");
                break;
            }

            match self.run_connection(&ctx, &mut retry_count).await {
                Ok(()) => {
                    debug!("MQTT subscriber stopped cleanly");
                    break;
                }
                Err(err) => {
                    error!(error = %err, "MQTT connection error");

                    retry_count += 1;
                    if retry_count >= self.settings.max_retry_attempts {
                        error!(
                            max_attempts = self.settings.max_retry_attempts,
                            "max retry attempts reached, stopping MQTT subscriber"
                        );
                        return Err(err);
                    }

                    warn!(
                        attempt = retry_count,
                        max_attempts = self.settings.max_retry_attempts,
                        "retrying MQTT connection"
                    );

                    tokio::select! {
                        _ = ctx.cancelled() => break,
                        _ = tokio::time::sleep(self.settings.retry_delay) => {}
                    }
                }
            }
        }

        info!("MQTT subscriber stopped");
        Ok(())
    }

    /// Run a single connection session until cancellation or a connection
    /// error. A successful connect resets the caller's retry counter.
    async fn run_connection(
        &self,
        ctx: &CancellationToken,
        retry_count: &mut u32,
    ) -> anyhow::Result<()> {
        let mut options = MqttOptions::new(
            self.settings.client_id.clone(),
            self.settings.host.clone(),
            self.settings.port,
        );
        options
            .set_credentials(
                self.settings.username.clone(),
                self.settings.password.clone(),
            )
            .set_keep_alive(self.settings.keep_alive)
            .set_clean_session(true);

        let (client, mut eventloop) = AsyncClient::new(options, 100);

        loop {
            tokio::select! {
                _ = ctx.cancelled() => {
                    debug!("shutdown signal received");
                    let _ = client.disconnect().await;
                    return Ok(());
                }
                event = eventloop.poll() => {
                    match event {
                        Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                            info!(code = ?ack.code, "connected to MQTT broker");
                            *retry_count = 0;

                            client
                                .subscribe(&self.settings.topic, QoS::AtMostOnce)
                                .await
                                .map_err(|err| {
                                    anyhow::anyhow!("failed to subscribe: {}", err)
                                })?;
                        }
                        Ok(Event::Incoming(Packet::SubAck(_))) => {
                            info!(topic = %self.settings.topic, "subscribed to MQTT topic");
                        }
                        Ok(Event::Incoming(Packet::Publish(publish))) => {
                            self.handle_publish(&publish.topic, &publish.payload);
                        }
                        Ok(Event::Incoming(Packet::PingResp)) => {
                            // Connection is healthy
                        }
                        Ok(_) => {
                            // Other events (outgoing, etc.)
                        }
                        Err(err) => {
                            return Err(anyhow::anyhow!("MQTT event loop error: {}", err));
                        }
                    }
                }
            }
        }
    }

    /// Handle one publish packet inside its own root span.
    ///
    /// Failures are contained here: a bad payload is logged and skipped
    /// without affecting the connection or later messages.
    fn handle_publish(&self, topic: &str, payload: &[u8]) {
        let span = info_span!(
            parent: Span::none(),
            "mqtt_message",
            topic = %topic,
            payload_size = payload.len(),
        );
        let _guard = span.enter();

        info!(topic = %topic, payload_size = payload.len(), "received message");

        if let Err(err) = self.service.handle_publish(topic, payload) {
            warn!(topic = %topic, error = %err, "failed to handle message, skipping");
        }
    }
}
