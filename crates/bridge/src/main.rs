use std::sync::Arc;
use std::time::Duration;

use estop_bridge::bridge_worker::{BridgeWorker, BridgeWorkerConfig};
use estop_bridge::config::ServiceConfig;
use estop_bridge::domain::NotificationSender;
use estop_bridge::mqtt::MqttSettings;
use estop_bridge::telegram::{TelegramClient, TelegramNotifier};
use estop_bridge::telemetry::{init_telemetry, TelemetryConfig};
use estop_runner::Runner;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_telemetry(&TelemetryConfig {
        log_level: config.log_level.clone(),
    }) {
        eprintln!("Failed to initialize telemetry: {}", e);
        std::process::exit(1);
    }

    info!(
        mqtt_host = %config.mqtt_host,
        mqtt_port = config.mqtt_port,
        mqtt_topic = %config.mqtt_topic,
        "starting estop-bridge"
    );

    let telegram_client = match TelegramClient::new(
        config.telegram_bot_token.clone(),
        Duration::from_secs(config.telegram_timeout_secs),
    ) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to initialize Telegram client: {}", e);
            std::process::exit(1);
        }
    };
    let sender: Arc<dyn NotificationSender> = Arc::new(TelegramNotifier::new(telegram_client));

    let worker = BridgeWorker::new(
        BridgeWorkerConfig {
            mqtt: MqttSettings {
                host: config.mqtt_host.clone(),
                port: config.mqtt_port,
                topic: config.mqtt_topic.clone(),
                username: config.mqtt_username.clone(),
                password: config.mqtt_password.clone(),
                client_id: config.mqtt_client_id.clone(),
                keep_alive: Duration::from_secs(config.mqtt_keep_alive_secs),
                max_retry_attempts: config.mqtt_max_retry_attempts,
                retry_delay: Duration::from_secs(config.mqtt_retry_delay_secs),
            },
            chat_id: config.telegram_chat_id.clone(),
            queue_capacity: config.queue_capacity,
        },
        sender,
    );

    let mut runner = Runner::new();
    for (name, process) in worker.into_runner_processes() {
        runner = runner.with_named_process(name, process);
    }
    runner = runner
        .with_closer(|| async {
            info!("bridge shut down");
            Ok(())
        })
        .with_closer_timeout(Duration::from_secs(10));

    runner.run().await;
}
