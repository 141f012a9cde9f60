use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    // MQTT configuration
    /// Broker hostname
    #[serde(default = "default_mqtt_host")]
    pub mqtt_host: String,

    /// Broker port
    #[serde(default = "default_mqtt_port")]
    pub mqtt_port: u16,

    /// Topic carrying the button state
    #[serde(default = "default_mqtt_topic")]
    pub mqtt_topic: String,

    /// Broker username
    pub mqtt_username: String,

    /// Broker password
    pub mqtt_password: String,

    /// Client identifier presented to the broker
    #[serde(default = "default_mqtt_client_id")]
    pub mqtt_client_id: String,

    /// Keep-alive interval in seconds
    #[serde(default = "default_mqtt_keep_alive_secs")]
    pub mqtt_keep_alive_secs: u64,

    /// Consecutive connection failures tolerated before giving up
    #[serde(default = "default_mqtt_max_retry_attempts")]
    pub mqtt_max_retry_attempts: u32,

    /// Delay between connection attempts in seconds
    #[serde(default = "default_mqtt_retry_delay_secs")]
    pub mqtt_retry_delay_secs: u64,

    // Telegram configuration
    /// Bot API token
    pub telegram_bot_token: String,

    /// Destination chat identifier
    pub telegram_chat_id: String,

    /// Request timeout in seconds for Bot API calls
    #[serde(default = "default_telegram_timeout_secs")]
    pub telegram_timeout_secs: u64,

    /// Capacity of the notification dispatch queue
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_log_level() -> String {
    "info".to_string()
}

// MQTT defaults
fn default_mqtt_host() -> String {
    "localhost".to_string()
}

fn default_mqtt_port() -> u16 {
    1883
}

fn default_mqtt_topic() -> String {
    "home/emergency_button/state".to_string()
}

fn default_mqtt_client_id() -> String {
    "estop-bridge".to_string()
}

fn default_mqtt_keep_alive_secs() -> u64 {
    30
}

fn default_mqtt_max_retry_attempts() -> u32 {
    10
}

fn default_mqtt_retry_delay_secs() -> u64 {
    5
}

// Telegram defaults
fn default_telegram_timeout_secs() -> u64 {
    10
}

fn default_queue_capacity() -> usize {
    64
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("ESTOP"))
            .build()?
            .try_deserialize()
    }
}
