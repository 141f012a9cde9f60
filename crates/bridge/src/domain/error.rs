use thiserror::Error;

pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("payload is not valid UTF-8: {0}")]
    InvalidPayload(#[from] std::string::FromUtf8Error),

    #[error("notification queue is full")]
    QueueFull,

    #[error("notification queue is closed")]
    QueueClosed,

    #[error("telegram API rejected the message: {0}")]
    ApiRejected(String),

    #[error("transport error: {0}")]
    Transport(#[from] anyhow::Error),
}
