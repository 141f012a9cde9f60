use crate::domain::BridgeResult;

/// A message received from the broker with its payload decoded to text.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: String,
}

impl InboundMessage {
    /// Decode a raw publish payload as UTF-8.
    pub fn from_bytes(topic: &str, payload: &[u8]) -> BridgeResult<Self> {
        let payload = String::from_utf8(payload.to_vec())?;

        Ok(Self {
            topic: topic.to_string(),
            payload,
        })
    }
}
