use tracing::{debug, instrument};

use crate::domain::{BridgeResult, InboundMessage, Notification, NotificationQueue};

const PRESSED_PAYLOAD: &str = "1";
const RELEASED_PAYLOAD: &str = "L";

const PRESSED_TEXT: &str = "Emergency stop button pressed! 🚨";
const RELEASED_TEXT: &str = "Emergency stop button released! ✅";

/// Domain service that turns broker messages into chat notifications.
///
/// Flow:
/// 1. Decode the publish payload as UTF-8
/// 2. Map the button-state marker to its notification text
/// 3. Submit the notification to the dispatch queue
pub struct AlertService {
    chat_id: String,
    queue: NotificationQueue,
}

impl AlertService {
    pub fn new(chat_id: String, queue: NotificationQueue) -> Self {
        Self { chat_id, queue }
    }

    /// Build the notification for a decoded message.
    ///
    /// Button-state markers map to fixed texts; anything else is forwarded
    /// verbatim together with its topic.
    pub fn classify(&self, message: &InboundMessage) -> Notification {
        let text = match message.payload.as_str() {
            PRESSED_PAYLOAD => PRESSED_TEXT.to_string(),
            RELEASED_PAYLOAD => RELEASED_TEXT.to_string(),
            other => format!(
                "New MQTT Message\nTopic: {}\nMessage: {}",
                message.topic, other
            ),
        };

        Notification {
            chat_id: self.chat_id.clone(),
            text,
        }
    }

    /// Handle a single publish: decode, classify, enqueue.
    ///
    /// Errors are reported to the caller and affect only this event.
    #[instrument(skip(self, payload), fields(payload_size = payload.len()))]
    pub fn handle_publish(&self, topic: &str, payload: &[u8]) -> BridgeResult<()> {
        let message = InboundMessage::from_bytes(topic, payload)?;

        debug!(payload = %message.payload, "classifying message");
        let notification = self.classify(&message);

        self.queue.submit(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BridgeError;
    use tokio::sync::mpsc;

    fn create_test_service(capacity: usize) -> (AlertService, mpsc::Receiver<Notification>) {
        let (queue, rx) = NotificationQueue::bounded(capacity);
        (AlertService::new("42".to_string(), queue), rx)
    }

    #[test]
    fn test_classify_pressed_marker() {
        let (service, _rx) = create_test_service(4);

        let notification = service.classify(&InboundMessage {
            topic: "alerts/button".to_string(),
            payload: "1".to_string(),
        });

        assert_eq!(notification.chat_id, "42");
        assert_eq!(notification.text, "Emergency stop button pressed! 🚨");
    }

    #[test]
    fn test_classify_released_marker() {
        let (service, _rx) = create_test_service(4);

        let notification = service.classify(&InboundMessage {
            topic: "alerts/button".to_string(),
            payload: "L".to_string(),
        });

        assert_eq!(notification.text, "Emergency stop button released! ✅");
    }

    #[test]
    fn test_classify_marker_is_independent_of_topic() {
        let (service, _rx) = create_test_service(4);

        let notification = service.classify(&InboundMessage {
            topic: "some/other/topic".to_string(),
            payload: "1".to_string(),
        });

        assert_eq!(notification.text, "Emergency stop button pressed! 🚨");
    }

    #[test]
    fn test_classify_other_payload_embeds_topic_and_payload() {
        let (service, _rx) = create_test_service(4);

        let notification = service.classify(&InboundMessage {
            topic: "sensors/temp".to_string(),
            payload: "23.5".to_string(),
        });

        assert!(notification.text.contains("sensors/temp"));
        assert!(notification.text.contains("23.5"));
    }

    #[test]
    fn test_classify_is_case_sensitive() {
        let (service, _rx) = create_test_service(4);

        let notification = service.classify(&InboundMessage {
            topic: "alerts/button".to_string(),
            payload: "l".to_string(),
        });

        // Lowercase "l" is not the release marker
        assert!(notification.text.contains("Message: l"));
    }

    #[test]
    fn test_handle_publish_enqueues_notification() {
        let (service, mut rx) = create_test_service(4);

        service
            .handle_publish("home/emergency_button/state", b"1")
            .unwrap();

        let notification = rx.try_recv().unwrap();
        assert_eq!(notification.chat_id, "42");
        assert_eq!(notification.text, "Emergency stop button pressed! 🚨");
    }

    #[test]
    fn test_handle_publish_rejects_invalid_utf8() {
        let (service, mut rx) = create_test_service(4);

        let result = service.handle_publish("home/emergency_button/state", &[0xff, 0xfe]);

        assert!(matches!(result, Err(BridgeError::InvalidPayload(_))));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_handle_publish_drops_when_queue_full() {
        let (service, _rx) = create_test_service(1);

        service
            .handle_publish("home/emergency_button/state", b"1")
            .unwrap();
        let result = service.handle_publish("home/emergency_button/state", b"L");

        assert!(matches!(result, Err(BridgeError::QueueFull)));
    }
}
