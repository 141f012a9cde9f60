use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use estop_bridge::domain::{
    AlertService, BridgeError, BridgeResult, Notification, NotificationDispatcher,
    NotificationQueue, NotificationSender,
};
use tokio_util::sync::CancellationToken;

// Recording sender used in place of the Telegram client
struct RecordingSender {
    delivered: Mutex<Vec<Notification>>,
    failures_left: Mutex<usize>,
}

impl RecordingSender {
    fn new(failures_left: usize) -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            failures_left: Mutex::new(failures_left),
        }
    }

    fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for RecordingSender {
    async fn send_notification(&self, notification: &Notification) -> BridgeResult<()> {
        {
            let mut failures = self.failures_left.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(BridgeError::Transport(anyhow::anyhow!("delivery failed")));
            }
        }

        self.delivered.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

// Push the given publishes through classification and the dispatch loop,
// then let the dispatcher drain and stop by closing the queue.
async fn run_bridge_flow(sender: Arc<RecordingSender>, events: &[(&str, &[u8])]) {
    let (queue, rx) = NotificationQueue::bounded(16);
    let service = AlertService::new("42".to_string(), queue.clone());

    for (topic, payload) in events {
        // Per-event failures must not affect later events
        let _ = service.handle_publish(topic, payload);
    }
    drop(service);
    drop(queue);

    let dispatcher = NotificationDispatcher::new(rx, sender);
    dispatcher.run(CancellationToken::new()).await.unwrap();
}

#[tokio::test]
async fn test_pressed_event_delivers_exact_text() {
    let sender = Arc::new(RecordingSender::new(0));

    run_bridge_flow(sender.clone(), &[("alerts/button", b"1".as_slice())]).await;

    let delivered = sender.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].chat_id, "42");
    assert_eq!(delivered[0].text, "Emergency stop button pressed! 🚨");
}

#[tokio::test]
async fn test_released_event_delivers_exact_text() {
    let sender = Arc::new(RecordingSender::new(0));

    run_bridge_flow(sender.clone(), &[("alerts/button", b"L".as_slice())]).await;

    let delivered = sender.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].text, "Emergency stop button released! ✅");
}

#[tokio::test]
async fn test_other_payload_delivers_topic_and_payload() {
    let sender = Arc::new(RecordingSender::new(0));

    run_bridge_flow(sender.clone(), &[("sensors/temp", b"23.5".as_slice())]).await;

    let delivered = sender.delivered();
    assert_eq!(delivered.len(), 1);
    assert!(delivered[0].text.contains("sensors/temp"));
    assert!(delivered[0].text.contains("23.5"));
}

#[tokio::test]
async fn test_send_failure_does_not_block_later_events() {
    let sender = Arc::new(RecordingSender::new(1));

    run_bridge_flow(
        sender.clone(),
        &[
            ("alerts/button", b"1".as_slice()),
            ("alerts/button", b"L".as_slice()),
        ],
    )
    .await;

    // The first delivery failed and was dropped; the second went through
    let delivered = sender.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].text, "Emergency stop button released! ✅");
}

#[tokio::test]
async fn test_invalid_utf8_produces_no_notification() {
    let sender = Arc::new(RecordingSender::new(0));

    run_bridge_flow(
        sender.clone(),
        &[
            ("alerts/button", [0xff, 0xfe].as_slice()),
            ("alerts/button", b"1".as_slice()),
        ],
    )
    .await;

    let delivered = sender.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].text, "Emergency stop button pressed! 🚨");
}
