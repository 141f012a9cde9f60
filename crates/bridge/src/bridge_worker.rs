use std::sync::Arc;

use estop_runner::AppProcess;
use tracing::info;

use crate::domain::{AlertService, NotificationDispatcher, NotificationQueue, NotificationSender};
use crate::mqtt::{MqttSettings, MqttSubscriber};

pub struct BridgeWorkerConfig {
    pub mqtt: MqttSettings,
    pub chat_id: String,
    pub queue_capacity: usize,
}

/// Wires the broker subscription to the notification dispatch loop.
pub struct BridgeWorker {
    subscriber: MqttSubscriber,
    dispatcher: NotificationDispatcher,
}

impl BridgeWorker {
    pub fn new(config: BridgeWorkerConfig, sender: Arc<dyn NotificationSender>) -> Self {
        info!("initializing bridge worker");

        let (queue, notification_rx) = NotificationQueue::bounded(config.queue_capacity);
        let service = Arc::new(AlertService::new(config.chat_id, queue));

        let subscriber = MqttSubscriber::new(config.mqtt, service);
        let dispatcher = NotificationDispatcher::new(notification_rx, sender);

        Self {
            subscriber,
            dispatcher,
        }
    }

    pub fn into_runner_processes(self) -> Vec<(&'static str, AppProcess)> {
        let subscriber_process: AppProcess = Box::new({
            let subscriber = self.subscriber;
            move |ctx| Box::pin(async move { subscriber.run(ctx).await })
        });

        let dispatcher_process: AppProcess = Box::new({
            let dispatcher = self.dispatcher;
            move |ctx| Box::pin(async move { dispatcher.run(ctx).await })
        });

        vec![
            ("mqtt_subscriber", subscriber_process),
            ("notification_dispatcher", dispatcher_process),
        ]
    }
}
