use crate::events::{Delivery, EventError, EventSink};
use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

/// Topic-tagged broadcast bus. Every subscriber sees every delivery.
#[derive(Clone)]
pub struct InMemoryEventBus {
    sender: broadcast::Sender<Delivery>,
}

impl InMemoryEventBus {
    /// `capacity` is how many deliveries a slow subscriber may fall behind by.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Delivery> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[async_trait]
impl EventSink for InMemoryEventBus {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), EventError> {
        let delivery = Delivery {
            topic: topic.to_string(),
            payload,
        };
        let receivers = self
            .sender
            .send(delivery)
            .map_err(|_| EventError::NoSubscribers(topic.to_string()))?;
        debug!(topic, receivers, "Published");
        Ok(())
    }
}
