//! # `order.created` consumer
//!
//! Subscribes to the bus and logs every well-formed order creation. Deliveries on
//! other topics are ignored.

use crate::events::Delivery;
use crate::model::OrderCreatedEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

/// What the consumer did with one delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryOutcome {
    Acknowledged(OrderCreatedEvent),
    /// Empty body, nothing to do.
    Skipped,
    /// Undecodable or semantically invalid payload. Not retried.
    Rejected(String),
}

/// Running totals, returned when the consumer stops.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerStats {
    pub acknowledged: u64,
    pub skipped: u64,
    pub rejected: u64,
}

/// Classifies one `order.created` payload.
pub fn handle_order_created(payload: &[u8]) -> DeliveryOutcome {
    if payload.is_empty() {
        return DeliveryOutcome::Skipped;
    }
    let event: OrderCreatedEvent = match serde_json::from_slice(payload) {
        Ok(event) => event,
        Err(e) => return DeliveryOutcome::Rejected(format!("invalid JSON: {e}")),
    };
    if !event.product_id.is_valid() || event.qty <= 0 {
        return DeliveryOutcome::Rejected(format!(
            "invalid numeric payload: productId={} qty={}",
            event.product_id, event.qty
        ));
    }
    DeliveryOutcome::Acknowledged(event)
}

pub struct OrderCreatedConsumer {
    receiver: broadcast::Receiver<Delivery>,
    topic: String,
}

impl OrderCreatedConsumer {
    pub fn new(receiver: broadcast::Receiver<Delivery>, topic: impl Into<String>) -> Self {
        Self {
            receiver,
            topic: topic.into(),
        }
    }

    /// Consumes until the bus closes.
    pub async fn run(mut self) -> ConsumerStats {
        let mut stats = ConsumerStats::default();
        info!(topic = %self.topic, "Consumer started");

        loop {
            let delivery = match self.receiver.recv().await {
                Ok(delivery) => delivery,
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "Consumer lagged behind event bus");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            if delivery.topic != self.topic {
                continue;
            }

            match handle_order_created(&delivery.payload) {
                DeliveryOutcome::Acknowledged(event) => {
                    stats.acknowledged += 1;
                    info!(
                        order_id = %event.order_id,
                        product_id = %event.product_id,
                        qty = event.qty,
                        total_price = event.total_price,
                        "order.created received"
                    );
                }
                DeliveryOutcome::Skipped => {
                    stats.skipped += 1;
                    debug!("Skipped empty delivery");
                }
                DeliveryOutcome::Rejected(reason) => {
                    stats.rejected += 1;
                    warn!(%reason, "Rejected delivery");
                }
            }
        }

        info!(?stats, "Consumer stopped");
        stats
    }
}
