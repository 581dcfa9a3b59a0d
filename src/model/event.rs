use crate::model::{OrderId, ProductId};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Default routing topic for [`OrderCreatedEvent`].
pub const ORDER_CREATED_TOPIC: &str = "order.created";

/// Event published once per successfully persisted order.
///
/// Serialized as `{"orderId", "productId", "qty", "totalPrice", "createdAt"}`, with
/// `createdAt` rendered as RFC 3339 in UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreatedEvent {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub qty: i64,
    pub total_price: f64,
    pub created_at: String,
}

impl OrderCreatedEvent {
    pub fn new(
        order_id: OrderId,
        product_id: ProductId,
        qty: u32,
        total_price: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id,
            product_id,
            qty: i64::from(qty),
            total_price,
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
