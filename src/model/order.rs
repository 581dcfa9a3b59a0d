use crate::model::ProductId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Store-assigned order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub i64);

impl From<i64> for OrderId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of an order. Only creation is handled here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
}

/// Represents a persisted customer order.
///
/// # Actor Framework
/// This struct implements the [`ActorEntity`](crate::framework::ActorEntity) trait,
/// allowing it to be held by the in-process order store actor.
///
/// See [`impl ActorEntity for Order`](#impl-ActorEntity-for-Order) for details on:
/// - Creation parameters ([`NewOrder`])
/// - Query filter ([`OrderFilter`])
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub product_id: ProductId,
    pub qty: u32,
    pub total_price: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Payload for inserting a new order. The store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub product_id: ProductId,
    pub qty: u32,
    pub total_price: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Selects orders when listing the store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrderFilter {
    All,
    ByProduct(ProductId),
}

impl Order {
    /// Builds the persisted row from the insert payload and the assigned id.
    pub fn from_new(id: OrderId, new: NewOrder) -> Self {
        Self {
            id,
            product_id: new.product_id,
            qty: new.qty,
            total_price: new.total_price,
            status: new.status,
            created_at: new.created_at,
        }
    }
}

/// Inbound create-order payload, e.g. `{"productId": 7, "qty": 3}`.
///
/// Fields stay signed so that negative input reaches validation instead of
/// failing deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateOrderRequest {
    pub product_id: i64,
    pub qty: i64,
}

impl CreateOrderRequest {
    pub fn new(product_id: i64, qty: i64) -> Self {
        Self { product_id, qty }
    }
}
