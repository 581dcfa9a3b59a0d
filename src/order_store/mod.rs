//! Order persistence: the [`OrderStore`] contract and its in-process actor backend.

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::OrderStoreClient;
use crate::framework::ResourceActor;
use crate::model::{NewOrder, Order, OrderId, ProductId};
use async_trait::async_trait;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Durable order storage as seen by the pipeline.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts a row and returns the id the store assigned.
    async fn insert_order(&self, order: NewOrder) -> Result<OrderId, StoreError>;

    /// All orders for a product, most recent first.
    async fn orders_by_product(&self, product_id: ProductId) -> Result<Vec<Order>, StoreError>;
}

/// Creates a new order store actor and its client.
///
/// Ids are assigned from 1 upwards.
pub fn new(buffer_size: usize) -> (ResourceActor<Order>, OrderStoreClient) {
    let order_id_counter = Arc::new(AtomicI64::new(1));
    let next_order_id = move || OrderId(order_id_counter.fetch_add(1, Ordering::SeqCst));

    let (actor, generic_client) = ResourceActor::new(buffer_size, next_order_id);
    let client = OrderStoreClient::new(generic_client);

    (actor, client)
}
