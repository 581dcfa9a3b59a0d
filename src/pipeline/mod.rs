//! # Order Pipeline
//!
//! Turns a create-order request into a persisted order, an `order.created` event
//! and an invalidated listing cache. Steps always run in this order:
//!
//! 1. validate input (no I/O on failure)
//! 2. resolve the unit price through the [`PriceCache`]
//! 3. `total_price = qty * price`
//! 4. insert the order
//! 5. publish the event
//! 6. invalidate `orders:product:{id}`
//!
//! Failures in steps 1–4 end the request. Steps 5 and 6 run after the order is
//! committed; their failures are logged and the request still succeeds. Nothing
//! is compensated.

pub mod error;

pub use error::*;

use crate::events::EventSink;
use crate::list_cache::{orders_by_product_key, ListCache};
use crate::model::{
    CreateOrderRequest, NewOrder, Order, OrderCreatedEvent, OrderStatus, ProductId,
    ORDER_CREATED_TOPIC,
};
use crate::order_store::OrderStore;
use crate::pricing::PriceCache;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, info, instrument, warn};

/// Per-request knobs of the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    /// Budget for one request: cold price fetch, insert and publish.
    pub request_timeout: Duration,
    /// How long a listing stays in the list cache.
    pub list_cache_ttl: Duration,
    pub order_created_topic: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_millis(2500),
            list_cache_ttl: Duration::from_secs(60),
            order_created_topic: ORDER_CREATED_TOPIC.to_string(),
        }
    }
}

/// Stateless per call; cheap to clone and share between request tasks.
#[derive(Clone)]
pub struct OrderPipeline {
    prices: PriceCache,
    store: Arc<dyn OrderStore>,
    events: Arc<dyn EventSink>,
    list_cache: Arc<dyn ListCache>,
    settings: PipelineSettings,
}

impl OrderPipeline {
    pub fn new(
        prices: PriceCache,
        store: Arc<dyn OrderStore>,
        events: Arc<dyn EventSink>,
        list_cache: Arc<dyn ListCache>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            prices,
            store,
            events,
            list_cache,
            settings,
        }
    }

    pub fn prices(&self) -> &PriceCache {
        &self.prices
    }

    /// A deadline `request_timeout` from now.
    pub fn deadline(&self) -> Instant {
        Instant::now() + self.settings.request_timeout
    }

    /// Creates one order and returns the event that describes it.
    #[instrument(skip(self, deadline), fields(product_id = request.product_id, qty = request.qty))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
        deadline: Instant,
    ) -> Result<OrderCreatedEvent, OrderError> {
        let (product_id, qty) = validate(&request)?;

        let price = self
            .prices
            .resolve(product_id, deadline)
            .await
            .map_err(|e| {
                warn!(error = %e, "Price resolution failed");
                OrderError::from(e)
            })?;

        let total_price = f64::from(qty) * price;
        let created_at = Utc::now();
        let new_order = NewOrder {
            product_id,
            qty,
            total_price,
            status: OrderStatus::Created,
            created_at,
        };

        let order_id = match timeout_at(deadline, self.store.insert_order(new_order)).await {
            Ok(Ok(order_id)) => order_id,
            Ok(Err(e)) => {
                error!(error = %e, "Order insert failed");
                return Err(OrderError::PersistenceError(e.to_string()));
            }
            // The store may already hold the Create request and will still commit
            // it. That row gets no event and no listing invalidation; it shows up
            // in listings once the cached one expires. Not compensated.
            Err(_) => {
                error!("Order insert timed out");
                return Err(OrderError::PersistenceError("insert timed out".to_string()));
            }
        };

        let event = OrderCreatedEvent::new(order_id, product_id, qty, total_price, created_at);
        info!(%order_id, price, total_price, "Order created");

        if let Err(e) = self.publish(&event, deadline).await {
            warn!(%order_id, error = %e, "Order kept without event");
        }
        if let Err(e) = self.invalidate_listing(product_id).await {
            warn!(%order_id, error = %e, "Order listing may be stale until it expires");
        }

        Ok(event)
    }

    /// Orders of one product, newest first, read through the list cache.
    #[instrument(skip(self))]
    pub async fn orders_by_product(&self, product_id: i64) -> Result<Vec<Order>, OrderError> {
        if product_id <= 0 {
            return Err(OrderError::InvalidRequest("productId must be > 0".to_string()));
        }
        let product_id = ProductId(product_id);
        let key = orders_by_product_key(product_id);

        match self.list_cache.get(&key).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<Order>>(&bytes) {
                Ok(orders) => {
                    debug!(count = orders.len(), "Listing cache hit");
                    return Ok(orders);
                }
                Err(e) => warn!(error = %e, "Discarding undecodable cached listing"),
            },
            Ok(None) => debug!("Listing cache miss"),
            Err(e) => warn!(error = %e, "Listing cache read failed"),
        }

        let orders = self
            .store
            .orders_by_product(product_id)
            .await
            .map_err(|e| {
                error!(error = %e, "Order listing failed");
                OrderError::PersistenceError(e.to_string())
            })?;

        match serde_json::to_vec(&orders) {
            Ok(bytes) => {
                if let Err(e) = self
                    .list_cache
                    .set(&key, bytes, self.settings.list_cache_ttl)
                    .await
                {
                    warn!(error = %e, "Listing cache write failed");
                }
            }
            Err(e) => warn!(error = %e, "Listing not cacheable"),
        }

        Ok(orders)
    }

    async fn publish(&self, event: &OrderCreatedEvent, deadline: Instant) -> Result<(), SideEffectError> {
        let payload = event
            .to_bytes()
            .map_err(|e| SideEffectError::PublishFailed(e.to_string()))?;
        let topic = self.settings.order_created_topic.as_str();

        match timeout_at(deadline, self.events.publish(topic, payload)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(SideEffectError::PublishFailed("publish timed out".to_string())),
        }
    }

    async fn invalidate_listing(&self, product_id: ProductId) -> Result<(), SideEffectError> {
        self.list_cache
            .invalidate(&orders_by_product_key(product_id))
            .await?;
        Ok(())
    }
}

fn validate(request: &CreateOrderRequest) -> Result<(ProductId, u32), OrderError> {
    if request.product_id <= 0 {
        return Err(OrderError::InvalidRequest("productId must be > 0".to_string()));
    }
    if request.qty <= 0 {
        return Err(OrderError::InvalidRequest("qty must be > 0".to_string()));
    }
    let qty = u32::try_from(request.qty)
        .map_err(|_| OrderError::InvalidRequest(format!("qty {} is too large", request.qty)))?;
    Ok((ProductId(request.product_id), qty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_non_positive_input() {
        for (product_id, qty) in [(0, 1), (-3, 1), (1, 0), (1, -1)] {
            let result = validate(&CreateOrderRequest::new(product_id, qty));
            assert!(
                matches!(result, Err(OrderError::InvalidRequest(_))),
                "productId={product_id} qty={qty} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_rejects_qty_beyond_u32() {
        let result = validate(&CreateOrderRequest::new(1, i64::from(u32::MAX) + 1));
        assert!(matches!(result, Err(OrderError::InvalidRequest(msg)) if msg.contains("too large")));
    }

    #[test]
    fn test_validate_accepts_positive_input() {
        assert_eq!(
            validate(&CreateOrderRequest::new(7, 3)),
            Ok((ProductId(7), 3))
        );
    }
}
