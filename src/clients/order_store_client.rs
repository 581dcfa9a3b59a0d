//! # Order Store Client
//!
//! Wraps a `ResourceClient<Order>` and exposes it as an [`OrderStore`].
use crate::clients::actor_client::ActorClient;
use crate::framework::{FrameworkError, ResourceClient};
use crate::model::{NewOrder, Order, OrderFilter, OrderId, ProductId};
use crate::order_store::{OrderStore, StoreError};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for the in-process order store actor.
#[derive(Clone)]
pub struct OrderStoreClient {
    inner: ResourceClient<Order>,
}

impl OrderStoreClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<Order> for OrderStoreClient {
    type Error = StoreError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::Rejected(reason) => StoreError::Rejected(reason),
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

#[async_trait]
impl OrderStore for OrderStoreClient {
    #[instrument(skip(self, order), fields(product_id = %order.product_id))]
    async fn insert_order(&self, order: NewOrder) -> Result<OrderId, StoreError> {
        debug!(?order, "insert_order called");
        self.inner.create(order).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    async fn orders_by_product(&self, product_id: ProductId) -> Result<Vec<Order>, StoreError> {
        debug!("Sending request");
        self.list(OrderFilter::ByProduct(product_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::{create_mock_client, expect_create, expect_list, MockClient};
    use crate::model::OrderStatus;
    use chrono::Utc;

    fn new_order(product_id: i64, qty: u32) -> NewOrder {
        NewOrder {
            product_id: ProductId(product_id),
            qty,
            total_price: f64::from(qty) * 2.0,
            status: OrderStatus::Created,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_forwards_payload_and_returns_assigned_id() {
        let (client, mut receiver) = create_mock_client::<Order>(10);
        let store = OrderStoreClient::new(client);

        let insert_task = tokio::spawn(async move { store.insert_order(new_order(5, 3)).await });

        let (params, responder) = expect_create(&mut receiver)
            .await
            .expect("Expected Create request");
        assert_eq!(params.product_id, ProductId(5));
        assert_eq!(params.qty, 3);
        assert_eq!(params.total_price, 6.0);
        responder.send(Ok(OrderId(42))).unwrap();

        assert_eq!(insert_task.await.unwrap(), Ok(OrderId(42)));
    }

    #[tokio::test]
    async fn test_orders_by_product_sends_product_filter() {
        let (client, mut receiver) = create_mock_client::<Order>(10);
        let store = OrderStoreClient::new(client);

        let list_task = tokio::spawn(async move { store.orders_by_product(ProductId(8)).await });

        let (filter, responder) = expect_list(&mut receiver)
            .await
            .expect("Expected List request");
        assert_eq!(filter, OrderFilter::ByProduct(ProductId(8)));
        responder
            .send(Ok(vec![Order::from_new(OrderId(2), new_order(8, 1))]))
            .unwrap();

        let orders = list_task.await.unwrap().unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, OrderId(2));
    }

    #[tokio::test]
    async fn test_framework_errors_map_to_store_errors() {
        let mut mock = MockClient::<Order>::new();
        mock.expect_create()
            .return_err(FrameworkError::Rejected("qty must be greater than zero".into()));
        mock.expect_list().return_err(FrameworkError::ActorDropped);

        let store = OrderStoreClient::new(mock.client());

        let insert = store.insert_order(new_order(1, 1)).await;
        assert!(matches!(insert, Err(StoreError::Rejected(msg)) if msg.contains("qty")));

        let list = store.orders_by_product(ProductId(1)).await;
        assert!(matches!(list, Err(StoreError::Unavailable(_))));

        mock.verify();
    }

    #[tokio::test]
    async fn test_insert_against_stopped_store_is_unavailable() {
        let (client, receiver) = create_mock_client::<Order>(1);
        drop(receiver);
        let store = OrderStoreClient::new(client);

        let result = store.insert_order(new_order(1, 1)).await;
        assert_eq!(
            result,
            Err(StoreError::Unavailable("Actor closed".to_string()))
        );
    }
}
