use chrono::{Duration, Utc};
use order_service::clients::actor_client::ActorClient;
use order_service::model::{NewOrder, OrderFilter, OrderId, OrderStatus, ProductId};
use order_service::order_store::{OrderStore, StoreError};

fn new_order(product_id: i64, qty: u32, minutes_ago: i64) -> NewOrder {
    NewOrder {
        product_id: ProductId(product_id),
        qty,
        total_price: f64::from(qty) * 2.5,
        status: OrderStatus::Created,
        created_at: Utc::now() - Duration::minutes(minutes_ago),
    }
}

/// Real store actor driven through its client.
#[tokio::test]
async fn test_order_store_actor_round_trip() {
    let (store_actor, store) = order_service::order_store::new(8);
    let actor_handle = tokio::spawn(store_actor.run());

    let first = store.insert_order(new_order(7, 1, 2)).await.unwrap();
    let other = store.insert_order(new_order(8, 4, 1)).await.unwrap();
    let second = store.insert_order(new_order(7, 2, 0)).await.unwrap();
    assert_eq!((first, other, second), (OrderId(1), OrderId(2), OrderId(3)));

    let listing = store.orders_by_product(ProductId(7)).await.unwrap();
    let order = &listing[0];
    assert_eq!(order.id, second);
    assert_eq!(order.product_id, ProductId(7));
    assert_eq!(order.qty, 2);
    assert_eq!(order.total_price, 5.0);
    assert_eq!(order.status, OrderStatus::Created);

    let ids: Vec<OrderId> = listing.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![second, first], "newest first");

    assert!(store.orders_by_product(ProductId(99)).await.unwrap().is_empty());
    assert_eq!(store.list(OrderFilter::All).await.unwrap().len(), 3);

    // Cleanup
    drop(store);
    actor_handle.await.unwrap();
}

#[tokio::test]
async fn test_order_store_rejects_invalid_rows() {
    let (store_actor, store) = order_service::order_store::new(8);
    let actor_handle = tokio::spawn(store_actor.run());

    let result = store.insert_order(new_order(7, 0, 0)).await;
    assert!(matches!(result, Err(StoreError::Rejected(_))), "got {result:?}");

    let mut bad_total = new_order(7, 1, 0);
    bad_total.total_price = f64::NAN;
    let result = store.insert_order(bad_total).await;
    assert!(matches!(result, Err(StoreError::Rejected(_))), "got {result:?}");

    assert!(store.orders_by_product(ProductId(7)).await.unwrap().is_empty());

    drop(store);
    actor_handle.await.unwrap();
}

#[tokio::test]
async fn test_stopped_store_is_unavailable() {
    let (store_actor, store) = order_service::order_store::new(8);
    drop(store_actor);

    let result = store.insert_order(new_order(7, 1, 0)).await;
    assert!(matches!(result, Err(StoreError::Unavailable(_))), "got {result:?}");
}
