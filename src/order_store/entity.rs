//! Entity trait implementation for the Order domain type.
//!
//! This module contains the [`ActorEntity`] trait implementation
//! that enables [`Order`] to be held by the generic [`crate::framework::ResourceActor`].

use crate::framework::ActorEntity;
use crate::model::{NewOrder, Order, OrderFilter, OrderId};

impl ActorEntity for Order {
    type Id = OrderId;
    type CreateParams = NewOrder;
    type Filter = OrderFilter;

    /// Creates the persisted row. Rejects quantities of zero and non-finite totals.
    fn from_create_params(id: OrderId, params: NewOrder) -> Result<Self, String> {
        if params.qty == 0 {
            return Err("qty must be greater than zero".to_string());
        }
        if !params.total_price.is_finite() {
            return Err(format!("total price {} is not finite", params.total_price));
        }
        Ok(Order::from_new(id, params))
    }

    fn matches(&self, filter: &OrderFilter) -> bool {
        match filter {
            OrderFilter::All => true,
            OrderFilter::ByProduct(product_id) => self.product_id == *product_id,
        }
    }
}
