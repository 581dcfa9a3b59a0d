//! Type-safe wrappers around [`ResourceClient`](crate::framework::ResourceClient).

pub mod actor_client;
pub mod order_store_client;

pub use actor_client::*;
pub use order_store_client::*;
