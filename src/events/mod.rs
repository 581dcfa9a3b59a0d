//! Event publication: the [`EventSink`] contract, the in-process bus and the
//! `order.created` consumer.

pub mod bus;
pub mod consumer;

pub use bus::*;
pub use consumer::*;

use async_trait::async_trait;
use thiserror::Error;

/// A message as carried by the bus.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Errors surfaced by an event sink. Publishing is best effort, so callers
/// typically log these and move on.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EventError {
    #[error("No subscriber for topic {0}")]
    NoSubscribers(String),

    #[error("Event sink unavailable: {0}")]
    Unavailable(String),
}

/// At-most-once publish sink.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), EventError>;
}
