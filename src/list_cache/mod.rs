//! Read-through cache for "orders by product" listings.
//!
//! The pipeline only needs three operations from it, captured by [`ListCache`].
//! [`TtlListCache`] is the in-process implementation: a key/value map where every
//! value carries its own expiry.

use crate::model::ProductId;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Errors surfaced by a list cache backend.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CacheError {
    #[error("List cache unavailable: {0}")]
    Unavailable(String),
}

/// Key under which the order listing of `product_id` is cached.
pub fn orders_by_product_key(product_id: ProductId) -> String {
    format!("orders:product:{}", product_id)
}

#[async_trait]
pub trait ListCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    async fn invalidate(&self, key: &str) -> Result<(), CacheError>;
}

struct CachedValue {
    bytes: Vec<u8>,
    expires_at: Instant,
}

/// In-memory [`ListCache`]. Expired values read as absent and are purged on access.
#[derive(Default)]
pub struct TtlListCache {
    values: Mutex<HashMap<String, CachedValue>>,
}

impl TtlListCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored values, expired ones included.
    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        self.values
            .lock()
            .get(key)
            .is_some_and(|value| now < value.expires_at)
    }
}

#[async_trait]
impl ListCache for TtlListCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let now = Instant::now();
        let mut values = self.values.lock();
        let lookup = values
            .get(key)
            .map(|value| (now < value.expires_at).then(|| value.bytes.clone()));
        match lookup {
            Some(Some(bytes)) => Ok(Some(bytes)),
            Some(None) => {
                values.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let cached = CachedValue {
            bytes: value,
            expires_at: Instant::now() + ttl,
        };
        self.values.lock().insert(key.to_string(), cached);
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        self.values.lock().remove(key);
        Ok(())
    }
}
