//! # Stub Price Fetcher
//!
//! Scripted [`PriceFetcher`] for testing the cache and the pipeline without a
//! product service.
//!
//! ```ignore
//! let fetcher = Arc::new(StubPriceFetcher::new().with_price(ProductId(7), 12.5));
//! let cache = PriceCache::new(fetcher.clone(), PriceCacheConfig::default());
//!
//! let gate = fetcher.hold();      // park every fetch from here on
//! // ... exercise the cache while refreshes are in flight ...
//! gate.release();                 // let them finish
//! assert_eq!(fetcher.calls(ProductId(7)), 2);
//! ```

use crate::model::ProductId;
use crate::pricing::{FetchError, PriceFetcher};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::Instant;

/// Fetcher answering from a table of canned results.
///
/// Products without an entry answer `UpstreamBadStatus(404)`.
#[derive(Default)]
pub struct StubPriceFetcher {
    responses: Mutex<HashMap<ProductId, Result<f64, FetchError>>>,
    calls: Mutex<HashMap<ProductId, usize>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl StubPriceFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(self, product_id: ProductId, price: f64) -> Self {
        self.set_price(product_id, price);
        self
    }

    pub fn with_error(self, product_id: ProductId, error: FetchError) -> Self {
        self.set_error(product_id, error);
        self
    }

    pub fn set_price(&self, product_id: ProductId, price: f64) {
        self.responses.lock().insert(product_id, Ok(price));
    }

    pub fn set_error(&self, product_id: ProductId, error: FetchError) {
        self.responses.lock().insert(product_id, Err(error));
    }

    /// Number of fetches started for `product_id`.
    pub fn calls(&self, product_id: ProductId) -> usize {
        self.calls.lock().get(&product_id).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    /// Parks every fetch started from now on until the returned gate is released.
    ///
    /// Calls are counted before parking.
    pub fn hold(&self) -> FetchGate {
        let semaphore = Arc::new(Semaphore::new(0));
        *self.gate.lock() = Some(semaphore.clone());
        FetchGate(semaphore)
    }
}

/// Handle returned by [`StubPriceFetcher::hold`]. Releasing or dropping it opens the gate.
pub struct FetchGate(Arc<Semaphore>);

impl FetchGate {
    pub fn release(self) {}
}

impl Drop for FetchGate {
    fn drop(&mut self) {
        // A closed semaphore fails every pending and future acquire, which is
        // exactly "let everyone through".
        self.0.close();
    }
}

#[async_trait]
impl PriceFetcher for StubPriceFetcher {
    async fn fetch(&self, product_id: ProductId, _deadline: Instant) -> Result<f64, FetchError> {
        *self.calls.lock().entry(product_id).or_insert(0) += 1;

        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            let _ = gate.acquire().await;
        }

        self.responses
            .lock()
            .get(&product_id)
            .cloned()
            .unwrap_or(Err(FetchError::UpstreamBadStatus(404)))
    }
}
