//! # Price Cache
//!
//! In-process product price cache with stale-while-revalidate semantics.
//!
//! Every lookup lands in one of three cases:
//!
//! | Case     | Condition              | Caller sees            | Side effect                          |
//! |----------|------------------------|------------------------|--------------------------------------|
//! | Hit      | `now < expires_at`     | cached price           | none                                 |
//! | Stale    | `now >= expires_at`    | cached price           | one background refresh per product   |
//! | Cold     | no entry               | fetched price or error | entry installed on success only      |
//!
//! ## Single-flight refresh
//!
//! The set of products with a refresh in flight lives under the same lock as the
//! entries. The stale decision and the insert into that set happen under one
//! write lock, so concurrent callers on the same stale entry start exactly one
//! refresh. The refresh task owns a [`RefreshGuard`] which removes the product
//! from the set when the task ends, whether it succeeded, failed, panicked or was
//! dropped by a shutting-down runtime.
//!
//! ## Expiry jitter
//!
//! Each installed entry lives `ttl_floor + U[0, ttl_jitter]` so that entries
//! fetched together do not all expire together.

use crate::model::ProductId;
use crate::pricing::{FetchError, PriceFetcher};
use parking_lot::RwLock;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info_span, instrument, warn, Instrument};

/// One cached price. Replaced wholesale, never edited.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceCacheEntry {
    pub price: f64,
    pub expires_at: Instant,
}

impl PriceCacheEntry {
    pub fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Tuning for [`PriceCache`].
#[derive(Debug, Clone, PartialEq)]
pub struct PriceCacheConfig {
    /// Minimum lifetime of an entry.
    pub ttl_floor: Duration,
    /// Upper bound of the random extra lifetime.
    pub ttl_jitter: Duration,
    /// Deadline given to each background refresh.
    pub refresh_timeout: Duration,
}

impl Default for PriceCacheConfig {
    fn default() -> Self {
        Self {
            ttl_floor: Duration::from_secs(25),
            ttl_jitter: Duration::from_secs(10),
            refresh_timeout: Duration::from_millis(2500),
        }
    }
}

impl PriceCacheConfig {
    /// Draws a lifetime uniformly from `[ttl_floor, ttl_floor + ttl_jitter]`.
    pub fn ttl(&self) -> Duration {
        let jitter_ms = u64::try_from(self.ttl_jitter.as_millis()).unwrap_or(u64::MAX);
        let extra = rand::thread_rng().gen_range(0..=jitter_ms);
        self.ttl_floor + Duration::from_millis(extra)
    }
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<ProductId, PriceCacheEntry>,
    refreshing: HashSet<ProductId>,
}

struct Shared {
    state: RwLock<CacheState>,
    fetcher: Arc<dyn PriceFetcher>,
    config: PriceCacheConfig,
}

/// Outcome of classifying a lookup against the current state.
enum Lookup {
    Fresh(f64),
    Stale { price: f64, start_refresh: bool },
    Miss,
}

/// Cheaply cloneable handle to a shared price cache.
#[derive(Clone)]
pub struct PriceCache {
    shared: Arc<Shared>,
}

impl PriceCache {
    pub fn new(fetcher: Arc<dyn PriceFetcher>, config: PriceCacheConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(CacheState::default()),
                fetcher,
                config,
            }),
        }
    }

    /// Returns the believed current price of `product_id`.
    ///
    /// Only a cold miss waits on the fetcher, bounded by `deadline`. Its error is
    /// returned as is and nothing is cached for it.
    #[instrument(skip(self, deadline), fields(product_id = %product_id))]
    pub async fn resolve(&self, product_id: ProductId, deadline: Instant) -> Result<f64, FetchError> {
        match self.lookup(product_id, Instant::now()) {
            Lookup::Fresh(price) => {
                debug!(price, "Price cache hit");
                Ok(price)
            }
            Lookup::Stale { price, start_refresh } => {
                debug!(price, start_refresh, "Serving stale price");
                if start_refresh {
                    self.spawn_refresh(product_id);
                }
                Ok(price)
            }
            Lookup::Miss => {
                debug!("Price cache miss");
                let price = self.shared.fetcher.fetch(product_id, deadline).await?;
                self.install(product_id, price);
                Ok(price)
            }
        }
    }

    /// Current entry for `product_id`, fresh or not.
    pub fn entry(&self, product_id: ProductId) -> Option<PriceCacheEntry> {
        self.shared.state.read().entries.get(&product_id).copied()
    }

    pub fn is_refreshing(&self, product_id: ProductId) -> bool {
        self.shared.state.read().refreshing.contains(&product_id)
    }

    pub fn len(&self) -> usize {
        self.shared.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, product_id: ProductId, now: Instant) -> Lookup {
        {
            let state = self.shared.state.read();
            match state.entries.get(&product_id) {
                Some(entry) if entry.is_fresh(now) => return Lookup::Fresh(entry.price),
                Some(entry) if state.refreshing.contains(&product_id) => {
                    return Lookup::Stale {
                        price: entry.price,
                        start_refresh: false,
                    }
                }
                None => return Lookup::Miss,
                Some(_) => {}
            }
        }

        // Stale with no refresh in flight. Re-check under the write lock: a
        // refresh may have landed in between, and the claim must be atomic
        // with the stale decision.
        let mut guard = self.shared.state.write();
        let state = &mut *guard;
        match state.entries.get(&product_id) {
            Some(entry) if entry.is_fresh(now) => Lookup::Fresh(entry.price),
            Some(entry) => Lookup::Stale {
                price: entry.price,
                start_refresh: state.refreshing.insert(product_id),
            },
            None => Lookup::Miss,
        }
    }

    fn install(&self, product_id: ProductId, price: f64) -> PriceCacheEntry {
        let entry = PriceCacheEntry {
            price,
            expires_at: Instant::now() + self.shared.config.ttl(),
        };
        self.shared.state.write().entries.insert(product_id, entry);
        entry
    }

    /// Caller must already hold the in-flight claim for `product_id`.
    fn spawn_refresh(&self, product_id: ProductId) {
        let guard = RefreshGuard {
            shared: self.shared.clone(),
            product_id,
        };
        let cache = self.clone();

        tokio::spawn(
            async move {
                let _guard = guard;
                let deadline = Instant::now() + cache.shared.config.refresh_timeout;
                match cache.shared.fetcher.fetch(product_id, deadline).await {
                    Ok(price) => {
                        let entry = cache.install(product_id, price);
                        debug!(price = entry.price, "Price refreshed");
                    }
                    Err(e) => {
                        warn!(error = %e, "Price refresh failed, keeping stale entry");
                    }
                }
            }
            .instrument(info_span!("price_refresh", %product_id)),
        );
    }
}

/// Releases a product's in-flight claim when dropped.
struct RefreshGuard {
    shared: Arc<Shared>,
    product_id: ProductId,
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        self.shared.state.write().refreshing.remove(&self.product_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::mock::StubPriceFetcher;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const P: ProductId = ProductId(7);

    fn deadline() -> Instant {
        Instant::now() + Duration::from_secs(2)
    }

    fn always_stale() -> PriceCacheConfig {
        PriceCacheConfig {
            ttl_floor: Duration::ZERO,
            ttl_jitter: Duration::ZERO,
            ..PriceCacheConfig::default()
        }
    }

    async fn wait_for_refresh(cache: &PriceCache, product_id: ProductId) {
        for _ in 0..10_000 {
            if !cache.is_refreshing(product_id) {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("refresh for product {product_id} never finished");
    }

    #[test]
    fn test_ttl_stays_inside_jitter_window() {
        let config = PriceCacheConfig::default();
        for _ in 0..1_000 {
            let ttl = config.ttl();
            assert!(ttl >= Duration::from_secs(25), "ttl {ttl:?} below floor");
            assert!(ttl <= Duration::from_secs(35), "ttl {ttl:?} above window");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hits_before_expiry_do_not_call_upstream() {
        let fetcher = Arc::new(StubPriceFetcher::new().with_price(P, 12.5));
        let cache = PriceCache::new(fetcher.clone(), PriceCacheConfig::default());

        assert_eq!(cache.resolve(P, deadline()).await, Ok(12.5));
        assert_eq!(fetcher.calls(P), 1);

        tokio::time::advance(Duration::from_secs(20)).await;
        for _ in 0..5 {
            assert_eq!(cache.resolve(P, deadline()).await, Ok(12.5));
        }
        assert_eq!(fetcher.calls(P), 1);
        assert!(!cache.is_refreshing(P));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cold_miss_installs_entry_with_jittered_expiry() {
        let fetcher = Arc::new(StubPriceFetcher::new().with_price(P, 4.0));
        let cache = PriceCache::new(fetcher, PriceCacheConfig::default());
        let started = Instant::now();

        cache.resolve(P, deadline()).await.unwrap();

        let entry = cache.entry(P).expect("entry installed");
        assert_eq!(entry.price, 4.0);
        let ttl = entry.expires_at - started;
        assert!(ttl >= Duration::from_secs(25) && ttl <= Duration::from_secs(35));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_cold_fetch_is_not_cached() {
        let fetcher = Arc::new(
            StubPriceFetcher::new()
                .with_error(P, FetchError::UpstreamUnreachable("connection refused".into())),
        );
        let cache = PriceCache::new(fetcher.clone(), PriceCacheConfig::default());

        let first = cache.resolve(P, deadline()).await;
        assert!(matches!(first, Err(FetchError::UpstreamUnreachable(_))));
        assert!(cache.entry(P).is_none());
        assert!(cache.is_empty());

        fetcher.set_price(P, 9.0);
        assert_eq!(cache.resolve(P, deadline()).await, Ok(9.0));
        assert_eq!(fetcher.calls(P), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_entry_is_served_then_refreshed() {
        let fetcher = Arc::new(StubPriceFetcher::new().with_price(P, 10.0));
        let cache = PriceCache::new(fetcher.clone(), PriceCacheConfig::default());

        cache.resolve(P, deadline()).await.unwrap();
        let first = cache.entry(P).unwrap();

        fetcher.set_price(P, 11.0);
        tokio::time::advance(Duration::from_secs(36)).await;
        let refresh_started = Instant::now();

        assert_eq!(cache.resolve(P, deadline()).await, Ok(10.0));
        assert!(cache.is_refreshing(P));

        wait_for_refresh(&cache, P).await;
        assert_eq!(fetcher.calls(P), 2);

        let refreshed = cache.entry(P).unwrap();
        assert_eq!(refreshed.price, 11.0);
        assert!(refreshed.expires_at > first.expires_at);
        let ttl = refreshed.expires_at - refresh_started;
        assert!(ttl >= Duration::from_secs(25) && ttl <= Duration::from_secs(35));

        assert_eq!(cache.resolve(P, deadline()).await, Ok(11.0));
        assert_eq!(fetcher.calls(P), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_keeps_stale_entry_and_retries_later() {
        let fetcher = Arc::new(StubPriceFetcher::new().with_price(P, 5.0));
        let cache = PriceCache::new(fetcher.clone(), PriceCacheConfig::default());

        cache.resolve(P, deadline()).await.unwrap();
        let original = cache.entry(P).unwrap();

        fetcher.set_error(P, FetchError::UpstreamBadStatus(500));
        tokio::time::advance(Duration::from_secs(40)).await;

        assert_eq!(cache.resolve(P, deadline()).await, Ok(5.0));
        wait_for_refresh(&cache, P).await;
        assert_eq!(cache.entry(P), Some(original));

        assert_eq!(cache.resolve(P, deadline()).await, Ok(5.0));
        wait_for_refresh(&cache, P).await;
        assert_eq!(fetcher.calls(P), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_stale_reads_start_one_refresh() {
        let fetcher = Arc::new(StubPriceFetcher::new().with_price(P, 1.0));
        let cache = PriceCache::new(fetcher.clone(), always_stale());
        cache.resolve(P, deadline()).await.unwrap();

        fetcher.set_price(P, 2.0);
        let gate = fetcher.hold();

        let barrier = Arc::new(tokio::sync::Barrier::new(16));
        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = cache.clone();
            let barrier = barrier.clone();
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                cache.resolve(P, deadline()).await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok(1.0));
        }
        assert!(cache.is_refreshing(P));

        gate.release();
        for _ in 0..2_000 {
            if !cache.is_refreshing(P) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        assert!(!cache.is_refreshing(P));
        assert_eq!(fetcher.calls(P), 2, "one cold fetch plus exactly one refresh");
        assert_eq!(cache.entry(P).unwrap().price, 2.0);
    }

    #[test]
    fn test_stale_read_during_refresh_needs_only_the_read_lock() {
        let cache = PriceCache::new(Arc::new(StubPriceFetcher::new()), always_stale());
        cache.install(P, 1.0);
        cache.shared.state.write().refreshing.insert(P);

        // A held read lock blocks every writer.
        let read = cache.shared.state.read();
        let (tx, rx) = std::sync::mpsc::channel();
        let reader = {
            let cache = cache.clone();
            std::thread::spawn(move || {
                let seen = match cache.lookup(P, Instant::now()) {
                    Lookup::Stale { price, start_refresh } => Some((price, start_refresh)),
                    _ => None,
                };
                let _ = tx.send(seen);
            })
        };

        let seen = rx.recv_timeout(std::time::Duration::from_secs(1));
        drop(read);
        reader.join().unwrap();
        assert_eq!(seen, Ok(Some((1.0, false))));
    }

    struct PanickingFetcher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PriceFetcher for PanickingFetcher {
        async fn fetch(&self, _product_id: ProductId, _deadline: Instant) -> Result<f64, FetchError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(3.0)
            } else {
                panic!("upstream client bug");
            }
        }
    }

    #[tokio::test]
    async fn test_panicking_refresh_releases_in_flight_claim() {
        let fetcher = Arc::new(PanickingFetcher { calls: AtomicUsize::new(0) });
        let cache = PriceCache::new(fetcher.clone(), always_stale());

        assert_eq!(cache.resolve(P, deadline()).await, Ok(3.0));
        assert_eq!(cache.resolve(P, deadline()).await, Ok(3.0));
        wait_for_refresh(&cache, P).await;

        assert_eq!(cache.entry(P).unwrap().price, 3.0);
        assert_eq!(cache.resolve(P, deadline()).await, Ok(3.0));
        wait_for_refresh(&cache, P).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
    }
}
