//! Price resolution: the upstream [`PriceFetcher`] and the stale-while-revalidate
//! [`PriceCache`] in front of it.

pub mod cache;
pub mod error;
pub mod fetcher;
pub mod mock;

pub use cache::*;
pub use error::*;
pub use fetcher::*;
