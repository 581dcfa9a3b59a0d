//! Error types for price fetching.

use thiserror::Error;

/// Why a single upstream price lookup failed.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    /// Transport or connection failure, including running out of time.
    #[error("Product service unreachable: {0}")]
    UpstreamUnreachable(String),

    /// The product service answered with anything other than 200.
    #[error("Product service returned status {0}")]
    UpstreamBadStatus(u16),

    /// The body did not decode into a price for the requested product.
    #[error("Malformed product response: {0}")]
    MalformedResponse(String),
}
