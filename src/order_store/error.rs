//! Error types for the order store.

use thiserror::Error;

/// Errors that can occur while persisting or querying orders.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// The store refused the row.
    #[error("Order rejected by store: {0}")]
    Rejected(String),

    /// The store could not be reached or stopped answering.
    #[error("Order store unavailable: {0}")]
    Unavailable(String),
}
