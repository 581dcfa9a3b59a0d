//! Error types for the order pipeline.

use crate::events::EventError;
use crate::list_cache::CacheError;
use crate::pricing::FetchError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Terminal failures of an order request. Nothing was persisted when one of
/// these is returned.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// Bad input; no I/O was attempted.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The product could not be priced (unreachable upstream or non-success status).
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// The product service answered with an unusable payload.
    #[error("Product invalid: {0}")]
    ProductInvalid(String),

    /// The store rejected or failed the operation.
    #[error("Persistence error: {0}")]
    PersistenceError(String),
}

impl From<FetchError> for OrderError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::UpstreamUnreachable(_) | FetchError::UpstreamBadStatus(_) => {
                OrderError::ProductNotFound(e.to_string())
            }
            FetchError::MalformedResponse(_) => OrderError::ProductInvalid(e.to_string()),
        }
    }
}

impl OrderError {
    /// Machine-readable code exposed to API consumers.
    pub fn code(&self) -> &'static str {
        match self {
            OrderError::InvalidRequest(_) => "BAD_REQUEST",
            OrderError::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            OrderError::ProductInvalid(_) => "PRODUCT_INVALID",
            OrderError::PersistenceError(_) => "DB_ERROR",
        }
    }

    /// Renders the error for API consumers.
    ///
    /// Upstream and store internals stay in the logs; only input validation
    /// failures carry a diagnostic.
    pub fn envelope(&self) -> ErrorEnvelope {
        let (message, details) = match self {
            OrderError::InvalidRequest(reason) => {
                ("invalid productId/qty (must be > 0)", Some(reason.clone()))
            }
            OrderError::ProductNotFound(_) => ("unable to validate product", None),
            OrderError::ProductInvalid(_) => ("invalid product response", None),
            OrderError::PersistenceError(_) => ("failed to persist order", None),
        };
        ErrorEnvelope {
            error: ApiError {
                code: self.code().to_string(),
                message: message.to_string(),
                details,
            },
        }
    }
}

/// Non-fatal failures after the order is committed. Logged, never returned.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SideEffectError {
    #[error("Publish failed: {0}")]
    PublishFailed(String),

    #[error("List cache invalidation failed: {0}")]
    InvalidateFailed(String),
}

impl From<EventError> for SideEffectError {
    fn from(e: EventError) -> Self {
        SideEffectError::PublishFailed(e.to_string())
    }
}

impl From<CacheError> for SideEffectError {
    fn from(e: CacheError) -> Self {
        SideEffectError::InvalidateFailed(e.to_string())
    }
}

/// `{"error": {"code": ..., "message": ..., "details"?: ...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ApiError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_errors_map_to_taxonomy() {
        let unreachable = OrderError::from(FetchError::UpstreamUnreachable("refused".into()));
        assert_eq!(unreachable.code(), "PRODUCT_NOT_FOUND");

        let not_found = OrderError::from(FetchError::UpstreamBadStatus(404));
        assert_eq!(not_found.code(), "PRODUCT_NOT_FOUND");

        let malformed = OrderError::from(FetchError::MalformedResponse("missing id".into()));
        assert_eq!(malformed.code(), "PRODUCT_INVALID");
    }

    #[test]
    fn test_envelope_hides_internal_details() {
        let envelope = OrderError::PersistenceError("disk full on /var/lib".into()).envelope();
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["error"]["code"], "DB_ERROR");
        assert_eq!(json["error"]["message"], "failed to persist order");
        assert!(json["error"].get("details").is_none());
        assert!(!json.to_string().contains("disk full"));
    }

    #[test]
    fn test_invalid_request_envelope_carries_diagnostic() {
        let envelope = OrderError::InvalidRequest("qty must be > 0".into()).envelope();
        assert_eq!(envelope.error.code, "BAD_REQUEST");
        assert_eq!(envelope.error.details.as_deref(), Some("qty must be > 0"));
    }
}
