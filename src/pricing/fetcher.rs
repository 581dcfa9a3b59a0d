//! # Price Fetcher
//!
//! One lookup against the product service, bounded by a deadline. No retries:
//! callers decide what a failure means.

use crate::model::ProductId;
use crate::pricing::FetchError;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Resolves one product id to its current unit price.
#[async_trait]
pub trait PriceFetcher: Send + Sync {
    async fn fetch(&self, product_id: ProductId, deadline: Instant) -> Result<f64, FetchError>;
}

/// Body returned by `GET /products/{id}`. Extra fields are ignored.
#[derive(Debug, Deserialize)]
struct ProductPayload {
    #[serde(default)]
    id: i64,
    price: f64,
}

/// [`PriceFetcher`] backed by the product service's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpPriceFetcher {
    client: Client,
    base_url: String,
}

impl HttpPriceFetcher {
    /// # Arguments
    /// * `base_url` - Product service root, e.g. `http://product-service:3000`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Reuses an existing connection pool.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn product_url(&self, product_id: ProductId) -> String {
        format!("{}/products/{}", self.base_url, product_id)
    }
}

#[async_trait]
impl PriceFetcher for HttpPriceFetcher {
    #[instrument(skip(self, deadline), fields(product_id = %product_id))]
    async fn fetch(&self, product_id: ProductId, deadline: Instant) -> Result<f64, FetchError> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(FetchError::UpstreamUnreachable(
                "deadline elapsed before request".to_string(),
            ));
        }

        let response = self
            .client
            .get(self.product_url(product_id))
            .header(ACCEPT, "application/json")
            .timeout(remaining)
            .send()
            .await
            .map_err(|e| FetchError::UpstreamUnreachable(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!(status = status.as_u16(), "Upstream rejected lookup");
            return Err(FetchError::UpstreamBadStatus(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::UpstreamUnreachable(e.to_string()))?;
        let payload: ProductPayload = serde_json::from_slice(&body)
            .map_err(|e| FetchError::MalformedResponse(e.to_string()))?;

        validate(product_id, payload)
    }
}

/// A payload is only usable when it names the requested product and carries a
/// non-negative price.
fn validate(product_id: ProductId, payload: ProductPayload) -> Result<f64, FetchError> {
    if payload.id == 0 {
        return Err(FetchError::MalformedResponse("missing product id".to_string()));
    }
    if payload.id != product_id.0 {
        return Err(FetchError::MalformedResponse(format!(
            "asked for product {}, got {}",
            product_id, payload.id
        )));
    }
    if !payload.price.is_finite() || payload.price < 0.0 {
        return Err(FetchError::MalformedResponse(format!(
            "invalid price {}",
            payload.price
        )));
    }
    debug!(price = payload.price, "Fetched price");
    Ok(payload.price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_matching_payload() {
        let payload = ProductPayload { id: 7, price: 12.5 };
        assert_eq!(validate(ProductId(7), payload), Ok(12.5));
    }

    #[test]
    fn test_validate_rejects_missing_or_foreign_id() {
        let missing = validate(ProductId(7), ProductPayload { id: 0, price: 1.0 });
        assert!(matches!(missing, Err(FetchError::MalformedResponse(msg)) if msg.contains("missing")));

        let foreign = validate(ProductId(7), ProductPayload { id: 8, price: 1.0 });
        assert!(matches!(foreign, Err(FetchError::MalformedResponse(_))));
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let result = validate(ProductId(3), ProductPayload { id: 3, price: -0.5 });
        assert!(matches!(result, Err(FetchError::MalformedResponse(_))));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let fetcher = HttpPriceFetcher::new("http://product-service:3000/");
        assert_eq!(fetcher.base_url(), "http://product-service:3000");
        assert_eq!(
            fetcher.product_url(ProductId(12)),
            "http://product-service:3000/products/12"
        );
    }

    #[tokio::test]
    async fn test_elapsed_deadline_fails_without_request() {
        let fetcher = HttpPriceFetcher::new("http://127.0.0.1:9");
        let result = fetcher.fetch(ProductId(1), Instant::now()).await;
        assert!(matches!(result, Err(FetchError::UpstreamUnreachable(_))));
    }
}
