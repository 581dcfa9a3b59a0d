//! Service configuration, loaded from environment variables.
//!
//! | Variable                   | Default                       |
//! |----------------------------|-------------------------------|
//! | `PRODUCT_BASE_URL`         | `http://product-service:3000` |
//! | `PRICE_FETCH_TIMEOUT_MS`   | `2500`                        |
//! | `PRICE_TTL_SECS`           | `25`                          |
//! | `PRICE_TTL_JITTER_SECS`    | `10`                          |
//! | `ORDER_REQUEST_TIMEOUT_MS` | `2500`                        |
//! | `ORDERS_LIST_TTL_SECS`     | `60`                          |
//! | `ORDER_CREATED_TOPIC`      | `order.created`               |
//! | `STORE_BUFFER`             | `32`                          |
//! | `EVENT_BUS_CAPACITY`       | `256`                         |
//!
//! Unset and empty variables fall back to the default. A value that is set but
//! does not parse is an error rather than a silent default.

use crate::model::ORDER_CREATED_TOPIC;
use crate::pipeline::PipelineSettings;
use crate::pricing::PriceCacheConfig;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a non-negative integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Product service root URL
    pub product_base_url: String,
    /// Deadline of each background price refresh
    pub price_fetch_timeout: Duration,
    /// Minimum lifetime of a cached price
    pub price_ttl: Duration,
    /// Upper bound of the random extra lifetime of a cached price
    pub price_ttl_jitter: Duration,
    /// Budget of one create-order request
    pub order_request_timeout: Duration,
    /// Lifetime of a cached order listing
    pub orders_list_ttl: Duration,
    pub order_created_topic: String,
    /// Mailbox size of the order store actor
    pub store_buffer: usize,
    /// How far a slow event subscriber may fall behind
    pub event_bus_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            product_base_url: "http://product-service:3000".to_string(),
            price_fetch_timeout: Duration::from_millis(2500),
            price_ttl: Duration::from_secs(25),
            price_ttl_jitter: Duration::from_secs(10),
            order_request_timeout: Duration::from_millis(2500),
            orders_list_ttl: Duration::from_secs(60),
            order_created_topic: ORDER_CREATED_TOPIC.to_string(),
            store_buffer: 32,
            event_bus_capacity: 256,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from any name → value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Ok(Self {
            product_base_url: var("PRODUCT_BASE_URL").unwrap_or(defaults.product_base_url),
            price_fetch_timeout: match var("PRICE_FETCH_TIMEOUT_MS") {
                Some(value) => Duration::from_millis(positive("PRICE_FETCH_TIMEOUT_MS", &value)?),
                None => defaults.price_fetch_timeout,
            },
            price_ttl: match var("PRICE_TTL_SECS") {
                Some(value) => Duration::from_secs(number("PRICE_TTL_SECS", &value)?),
                None => defaults.price_ttl,
            },
            price_ttl_jitter: match var("PRICE_TTL_JITTER_SECS") {
                Some(value) => Duration::from_secs(number("PRICE_TTL_JITTER_SECS", &value)?),
                None => defaults.price_ttl_jitter,
            },
            order_request_timeout: match var("ORDER_REQUEST_TIMEOUT_MS") {
                Some(value) => {
                    Duration::from_millis(positive("ORDER_REQUEST_TIMEOUT_MS", &value)?)
                }
                None => defaults.order_request_timeout,
            },
            orders_list_ttl: match var("ORDERS_LIST_TTL_SECS") {
                Some(value) => Duration::from_secs(number("ORDERS_LIST_TTL_SECS", &value)?),
                None => defaults.orders_list_ttl,
            },
            order_created_topic: var("ORDER_CREATED_TOPIC").unwrap_or(defaults.order_created_topic),
            store_buffer: match var("STORE_BUFFER") {
                Some(value) => as_usize("STORE_BUFFER", positive("STORE_BUFFER", &value)?)?,
                None => defaults.store_buffer,
            },
            event_bus_capacity: match var("EVENT_BUS_CAPACITY") {
                Some(value) => {
                    as_usize("EVENT_BUS_CAPACITY", positive("EVENT_BUS_CAPACITY", &value)?)?
                }
                None => defaults.event_bus_capacity,
            },
        })
    }

    pub fn price_cache_config(&self) -> PriceCacheConfig {
        PriceCacheConfig {
            ttl_floor: self.price_ttl,
            ttl_jitter: self.price_ttl_jitter,
            refresh_timeout: self.price_fetch_timeout,
        }
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            request_timeout: self.order_request_timeout,
            list_cache_ttl: self.orders_list_ttl,
            order_created_topic: self.order_created_topic.clone(),
        }
    }
}

fn number(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber {
            name,
            value: value.to_string(),
        })
}

fn positive(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    match number(name, value)? {
        0 => Err(ConfigError::Zero { name }),
        n => Ok(n),
    }
}

fn as_usize(name: &'static str, value: u64) -> Result<usize, ConfigError> {
    usize::try_from(value).map_err(|_| ConfigError::InvalidNumber {
        name,
        value: value.to_string(),
    })
}
