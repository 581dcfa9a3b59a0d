//! # Observability & Tracing
//!
//! The [`setup_tracing`] function initializes structured logging with the `tracing` crate.
//!
//! The subscriber uses a compact format that hides the crate/module prefix
//! (`with_target(false)`) and shows spans inline, e.g.
//! `create_order{product_id=7 qty=3}: Order created`.
//!
//! ## Levels
//!
//! - `debug`: price cache hit / stale / miss, listing cache hit / miss, store operations
//! - `info`: order created, consumer acknowledgements, actor lifecycle
//! - `warn`: swallowed side-effect failures (publish, invalidate), failed refreshes,
//!   rejected events
//! - `error`: insert failures, panicked tasks
//!
//! ## Usage Examples
//!
//! ```bash
//! # Compact logs (default)
//! RUST_LOG=info order-service 7 3
//!
//! # Cache decisions and store traffic
//! RUST_LOG=debug order-service 7 3
//!
//! # Only the price cache
//! RUST_LOG=order_service::pricing=debug order-service 7 3
//! ```
//!
//! ## Workflow Trace Example
//!
//! **With `RUST_LOG=debug`**, a cold order followed by the consumer picking it up:
//!
//! ```text
//! DEBUG create_order{product_id=7 qty=3}:resolve{product_id=7}: Price cache miss
//! DEBUG create_order{product_id=7 qty=3}:resolve{product_id=7}:fetch{product_id=7}: Fetched price price=12.5
//! DEBUG create_order{product_id=7 qty=3}:insert_order{product_id=7}: insert_order called order=NewOrder { .. }
//! INFO Created entity_type="Order" id=1 size=1
//! INFO create_order{product_id=7 qty=3}: Order created order_id=1 price=12.5 total_price=37.5
//! INFO order.created received order_id=1 product_id=7 qty=3 total_price=37.5
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
