//! # Order Service
//!
//! > **Order ingestion behind a stale-while-revalidate price cache.**
//!
//! A create-order request is validated, priced, persisted, announced on the
//! `order.created` topic, and the product's cached order listing is invalidated.
//! Pricing goes through an in-process cache so that a slow or failing product
//! service only ever costs the first request for a product.
//!
//! ## 🏗️ Design Notes
//!
//! ### 1. Stale-While-Revalidate, Single-Flight
//! An expired price is still served. The first caller to see it starts one
//! background refresh; every other caller keeps getting the old price until the
//! refresh lands. Only a product with no entry at all makes the caller wait.
//! See [`pricing::cache`].
//!
//! ### 2. Commit Point
//! Once the order row is inserted the request succeeds. Publishing the event and
//! invalidating the listing are best effort: their failures are logged, never
//! returned, and never compensated.
//!
//! ### 3. Actor-Backed Store
//! Orders live in a generic `ResourceActor<T>`: one Tokio task owning the state,
//! driven by messages over mpsc + oneshot. No locks around the data.
//!
//! ### 4. Type-Safe Error Handling
//! Every module has its own `thiserror` enum. The pipeline folds them into the
//! four terminal [`OrderError`](pipeline::OrderError) kinds API consumers see.
//!
//! ### 5. Observability
//! `tracing` everywhere with structured fields. See [`lifecycle::tracing`].
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Pipeline ([`pipeline`])
//! - **Role**: The request path. Validate → price → total → insert → publish → invalidate.
//! - **Key items**: [`OrderPipeline`](pipeline::OrderPipeline), [`OrderError`](pipeline::OrderError).
//!
//! ### 2. Pricing ([`pricing`])
//! - **Role**: [`PriceCache`](pricing::PriceCache) over a [`PriceFetcher`](pricing::PriceFetcher);
//!   [`HttpPriceFetcher`](pricing::HttpPriceFetcher) talks to the product service.
//!
//! ### 3. Storage ([`order_store`], [`clients`], [`framework`])
//! - **Role**: [`OrderStore`](order_store::OrderStore) contract, implemented by
//!   [`OrderStoreClient`](clients::OrderStoreClient) on top of the generic actor engine.
//!
//! ### 4. Side Effects ([`events`], [`list_cache`])
//! - **Role**: The event bus and its `order.created` consumer; the TTL listing cache.
//!
//! ### 5. The Orchestrator ([`lifecycle`])
//! - **Role**: Configuration, wiring and graceful shutdown.
//! - **Key items**: [`Config`](lifecycle::Config), [`OrderSystem`](lifecycle::OrderSystem).
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Create 3 units of product 7 against the configured product service
//! PRODUCT_BASE_URL=http://localhost:3000 RUST_LOG=info cargo run -- 7 3
//!
//! cargo test
//! ```

pub mod clients;
pub mod events;
pub mod framework;
pub mod lifecycle;
pub mod list_cache;
pub mod model;
pub mod order_store;
pub mod pipeline;
pub mod pricing;
