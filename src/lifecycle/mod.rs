//! # System Lifecycle & Orchestration
//!
//! This module owns everything that happens before the first request and after
//! the last one: reading configuration, spawning the long-lived tasks, wiring
//! them into an [`OrderPipeline`](crate::pipeline::OrderPipeline), and tearing
//! them down again.
//!
//! ## Tasks
//!
//! | Task                      | Owns                          | Ends when                         |
//! |---------------------------|-------------------------------|-----------------------------------|
//! | order store actor         | `BTreeMap<OrderId, Order>`    | every `OrderStoreClient` dropped  |
//! | `order.created` consumer  | its bus subscription, stats   | every bus sender dropped          |
//! | price refresh (transient) | one product's in-flight claim | its single fetch completes        |
//!
//! ## Graceful Shutdown
//!
//! 1. **Drop the pipeline, store client and bus** - closes the sender side of every channel
//! 2. **Tasks detect closure** - `recv()` returns `None` / `Closed`
//! 3. **Await completion** - a panicked task turns into an error
//!
//! Price refreshes are detached and not awaited. Their in-flight claim is
//! released by a drop guard, so an aborted refresh leaves nothing behind.
//!
//! ## Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging for the whole service; see
//! the [`tracing`] module.

pub mod config;
pub mod order_system;
pub mod tracing;

pub use config::*;
pub use order_system::*;
pub use tracing::*;
