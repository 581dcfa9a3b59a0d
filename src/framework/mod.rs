//! Generic actor framework backing the in-process stores.
//!
//! This module provides the building blocks for append-only, actor-owned resource
//! collections: create an entity, list entities by filter.
//!
//! # Main Components
//!
//! - [`ActorEntity`] - Trait that resource types implement to be managed by actors
//! - [`ResourceActor`] - Generic actor that owns entities
//! - [`ResourceClient`] - Typed, cloneable handle to a running actor
//! - [`FrameworkError`] - Common error types
//!
//! # Testing
//!
//! See [`mock`] module for utilities to test clients without spawning full actors.

pub mod core;
pub mod mock;

// Re-export core types for convenience
pub use self::core::*;
