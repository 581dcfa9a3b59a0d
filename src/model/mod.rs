//! Pure data structures shared by the cache, the store and the pipeline.

pub mod event;
pub mod order;
pub mod product;

pub use event::*;
pub use order::*;
pub use product::*;
