//! Error types for the codelore retrieval engine.

mod bridge;
mod retrieval;

pub use bridge::*;
pub use retrieval::*;
