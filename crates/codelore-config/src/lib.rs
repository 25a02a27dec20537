//! # Codelore Config
//!
//! Configuration management for the codelore retrieval engine: backend
//! launch descriptors and retrieval defaults, loaded from TOML with
//! environment-variable substitution.

mod error;
mod loader;
mod schema;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{
    BackendConfig, Config, RetrievalConfig, GRAPH_BACKEND, VECTOR_BACKEND,
};
