//! Configuration schema.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Conventional name of the vector backend entry.
pub const VECTOR_BACKEND: &str = "vector";
/// Conventional name of the graph backend entry.
pub const GRAPH_BACKEND: &str = "graph";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend launch descriptors, keyed by backend name.
    #[serde(default)]
    pub backends: HashMap<String, BackendConfig>,

    /// Retrieval defaults.
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl Config {
    /// Look up a backend descriptor by name.
    pub fn backend(&self, name: &str) -> Result<&BackendConfig, ConfigError> {
        self.backends
            .get(name)
            .ok_or_else(|| ConfigError::MissingBackend(name.to_string()))
    }
}

/// Launch descriptor for one backend process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Executable to launch.
    pub command: String,

    /// Arguments passed to the executable.
    #[serde(default)]
    pub args: Vec<String>,

    /// Environment overlay applied on top of the parent environment.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

/// Retrieval defaults applied when a search names no explicit option.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Vector collection queried when a search names none.
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Embedding service identifier forwarded to the vector backend.
    #[serde(default = "default_embedding_service")]
    pub embedding_service: String,

    /// Maximum number of results.
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Minimum similarity score a hit must reach.
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// Result bound for graph enrichment.
    #[serde(default = "default_graph_limit")]
    pub graph_limit: usize,

    /// Traversal depth for graph enrichment.
    #[serde(default = "default_graph_depth")]
    pub graph_depth: u32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            embedding_service: default_embedding_service(),
            limit: default_limit(),
            threshold: default_threshold(),
            graph_limit: default_graph_limit(),
            graph_depth: default_graph_depth(),
        }
    }
}

fn default_collection() -> String {
    "codebase".to_string()
}

fn default_embedding_service() -> String {
    "default".to_string()
}

fn default_limit() -> usize {
    10
}

fn default_threshold() -> f32 {
    0.7
}

fn default_graph_limit() -> usize {
    5
}

fn default_graph_depth() -> u32 {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieval_defaults() {
        let retrieval = RetrievalConfig::default();
        assert_eq!(retrieval.collection, "codebase");
        assert_eq!(retrieval.embedding_service, "default");
        assert_eq!(retrieval.limit, 10);
        assert!((retrieval.threshold - 0.7).abs() < f32::EPSILON);
        assert_eq!(retrieval.graph_limit, 5);
        assert_eq!(retrieval.graph_depth, 2);
    }

    #[test]
    fn test_backend_lookup() {
        let mut config = Config::default();
        config.backends.insert(
            VECTOR_BACKEND.to_string(),
            BackendConfig {
                command: "npx".to_string(),
                args: vec!["-y".to_string(), "vector-server".to_string()],
                env: HashMap::new(),
            },
        );

        assert_eq!(config.backend(VECTOR_BACKEND).unwrap().command, "npx");
        assert!(matches!(
            config.backend(GRAPH_BACKEND),
            Err(ConfigError::MissingBackend(name)) if name == "graph"
        ));
    }
}
