//! Canonical retrieval result types.
//!
//! Both retrieval paths (vector similarity and knowledge graph) normalize
//! their backend-specific responses into [`SearchHit`] before fusion, so the
//! merge step never sees raw backend shapes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Locator assigned when a backend record carries no origin information.
pub const UNKNOWN_LOCATOR: &str = "unknown";

/// A single normalized retrieval result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Extracted text of the matched item.
    pub content: String,

    /// Where the content originates: a file path or a graph node reference.
    /// Part of the dedup key during fusion.
    pub locator: String,

    /// Relevance score. Higher is more relevant; nominally in [0, 1] but may
    /// exceed 1.0 after the semantic boost is applied.
    pub score: f32,

    /// Backend-specific provenance (labels, source tag, chunk position).
    #[serde(default)]
    pub metadata: HashMap<String, Value>,

    /// Ordinal position within the source document. 0 when the backend has
    /// no notion of chunking.
    #[serde(default)]
    pub chunk_index: u32,

    /// Coarse category of the matched unit, e.g. "text", "function",
    /// "graph_entity".
    pub chunk_type: String,
}

impl SearchHit {
    pub fn new(content: impl Into<String>, locator: impl Into<String>, score: f32) -> Self {
        Self {
            content: content.into(),
            locator: locator.into(),
            score,
            metadata: HashMap::new(),
            chunk_index: 0,
            chunk_type: "text".to_string(),
        }
    }

    pub fn with_chunk(mut self, index: u32, chunk_type: impl Into<String>) -> Self {
        self.chunk_index = index;
        self.chunk_type = chunk_type.into();
        self
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Dedup key shared by all retrieval paths.
    pub fn key(&self) -> (String, u32) {
        (self.locator.clone(), self.chunk_index)
    }
}

/// Options accepted by similarity and hybrid searches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Maximum number of results returned.
    pub limit: usize,

    /// Target collection. `None` selects the configured default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,

    /// Minimum score a hit must reach to be kept.
    pub threshold: f32,

    /// Whether backend metadata is retained on each hit.
    pub include_metadata: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            collection: None,
            threshold: 0.7,
            include_metadata: true,
        }
    }
}

impl SearchOptions {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn without_metadata(mut self) -> Self {
        self.include_metadata = false;
        self
    }
}

#[cfg(test)]
#[path = "retrieval_tests.rs"]
mod tests;
