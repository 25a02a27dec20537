//! Similarity search against the vector backend.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use codelore_mcp::ToolClient;
use codelore_protocols::{SearchError, SearchHit, SearchOptions, UNKNOWN_LOCATOR};

use crate::extract;

/// Chunk types treated as code units by [`SemanticSearch::search_similar_code`].
const CODE_CHUNK_TYPES: &[&str] = &["function", "class", "method"];

/// Threshold for code similarity queries. Code matches are noisier than
/// prose, so the cutoff is relaxed.
const CODE_THRESHOLD: f32 = 0.6;

/// Candidate locations for each canonical field, tried in order.
const CONTENT_PATHS: &[&[&str]] = &[&["content"], &["payload", "content"]];
const LOCATOR_PATHS: &[&[&str]] = &[&["payload", "file_path"], &["metadata", "file_path"]];
const SCORE_PATHS: &[&[&str]] = &[&["score"]];
const CHUNK_INDEX_PATHS: &[&[&str]] = &[&["payload", "chunk_index"], &["metadata", "chunk_index"]];
const CHUNK_TYPE_PATHS: &[&[&str]] = &[&["payload", "chunk_type"], &["metadata", "chunk_type"]];
const METADATA_PATHS: &[&[&str]] = &[&["payload"], &["metadata"]];

/// Statistics for one vector collection. Fields are defaulted so a partial
/// backend answer still yields a value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionStats {
    pub name: String,
    pub points_count: u64,
    pub vectors_count: u64,
    pub status: String,
}

/// Similarity search over one named vector collection.
pub struct SemanticSearch {
    client: Arc<ToolClient>,
    default_collection: String,
    embedding_service: String,
}

impl SemanticSearch {
    pub fn new(
        client: Arc<ToolClient>,
        default_collection: impl Into<String>,
        embedding_service: impl Into<String>,
    ) -> Self {
        Self {
            client,
            default_collection: default_collection.into(),
            embedding_service: embedding_service.into(),
        }
    }

    /// Collection queried when a search names none.
    pub fn default_collection(&self) -> &str {
        &self.default_collection
    }

    /// Ranked similarity search for a free-text query.
    ///
    /// Backend-call failures are fatal and surface as [`SearchError`];
    /// normalization of malformed records never fails, partial records
    /// degrade to defaulted fields.
    pub async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let collection = options
            .collection
            .as_deref()
            .unwrap_or(&self.default_collection);

        let output = self
            .client
            .call_tool(
                "search",
                json!({
                    "query": query,
                    "collection": collection,
                    "embedding_service": self.embedding_service,
                    "limit": options.limit,
                }),
            )
            .await
            .map_err(|e| SearchError::new("search", query, e))?;

        let body = output.json();
        let raw = body
            .get("results")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let hits: Vec<SearchHit> = raw
            .iter()
            .map(|entry| normalize(entry, options.include_metadata))
            .filter(|hit| hit.score >= options.threshold)
            .collect();

        debug!(query, collection, results = hits.len(), "similarity search complete");
        Ok(hits)
    }

    /// Similarity search specialized for code snippets.
    ///
    /// Embeds a language hint in the query when one is given and keeps hits
    /// whose chunk type marks a code unit or whose metadata language matches.
    /// Collections without type tags would filter everything away, so an
    /// empty filter result falls back to the unfiltered ranking.
    pub async fn search_similar_code(
        &self,
        snippet: &str,
        language: Option<&str>,
        limit: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let query = match language {
            Some(lang) => format!("{lang} code: {snippet}"),
            None => snippet.to_string(),
        };

        let options = SearchOptions::default()
            .with_limit(limit)
            .with_threshold(CODE_THRESHOLD);
        let hits = self.search(&query, &options).await?;

        let filtered: Vec<SearchHit> = hits
            .iter()
            .filter(|hit| {
                CODE_CHUNK_TYPES.contains(&hit.chunk_type.as_str())
                    || language.is_some_and(|lang| {
                        hit.metadata.get("language").and_then(Value::as_str) == Some(lang)
                    })
            })
            .cloned()
            .collect();

        if filtered.is_empty() { Ok(hits) } else { Ok(filtered) }
    }

    /// Known collections on the vector backend.
    ///
    /// Listing is advisory: on failure the configured default collection is
    /// returned alone, never an error.
    pub async fn list_collections(&self) -> Vec<String> {
        match self.client.call_tool("list_collections", json!({})).await {
            Ok(output) => {
                let body = output.json();
                body.get("collections")
                    .and_then(Value::as_array)
                    .map(|collections| {
                        collections
                            .iter()
                            .filter_map(|c| c.get("name").and_then(Value::as_str))
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default()
            }
            Err(e) => {
                warn!(error = %e, "collection listing failed, using default");
                vec![self.default_collection.clone()]
            }
        }
    }

    /// Statistics for a collection.
    ///
    /// Lookup failures degrade to a defaulted record carrying only the
    /// collection name.
    pub async fn collection_stats(&self, collection: Option<&str>) -> CollectionStats {
        let name = collection.unwrap_or(&self.default_collection);

        match self
            .client
            .call_tool("collection_info", json!({ "collection": name }))
            .await
        {
            Ok(output) => {
                let body = output.json();
                CollectionStats {
                    name: name.to_string(),
                    points_count: extract::first_u64(&body, &[&["points_count"]]).unwrap_or(0),
                    vectors_count: extract::first_u64(&body, &[&["vectors_count"]]).unwrap_or(0),
                    status: extract::first_str(&body, &[&["status"]]).unwrap_or_default(),
                }
            }
            Err(e) => {
                warn!(collection = name, error = %e, "collection stats unavailable");
                CollectionStats {
                    name: name.to_string(),
                    ..CollectionStats::default()
                }
            }
        }
    }
}

/// Normalize one raw backend record into the canonical shape.
fn normalize(entry: &Value, include_metadata: bool) -> SearchHit {
    let content = extract::first_str(entry, CONTENT_PATHS).unwrap_or_default();
    let locator = extract::first_str(entry, LOCATOR_PATHS)
        .unwrap_or_else(|| UNKNOWN_LOCATOR.to_string());
    let score = extract::first_f32(entry, SCORE_PATHS).unwrap_or(0.0);
    let chunk_index = extract::first_u32(entry, CHUNK_INDEX_PATHS).unwrap_or(0);
    let chunk_type =
        extract::first_str(entry, CHUNK_TYPE_PATHS).unwrap_or_else(|| "text".to_string());
    let metadata = if include_metadata {
        extract::first_object(entry, METADATA_PATHS).unwrap_or_default()
    } else {
        HashMap::new()
    };

    SearchHit {
        content,
        locator,
        score,
        metadata,
        chunk_index,
        chunk_type,
    }
}

#[cfg(test)]
#[path = "semantic_tests.rs"]
mod tests;
