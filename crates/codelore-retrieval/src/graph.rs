//! Structural search against the knowledge-graph backend.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, warn};

use codelore_mcp::ToolClient;
use codelore_protocols::SearchHit;

/// Score assigned to the best graph match. The graph backend reports no
/// similarity scores, so relevance is synthesized from rank; these constants
/// feed directly into the fusion arithmetic.
pub const GRAPH_BASE_SCORE: f32 = 0.8;
/// Score decrement applied per rank position.
pub const GRAPH_SCORE_STEP: f32 = 0.1;

/// String-valued properties rendered as additional content lines, in order.
const DETAIL_FIELDS: &[&str] = &["description", "observations", "functionality", "language"];
/// List-valued properties rendered comma-joined.
const LIST_FIELDS: &[&str] = &["classes", "functions"];

/// Structural search over the knowledge graph.
pub struct GraphSearch {
    client: Arc<ToolClient>,
}

impl GraphSearch {
    pub fn new(client: Arc<ToolClient>) -> Self {
        Self { client }
    }

    /// Entities related to the query, mapped into the canonical shape.
    ///
    /// Graph retrieval is best-effort enrichment: every failure degrades to
    /// an empty result rather than propagating.
    pub async fn search_related(&self, query: &str, limit: usize, depth: u32) -> Vec<SearchHit> {
        let output = match self
            .client
            .call_tool(
                "search_memories",
                json!({"query": query, "limit": limit, "depth": depth}),
            )
            .await
        {
            Ok(output) => output,
            Err(e) => {
                warn!(query, error = %e, "graph search unavailable");
                return Vec::new();
            }
        };

        let body = output.json();
        let entities = body
            .as_array()
            .cloned()
            .or_else(|| body.get("results").and_then(Value::as_array).cloned())
            .unwrap_or_default();

        let hits: Vec<SearchHit> = entities
            .iter()
            .enumerate()
            .map(|(rank, entity)| entity_to_hit(entity, rank))
            .collect();

        debug!(query, results = hits.len(), "graph search complete");
        hits
    }
}

/// Map one graph entity to the canonical result shape.
fn entity_to_hit(entity: &Value, rank: usize) -> SearchHit {
    let memory = entity.get("memory").unwrap_or(entity);
    let props = memory.get("properties").cloned().unwrap_or(Value::Null);

    let labels: Vec<String> = memory
        .get("_labels")
        .and_then(Value::as_array)
        .map(|labels| {
            labels
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let entity_type = labels.first().map(String::as_str).unwrap_or("entity");
    let name = props
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("unnamed");

    let mut content = format!("{entity_type}: {name}");
    for field in DETAIL_FIELDS {
        if let Some(text) = props.get(*field).and_then(Value::as_str) {
            if !text.is_empty() {
                content.push_str(&format!("\n{field}: {text}"));
            }
        }
    }
    for field in LIST_FIELDS {
        if let Some(items) = props.get(*field).and_then(Value::as_array) {
            let joined = items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            if !joined.is_empty() {
                content.push_str(&format!("\n{field}: {joined}"));
            }
        }
    }

    let locator = props
        .get("path")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("graph://{name}"));

    let mut metadata: HashMap<String, Value> = HashMap::new();
    metadata.insert("labels".to_string(), json!(labels));
    metadata.insert("source".to_string(), json!("knowledge_graph"));

    SearchHit::new(content, locator, GRAPH_BASE_SCORE - GRAPH_SCORE_STEP * rank as f32)
        .with_chunk(0, "graph_entity")
        .with_metadata(metadata)
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
