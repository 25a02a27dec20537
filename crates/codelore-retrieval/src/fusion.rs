//! Merge-and-rescore step combining semantic and graph result sets.

use std::collections::HashMap;

use serde_json::Value;

use codelore_protocols::SearchHit;

/// Multiplier applied to semantic scores before merging. Semantic matches
/// are the primary evidence.
pub const SEMANTIC_BOOST: f32 = 1.2;
/// Weight of the graph score when both paths found the same item; the
/// combined score is capped at 1.0.
pub const GRAPH_FUSION_WEIGHT: f32 = 0.3;
/// Metadata key marking an item found by both retrieval paths.
pub const HYBRID_MATCH_KEY: &str = "hybrid_match";

/// Fuse semantic and graph hits into one ranking.
///
/// Items are deduplicated by `(locator, chunk_index)`. Semantic hits enter
/// first with a boosted score; a graph hit whose key already exists raises
/// that entry to `min(1.0, existing + graph * 0.3)`, merges metadata, and
/// tags it as a hybrid match. New keys enter as-is. The output is sorted by
/// descending score (stable, so ties keep insertion order) and truncated to
/// `limit`.
pub fn fuse(semantic: Vec<SearchHit>, graph: Vec<SearchHit>, limit: usize) -> Vec<SearchHit> {
    let mut merged: Vec<SearchHit> = Vec::with_capacity(semantic.len() + graph.len());
    let mut index: HashMap<(String, u32), usize> = HashMap::new();

    for mut hit in semantic {
        hit.score *= SEMANTIC_BOOST;
        match index.get(&hit.key()) {
            // A repeated key keeps its original position, last value wins.
            Some(&slot) => merged[slot] = hit,
            None => {
                index.insert(hit.key(), merged.len());
                merged.push(hit);
            }
        }
    }

    for hit in graph {
        match index.get(&hit.key()) {
            Some(&slot) => {
                let existing = &mut merged[slot];
                existing.score = (existing.score + hit.score * GRAPH_FUSION_WEIGHT).min(1.0);
                existing.metadata.extend(hit.metadata);
                existing
                    .metadata
                    .insert(HYBRID_MATCH_KEY.to_string(), Value::Bool(true));
            }
            None => {
                index.insert(hit.key(), merged.len());
                merged.push(hit);
            }
        }
    }

    merged.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    merged.truncate(limit);
    merged
}

#[cfg(test)]
#[path = "fusion_tests.rs"]
mod tests;
