use super::*;

fn hit(locator: &str, score: f32) -> SearchHit {
    SearchHit::new(format!("content for {locator}"), locator, score)
}

#[test]
fn test_semantic_scores_are_boosted() {
    let fused = fuse(vec![hit("a.rs", 0.6)], vec![], 10);
    assert_eq!(fused.len(), 1);
    assert!((fused[0].score - 0.72).abs() < 1e-6);
}

#[test]
fn test_graph_only_hits_keep_their_scores() {
    let fused = fuse(vec![], vec![hit("graph://a", 0.8)], 10);
    assert_eq!(fused.len(), 1);
    assert!((fused[0].score - 0.8).abs() < 1e-6);
}

#[test]
fn test_cross_method_agreement_boosts_and_merges() {
    // Semantic 0.6 boosts to 0.72; the graph hit for the same key arrived at
    // rank 1 so it scores 0.7; fused: min(1.0, 0.72 + 0.7 * 0.3) = 0.93.
    let semantic = vec![hit("x", 0.6)];
    let graph = vec![hit("graph://other", 0.8), hit("x", 0.7)];

    let fused = fuse(semantic, graph, 10);

    assert_eq!(fused.len(), 2);
    let x = fused.iter().find(|h| h.locator == "x").unwrap();
    assert!((x.score - 0.93).abs() < 1e-6);
    assert_eq!(
        x.metadata.get(HYBRID_MATCH_KEY),
        Some(&serde_json::Value::Bool(true))
    );
}

#[test]
fn test_cross_method_item_appears_exactly_once() {
    let semantic = vec![hit("a.rs", 0.9)];
    let graph = vec![hit("a.rs", 0.8)];

    let fused = fuse(semantic, graph, 10);

    assert_eq!(fused.len(), 1);
    assert_eq!(fused.iter().filter(|h| h.locator == "a.rs").count(), 1);
}

#[test]
fn test_combined_score_is_capped() {
    // 0.9 * 1.2 = 1.08, plus 0.8 * 0.3 would exceed the cap.
    let fused = fuse(vec![hit("a.rs", 0.9)], vec![hit("a.rs", 0.8)], 10);
    assert!((fused[0].score - 1.0).abs() < 1e-6);
}

#[test]
fn test_same_locator_different_chunk_not_merged() {
    let semantic = vec![hit("a.rs", 0.9)];
    let graph = vec![hit("a.rs", 0.8).with_chunk(1, "graph_entity")];

    let fused = fuse(semantic, graph, 10);
    assert_eq!(fused.len(), 2);
}

#[test]
fn test_output_sorted_by_descending_score() {
    let semantic = vec![hit("low.rs", 0.6), hit("high.rs", 0.9)];
    let graph = vec![hit("graph://mid", 0.8)];

    let fused = fuse(semantic, graph, 10);

    for pair in fused.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    assert_eq!(fused[0].locator, "high.rs");
}

#[test]
fn test_output_truncated_to_limit() {
    let semantic: Vec<SearchHit> = (0..8).map(|i| hit(&format!("s{i}.rs"), 0.9)).collect();
    let graph: Vec<SearchHit> = (0..8).map(|i| hit(&format!("graph://g{i}"), 0.5)).collect();

    let fused = fuse(semantic, graph, 10);
    assert_eq!(fused.len(), 10);

    let fused = fuse(
        (0..8).map(|i| hit(&format!("s{i}.rs"), 0.9)).collect(),
        vec![],
        3,
    );
    assert_eq!(fused.len(), 3);
}

#[test]
fn test_metadata_merge_prefers_graph_values() {
    let mut semantic_hit = hit("a.rs", 0.9);
    semantic_hit
        .metadata
        .insert("source".to_string(), serde_json::json!("vector"));

    let mut graph_hit = hit("a.rs", 0.8);
    graph_hit
        .metadata
        .insert("source".to_string(), serde_json::json!("knowledge_graph"));
    graph_hit
        .metadata
        .insert("labels".to_string(), serde_json::json!(["module"]));

    let fused = fuse(vec![semantic_hit], vec![graph_hit], 10);

    assert_eq!(
        fused[0].metadata.get("source"),
        Some(&serde_json::json!("knowledge_graph"))
    );
    assert_eq!(
        fused[0].metadata.get("labels"),
        Some(&serde_json::json!(["module"]))
    );
}

#[test]
fn test_ties_keep_insertion_order() {
    let semantic = vec![hit("first.rs", 0.5), hit("second.rs", 0.5)];

    let fused = fuse(semantic, vec![], 10);

    assert_eq!(fused[0].locator, "first.rs");
    assert_eq!(fused[1].locator, "second.rs");
}

#[test]
fn test_duplicate_semantic_key_keeps_position_last_value_wins() {
    let semantic = vec![
        hit("a.rs", 0.5),
        hit("b.rs", 0.5),
        SearchHit::new("updated", "a.rs", 0.5),
    ];

    let fused = fuse(semantic, vec![], 10);

    assert_eq!(fused.len(), 2);
    assert_eq!(fused[0].locator, "a.rs");
    assert_eq!(fused[0].content, "updated");
}

#[test]
fn test_empty_inputs() {
    assert!(fuse(vec![], vec![], 10).is_empty());
}
