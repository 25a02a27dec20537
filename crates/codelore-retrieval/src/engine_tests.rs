use super::*;

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use codelore_mcp::{Request, Response, Transport, TransportError};
use crate::fusion::HYBRID_MATCH_KEY;

struct MockTransport {
    responses: Mutex<VecDeque<Result<Response, TransportError>>>,
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, _request: Request) -> Result<Response, TransportError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(TransportError::Closed))
    }

    async fn close(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

fn client_with(server: &str, responses: Vec<Result<Response, TransportError>>) -> Arc<ToolClient> {
    let transport = Arc::new(MockTransport {
        responses: Mutex::new(responses.into_iter().collect()),
    });
    Arc::new(ToolClient::with_transport(server, transport))
}

fn tool_response(body: Value) -> Result<Response, TransportError> {
    Ok(Response::success(
        1i64,
        json!({
            "content": [{"type": "text", "text": body.to_string()}],
            "isError": false,
        }),
    ))
}

fn engine(
    vector: Vec<Result<Response, TransportError>>,
    graph: Vec<Result<Response, TransportError>>,
) -> RetrievalEngine {
    RetrievalEngine::new(
        client_with("vector", vector),
        client_with("graph", graph),
        &RetrievalConfig::default(),
    )
}

fn graph_entity(name: &str, path: Option<&str>) -> Value {
    let mut properties = json!({"name": name});
    if let Some(path) = path {
        properties["path"] = json!(path);
    }
    json!({"memory": {"_id": 1, "_labels": ["module"], "properties": properties}})
}

#[tokio::test]
async fn test_hybrid_search_fuses_both_paths() {
    let vector_body = json!({
        "results": [
            {"content": "auth handler", "score": 0.9, "payload": {"file_path": "auth.rs"}},
        ],
    });
    let graph_body = json!([graph_entity("session", None)]);

    let engine = engine(vec![tool_response(vector_body)], vec![tool_response(graph_body)]);

    let hits = engine
        .hybrid_search("auth flow", &SearchOptions::default())
        .await
        .unwrap();

    assert_eq!(hits.len(), 2);
    // Semantic hit boosted to the front.
    assert_eq!(hits[0].locator, "auth.rs");
    assert!((hits[0].score - 1.08).abs() < 1e-6);
    assert_eq!(hits[1].locator, "graph://session");
    assert!((hits[1].score - 0.8).abs() < 1e-6);
}

#[tokio::test]
async fn test_hybrid_search_merges_cross_method_item() {
    // Semantic "x" scores 0.6 (boosted to 0.72). The graph finds "x" at rank
    // 1, so it carries 0.7; the merged entry scores min(1.0, 0.72 + 0.21).
    let vector_body = json!({
        "results": [
            {"content": "x impl", "score": 0.6, "payload": {"file_path": "x"}},
        ],
    });
    let graph_body = json!([
        graph_entity("other", None),
        graph_entity("x-node", Some("x")),
    ]);

    let engine = engine(vec![tool_response(vector_body)], vec![tool_response(graph_body)]);

    let options = SearchOptions::default().with_threshold(0.5);
    let hits = engine.hybrid_search("x", &options).await.unwrap();

    assert_eq!(hits.len(), 2);
    let merged = hits.iter().find(|h| h.locator == "x").unwrap();
    assert!((merged.score - 0.93).abs() < 1e-6);
    assert_eq!(merged.metadata.get(HYBRID_MATCH_KEY), Some(&json!(true)));
    assert_eq!(hits.iter().filter(|h| h.locator == "x").count(), 1);
}

#[tokio::test]
async fn test_hybrid_search_survives_graph_failure() {
    let vector_body = json!({
        "results": [
            {"content": "auth handler", "score": 0.9, "payload": {"file_path": "auth.rs"}},
        ],
    });

    let engine = engine(
        vec![tool_response(vector_body)],
        vec![Err(TransportError::Closed)],
    );

    let hits = engine
        .hybrid_search("auth flow", &SearchOptions::default())
        .await
        .unwrap();

    assert_eq!(hits.len(), 1);
    assert!((hits[0].score - 1.08).abs() < 1e-6);
}

#[tokio::test]
async fn test_hybrid_search_fails_when_vector_fails() {
    let graph_body = json!([graph_entity("session", None)]);

    let engine = engine(
        vec![Err(TransportError::Closed)],
        vec![tool_response(graph_body)],
    );

    let err = engine
        .hybrid_search("auth flow", &SearchOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.operation, "search");
    assert_eq!(err.query, "auth flow");
}

#[tokio::test]
async fn test_hybrid_search_respects_limit() {
    let vector_body = json!({
        "results": (0..6)
            .map(|i| json!({
                "content": format!("chunk {i}"),
                "score": 0.9,
                "payload": {"file_path": format!("s{i}.rs")},
            }))
            .collect::<Vec<_>>(),
    });
    let graph_body = json!(
        (0..6)
            .map(|i| graph_entity(&format!("g{i}"), None))
            .collect::<Vec<_>>()
    );

    let engine = engine(vec![tool_response(vector_body)], vec![tool_response(graph_body)]);

    let options = SearchOptions::default().with_limit(4);
    let hits = engine.hybrid_search("query", &options).await.unwrap();

    assert_eq!(hits.len(), 4);
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn test_semantic_only_search_delegates() {
    let vector_body = json!({
        "results": [
            {"content": "auth handler", "score": 0.9, "payload": {"file_path": "auth.rs"}},
        ],
    });

    let engine = engine(vec![tool_response(vector_body)], vec![]);

    let hits = engine
        .search("auth flow", &SearchOptions::default())
        .await
        .unwrap();

    // No fusion on the semantic-only path: the raw score is untouched.
    assert_eq!(hits.len(), 1);
    assert!((hits[0].score - 0.9).abs() < 1e-6);
}

#[tokio::test]
async fn test_from_config_requires_both_backends() {
    let config = codelore_config::ConfigLoader::load_str(
        r#"
            [backends.vector]
            command = "true"
        "#,
    )
    .unwrap();

    let result = RetrievalEngine::from_config(&config);
    assert!(matches!(
        result,
        Err(ConfigError::MissingBackend(name)) if name == "graph"
    ));
}

#[tokio::test]
async fn test_from_config_builds_engine() {
    let config = codelore_config::ConfigLoader::load_str(
        r#"
            [backends.vector]
            command = "true"

            [backends.graph]
            command = "true"

            [retrieval]
            collection = "docs"
        "#,
    )
    .unwrap();

    let engine = RetrievalEngine::from_config(&config).unwrap();
    assert_eq!(engine.semantic().default_collection(), "docs");
}

#[tokio::test]
async fn test_shutdown_disconnects_both_clients() {
    let vector_client = client_with("vector", vec![]);
    let graph_client = client_with("graph", vec![]);

    let engine = RetrievalEngine::new(
        vector_client.clone(),
        graph_client.clone(),
        &RetrievalConfig::default(),
    );

    assert!(vector_client.is_connected().await);
    engine.shutdown().await;
    assert!(!vector_client.is_connected().await);
    assert!(!graph_client.is_connected().await);
}
