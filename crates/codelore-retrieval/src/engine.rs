//! Hybrid retrieval engine.

use std::sync::Arc;

use tracing::{debug, info};

use codelore_config::{Config, ConfigError, RetrievalConfig, GRAPH_BACKEND, VECTOR_BACKEND};
use codelore_mcp::{ServerSpec, ToolClient};
use codelore_protocols::{SearchError, SearchHit, SearchOptions};

use crate::fusion::fuse;
use crate::graph::GraphSearch;
use crate::semantic::SemanticSearch;

/// Hybrid retrieval engine over one vector and one graph backend.
///
/// The vector path is the primary signal: its failures are fatal to a query.
/// The graph path is enrichment: its failures degrade to semantic-only
/// results.
pub struct RetrievalEngine {
    semantic: SemanticSearch,
    graph: GraphSearch,
    vector_client: Arc<ToolClient>,
    graph_client: Arc<ToolClient>,
    graph_limit: usize,
    graph_depth: u32,
}

impl RetrievalEngine {
    /// Build the engine from a loaded configuration. Requires `vector` and
    /// `graph` backend descriptors.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let vector = config.backend(VECTOR_BACKEND)?;
        let graph = config.backend(GRAPH_BACKEND)?;

        let vector_client = Arc::new(ToolClient::new(VECTOR_BACKEND, server_spec(vector)));
        let graph_client = Arc::new(ToolClient::new(GRAPH_BACKEND, server_spec(graph)));

        Ok(Self::new(vector_client, graph_client, &config.retrieval))
    }

    /// Build the engine over pre-constructed clients.
    pub fn new(
        vector_client: Arc<ToolClient>,
        graph_client: Arc<ToolClient>,
        retrieval: &RetrievalConfig,
    ) -> Self {
        let semantic = SemanticSearch::new(
            vector_client.clone(),
            retrieval.collection.clone(),
            retrieval.embedding_service.clone(),
        );
        let graph = GraphSearch::new(graph_client.clone());

        Self {
            semantic,
            graph,
            vector_client,
            graph_client,
            graph_limit: retrieval.graph_limit,
            graph_depth: retrieval.graph_depth,
        }
    }

    /// The similarity-search component.
    pub fn semantic(&self) -> &SemanticSearch {
        &self.semantic
    }

    /// The graph-search component.
    pub fn graph(&self) -> &GraphSearch {
        &self.graph
    }

    /// Semantic-only search.
    pub async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchHit>, SearchError> {
        self.semantic.search(query, options).await
    }

    /// Hybrid search: both retrieval paths issued concurrently, results
    /// fused into one ranking.
    pub async fn hybrid_search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let (semantic, graph) = tokio::join!(
            self.semantic.search(query, options),
            self.graph
                .search_related(query, self.graph_limit, self.graph_depth),
        );

        let semantic = semantic?;
        debug!(
            query,
            semantic = semantic.len(),
            graph = graph.len(),
            "fusing retrieval paths"
        );
        Ok(fuse(semantic, graph, options.limit))
    }

    /// Best-effort teardown of both backend sessions.
    pub async fn shutdown(&self) {
        self.vector_client.disconnect().await;
        self.graph_client.disconnect().await;
        info!("retrieval engine shut down");
    }
}

fn server_spec(backend: &codelore_config::BackendConfig) -> ServerSpec {
    ServerSpec {
        command: backend.command.clone(),
        args: backend.args.clone(),
        env: backend.env.clone(),
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
