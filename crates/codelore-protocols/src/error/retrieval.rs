//! Retrieval boundary errors.

use thiserror::Error;

use super::ToolClientError;

/// A retrieval operation failed at the similarity-search boundary.
///
/// Carries the original query text for traceability; the backend failure is
/// preserved as the error source.
#[derive(Debug, Error)]
#[error("{operation} failed for query '{query}': {source}")]
pub struct SearchError {
    /// Operation tag, e.g. "search".
    pub operation: &'static str,
    /// The query that triggered the failure.
    pub query: String,
    #[source]
    pub source: ToolClientError,
}

impl SearchError {
    pub fn new(
        operation: &'static str,
        query: impl Into<String>,
        source: ToolClientError,
    ) -> Self {
        Self {
            operation,
            query: query.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_error_display() {
        let err = SearchError::new(
            "search",
            "auth flow",
            ToolClientError::Connection {
                server: "vector".to_string(),
                cause: "refused".to_string(),
            },
        );
        let display = err.to_string();
        assert!(display.contains("search"));
        assert!(display.contains("auth flow"));
        assert!(display.contains("refused"));
    }

    #[test]
    fn test_search_error_source_chain() {
        use std::error::Error;

        let err = SearchError::new(
            "search",
            "q",
            ToolClientError::Invocation {
                server: "vector".to_string(),
                tool: "search".to_string(),
                cause: "timeout".to_string(),
            },
        );
        let source = err.source().expect("source preserved");
        assert!(source.to_string().contains("timeout"));
    }
}
