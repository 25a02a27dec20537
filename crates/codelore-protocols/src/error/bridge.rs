//! Tool client errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolClientError {
    /// The backend process or session could not be established.
    #[error("failed to connect to backend '{server}': {cause}")]
    Connection { server: String, cause: String },

    /// A tool call failed after a connection existed: transport failure,
    /// protocol error, or a backend-reported error flag.
    #[error("tool '{tool}' on backend '{server}' failed: {cause}")]
    Invocation {
        server: String,
        tool: String,
        cause: String,
    },
}

impl ToolClientError {
    /// Backend name the failure originated from.
    pub fn server(&self) -> &str {
        match self {
            ToolClientError::Connection { server, .. } => server,
            ToolClientError::Invocation { server, .. } => server,
        }
    }
}
