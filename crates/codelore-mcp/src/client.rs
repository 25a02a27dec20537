//! Tool client: one backend connection, identified by name.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use codelore_protocols::error::ToolClientError;

use crate::protocol::{Request, ToolDescriptor, ToolOutput};
use crate::transport::{ServerSpec, StdioTransport, Transport};

/// Connection lifecycle for a single backend.
///
/// A tagged state rather than an optional handle: a caller observing
/// `Connected` always gets a whole session.
enum ConnectionState {
    Disconnected,
    Connected { transport: Arc<dyn Transport> },
}

/// Client owning exactly one backend connection.
///
/// `connect` is idempotent; `call_tool` connects implicitly when needed; an
/// unrecoverable transport failure drops the session so the next operation
/// reconnects.
pub struct ToolClient {
    server: String,
    spec: ServerSpec,
    state: Mutex<ConnectionState>,
    request_id: AtomicI64,
}

impl ToolClient {
    /// Create a client for the backend described by `spec`. No process is
    /// launched until the first operation.
    pub fn new(server: impl Into<String>, spec: ServerSpec) -> Self {
        Self {
            server: server.into(),
            spec,
            state: Mutex::new(ConnectionState::Disconnected),
            request_id: AtomicI64::new(1),
        }
    }

    /// Attach to an already-established transport, skipping the spawn and
    /// handshake. The client starts out connected.
    pub fn with_transport(server: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            server: server.into(),
            spec: ServerSpec::default(),
            state: Mutex::new(ConnectionState::Connected { transport }),
            request_id: AtomicI64::new(1),
        }
    }

    /// Backend name this client is bound to.
    pub fn server(&self) -> &str {
        &self.server
    }

    fn next_id(&self) -> i64 {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Establish the backend session. No-op when already connected; safe to
    /// call repeatedly.
    pub async fn connect(&self) -> Result<(), ToolClientError> {
        self.transport().await.map(|_| ())
    }

    /// Whether a session is currently established.
    pub async fn is_connected(&self) -> bool {
        matches!(*self.state.lock().await, ConnectionState::Connected { .. })
    }

    /// Current transport, connecting first if needed. The state lock is held
    /// across the transition, so concurrent connects cannot race a second
    /// session into existence.
    async fn transport(&self) -> Result<Arc<dyn Transport>, ToolClientError> {
        let mut state = self.state.lock().await;
        if let ConnectionState::Connected { transport } = &*state {
            return Ok(transport.clone());
        }

        let transport = self.open_session().await?;
        *state = ConnectionState::Connected {
            transport: transport.clone(),
        };
        Ok(transport)
    }

    /// Spawn the backend process and run the initialize handshake.
    async fn open_session(&self) -> Result<Arc<dyn Transport>, ToolClientError> {
        let connection_error = |cause: String| ToolClientError::Connection {
            server: self.server.clone(),
            cause,
        };

        let transport = StdioTransport::spawn(&self.spec)
            .await
            .map_err(|e| connection_error(e.to_string()))?;
        let transport: Arc<dyn Transport> = Arc::new(transport);

        let request = Request::initialize(self.next_id(), &self.server);
        let response = match transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                // Handshake failed: tear the process down before reporting.
                let _ = transport.close().await;
                return Err(connection_error(e.to_string()));
            }
        };

        if let Some(err) = response.error {
            let _ = transport.close().await;
            return Err(connection_error(err.to_string()));
        }

        info!(server = %self.server, "backend session established");
        Ok(transport)
    }

    /// Drop the session after an unrecoverable transport failure. The next
    /// operation reconnects.
    async fn mark_disconnected(&self) {
        *self.state.lock().await = ConnectionState::Disconnected;
    }

    /// Invoke a tool on the backend, connecting first when necessary.
    pub async fn call_tool(
        &self,
        tool: &str,
        arguments: Value,
    ) -> Result<ToolOutput, ToolClientError> {
        let transport = self.transport().await?;
        let invocation_error = |cause: String| ToolClientError::Invocation {
            server: self.server.clone(),
            tool: tool.to_string(),
            cause,
        };

        debug!(server = %self.server, tool, "calling backend tool");

        let request = Request::call_tool(self.next_id(), tool, arguments);
        let response = match transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                self.mark_disconnected().await;
                return Err(invocation_error(e.to_string()));
            }
        };

        if let Some(err) = response.error {
            return Err(invocation_error(err.to_string()));
        }

        let result = response.result.unwrap_or(Value::Null);
        let output: ToolOutput = serde_json::from_value(result)
            .map_err(|e| invocation_error(format!("malformed tool result: {e}")))?;

        if output.is_error {
            let cause = output
                .first_text()
                .unwrap_or("backend reported an error")
                .to_string();
            return Err(invocation_error(cause));
        }

        Ok(output)
    }

    /// Tools currently advertised by the backend.
    ///
    /// Listing is advisory: every failure degrades to an empty list.
    pub async fn list_tools(&self) -> Vec<ToolDescriptor> {
        let transport = match self.transport().await {
            Ok(transport) => transport,
            Err(e) => {
                warn!(server = %self.server, error = %e, "tool listing unavailable");
                return Vec::new();
            }
        };

        let response = match transport.send(Request::list_tools(self.next_id())).await {
            Ok(response) => response,
            Err(e) => {
                self.mark_disconnected().await;
                warn!(server = %self.server, error = %e, "tool listing failed");
                return Vec::new();
            }
        };

        response
            .result
            .as_ref()
            .and_then(|result| result.get("tools"))
            .and_then(|tools| serde_json::from_value(tools.clone()).ok())
            .unwrap_or_default()
    }

    /// Release the backend session.
    ///
    /// Safe to call when already disconnected. Close failures are logged and
    /// swallowed; the client always ends up disconnected.
    pub async fn disconnect(&self) {
        let mut state = self.state.lock().await;
        if let ConnectionState::Connected { transport } =
            std::mem::replace(&mut *state, ConnectionState::Disconnected)
        {
            if let Err(e) = transport.close().await {
                warn!(server = %self.server, error = %e, "backend close failed");
            } else {
                debug!(server = %self.server, "backend session closed");
            }
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
