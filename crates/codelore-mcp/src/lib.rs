//! MCP (Model Context Protocol) tool client for codelore.
//!
//! Owns one stdio session per backend name and bridges typed tool calls to
//! it: idempotent connect, implicit reconnect on demand, best-effort
//! disconnect. The vector and graph backends are only ever reached through
//! this crate.

mod client;
mod protocol;
mod transport;

pub use client::ToolClient;
pub use protocol::{
    ContentBlock, Request, RequestId, Response, RpcError, ToolDescriptor, ToolOutput,
};
pub use transport::{ServerSpec, StdioTransport, Transport, TransportError};
