//! Errors from MCP client/server operations.

use thiserror::Error;

/// Errors from connecting to, or serving, an MCP endpoint.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum McpError {
    /// Transport setup, handshake, or shutdown failed.
    #[error("mcp connection error: {0}")]
    Connection(String),

    /// A request succeeded at the transport level but the server returned
    /// a protocol-level error.
    #[error("mcp protocol error: {0}")]
    Protocol(String),
}
