#![deny(missing_docs)]
//! MCP client and server bridging MCP tools with the Brain's tool registry.
//!
//! Two independent components:
//!
//! - [`McpClient`] connects to an MCP server, discovers its tools, and wraps
//!   each as a [`ToolDyn`](brain_tool::ToolDyn) for use in a
//!   [`ToolRegistry`](brain_tool::ToolRegistry).
//! - [`McpServer`] wraps a [`ToolRegistry`](brain_tool::ToolRegistry) and
//!   exposes its tools via the MCP protocol over stdio.
//!
//! [`types`] holds the resource/prompt vocabulary MCP servers can expose
//! beyond tools, used by skill discovery in the self-management layer.

pub mod client;
pub mod error;
pub mod server;
pub mod types;

pub use client::McpClient;
pub use error::McpError;
pub use server::McpServer;
pub use types::{
    McpPrompt, McpPromptArgument, McpPromptContent, McpPromptMessage, McpPromptResult,
    McpResource, McpResourceContents, PaginatedList,
};
