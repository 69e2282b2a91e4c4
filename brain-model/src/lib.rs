#![deny(missing_docs)]
//! Model-facing types for the Brain: the [`Provider`] trait, request/response
//! and message types, and context-window compaction strategies.
//!
//! This crate is the seam between the agent loop (`brain-agent`) and the
//! concrete LLM providers (`brain-provider-*`). It defines the vocabulary
//! both sides agree on, plus conversion to/from `brain_proto::content`.
//!
//! Key traits defined here:
//! - [`Provider`] — LLM provider interface (not object-safe, uses RPITIT)
//! - [`ContextStrategy`] — context window management

pub mod config;
pub mod context;
pub mod convert;
pub mod provider;
pub mod types;

// Re-exports
pub use config::AgentModelConfig;
pub use context::{ContextStrategy, NoCompaction};
pub use convert::{
    content_block_to_part, content_part_to_block, content_to_parts, content_to_user_message,
    parts_to_content,
};
pub use provider::{Provider, ProviderError};
pub use types::*;
