#![deny(missing_docs)]
//! # brain — umbrella crate
//!
//! Provides a single import surface for the Brain orchestrator core.
//! Re-exports protocol and key implementations behind feature flags, plus a
//! `prelude` for the happy path.

#[cfg(feature = "core")]
pub use brain_proto;
#[cfg(feature = "agent")]
pub use brain_agent;
#[cfg(feature = "core")]
pub use brain_context;
#[cfg(feature = "env-local")]
pub use brain_env_local;
#[cfg(feature = "hook-security")]
pub use brain_hook_security;
#[cfg(feature = "hooks")]
pub use brain_hooks;
#[cfg(feature = "mcp")]
pub use brain_mcp;
#[cfg(feature = "core")]
pub use brain_model;
#[cfg(feature = "orch-local")]
pub use brain_orch_local;
#[cfg(feature = "provider-anthropic")]
pub use brain_provider_anthropic;
#[cfg(feature = "provider-ollama")]
pub use brain_provider_ollama;
#[cfg(feature = "provider-openai")]
pub use brain_provider_openai;
#[cfg(feature = "state-memory")]
pub use brain_state_memory;
#[cfg(feature = "core")]
pub use brain_tool;

/// Happy-path imports for composing Brain systems.
pub mod prelude {
    #[cfg(feature = "core")]
    pub use brain_proto::{
        AgentId, Content, ContentBlock, Effect, Environment, ExitReason, Hook, HookAction,
        HookContext, HookPoint, Scope, SessionId, StateReader, StateStore, Turn, TurnConfig,
        TurnInput, TurnOutput, WorkflowId,
    };

    #[cfg(feature = "hooks")]
    pub use brain_hooks::HookRegistry;

    #[cfg(feature = "hook-security")]
    pub use brain_hook_security::{ExfilGuardHook, RedactionHook};

    #[cfg(feature = "core")]
    pub use brain_tool::{ToolDyn, ToolError, ToolRegistry};

    #[cfg(feature = "core")]
    pub use brain_model::provider::{Provider, ProviderError};

    #[cfg(feature = "agent")]
    pub use brain_agent::{ReactConfig, ReactTurn};

    #[cfg(feature = "orch-local")]
    pub use brain_orch_local::LocalOrch;

    #[cfg(feature = "env-local")]
    pub use brain_env_local::LocalEnv;

    #[cfg(feature = "state-memory")]
    pub use brain_state_memory::MemoryStore;
}
