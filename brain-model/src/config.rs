//! Static configuration for the agent loop's model-facing defaults.

/// Static configuration for an agent loop instance's model calls.
///
/// Per-request overrides come from `TurnInput.config` (`brain_proto`'s
/// `TurnConfig`). This struct holds the defaults applied when a request
/// doesn't override them.
pub struct AgentModelConfig {
    /// Base system prompt for this turn implementation.
    pub system_prompt: String,

    /// Default model identifier.
    pub default_model: String,

    /// Default maximum output tokens per provider call.
    pub default_max_tokens: u32,

    /// Default maximum ReAct loop iterations.
    pub default_max_turns: u32,
}

impl Default for AgentModelConfig {
    fn default() -> Self {
        Self {
            system_prompt: "You are a helpful assistant.".into(),
            default_model: String::new(),
            default_max_tokens: 4096,
            default_max_turns: 25,
        }
    }
}
