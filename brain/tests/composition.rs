//! Composition integration tests for the `brain` umbrella crate.
//!
//! Verifies that the feature-gated re-exports in `brain::prelude` compose
//! into a working agent loop with mock providers and tools.

#![cfg(feature = "agent")]

use brain::prelude::*;
use brain_model::context::NoCompaction;
use brain_model::types::{ContentPart, ProviderRequest, ProviderResponse, Role, StopReason, TokenUsage};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

struct MockProvider {
    responses: Mutex<VecDeque<ProviderResponse>>,
}

impl MockProvider {
    fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }

    fn text_response(text: &str) -> ProviderResponse {
        ProviderResponse {
            content: vec![ContentPart::Text {
                text: text.to_string(),
            }],
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage {
                input_tokens: 10,
                output_tokens: 5,
                cache_read_tokens: None,
                cache_creation_tokens: None,
            },
            model: "mock".into(),
            cost: None,
            truncated: None,
        }
    }

    fn tool_response(tool_name: &str, tool_id: &str, args: serde_json::Value) -> ProviderResponse {
        ProviderResponse {
            content: vec![ContentPart::ToolUse {
                id: tool_id.to_string(),
                name: tool_name.to_string(),
                input: args,
            }],
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage {
                input_tokens: 10,
                output_tokens: 5,
                cache_read_tokens: None,
                cache_creation_tokens: None,
            },
            model: "mock".into(),
            cost: None,
            truncated: None,
        }
    }
}

impl Provider for MockProvider {
    fn complete(
        &self,
        _request: ProviderRequest,
    ) -> impl std::future::Future<Output = Result<ProviderResponse, ProviderError>> + Send {
        let response = self
            .responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .expect("MockProvider: no more responses queued");
        async move { Ok(response) }
    }
}

struct EchoTool;

impl ToolDyn for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }
    fn description(&self) -> &str {
        "Echo text back"
    }
    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object"})
    }
    fn call(
        &self,
        input: serde_json::Value,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<serde_json::Value, ToolError>> + Send + '_>,
    > {
        Box::pin(async move { Ok(serde_json::json!({"echoed": input["text"]})) })
    }
}

struct NullStateReader;

#[async_trait::async_trait]
impl brain_proto::StateReader for NullStateReader {
    async fn read(
        &self,
        _scope: &Scope,
        _key: &str,
    ) -> Result<Option<serde_json::Value>, brain_proto::StateError> {
        Ok(None)
    }
    async fn list(
        &self,
        _scope: &Scope,
        _prefix: &str,
    ) -> Result<Vec<String>, brain_proto::StateError> {
        Ok(vec![])
    }
    async fn search(
        &self,
        _scope: &Scope,
        _query: &str,
        _limit: usize,
    ) -> Result<Vec<brain_proto::state::SearchResult>, brain_proto::StateError> {
        Ok(vec![])
    }
}

fn user_input(text: &str) -> TurnInput {
    TurnInput::new(Content::text(text), brain_proto::turn::TriggerType::User)
}

fn config(max_turns: u32) -> ReactConfig {
    ReactConfig {
        system_prompt: "You are a helpful assistant.".into(),
        default_model: "mock-model".into(),
        default_max_tokens: 256,
        default_max_turns: max_turns as usize,
    }
}

#[tokio::test]
async fn minimal_agent_text_response() {
    let provider = MockProvider::new(vec![MockProvider::text_response("Paris")]);
    let agent = ReactTurn::new(
        provider,
        ToolRegistry::new(),
        Box::new(NoCompaction),
        HookRegistry::new(),
        Arc::new(NullStateReader),
        config(5),
    );

    let output = agent
        .execute(user_input("What is the capital of France?"))
        .await
        .unwrap();
    assert_eq!(output.message.as_text(), Some("Paris"));
    assert_eq!(output.metadata.turns_used, 1);
}

#[tokio::test]
async fn agent_with_tool_calls() {
    let provider = MockProvider::new(vec![
        MockProvider::tool_response("echo", "call-1", serde_json::json!({"text": "hello"})),
        MockProvider::text_response("I echoed: hello"),
    ]);
    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(EchoTool));

    let agent = ReactTurn::new(
        provider,
        tools,
        Box::new(NoCompaction),
        HookRegistry::new(),
        Arc::new(NullStateReader),
        config(5),
    );

    let output = agent.execute(user_input("Echo hello")).await.unwrap();
    assert_eq!(output.message.as_text(), Some("I echoed: hello"));
    assert_eq!(output.metadata.turns_used, 2);
}

#[tokio::test]
async fn agent_respects_max_turns() {
    let provider = MockProvider::new(vec![
        MockProvider::tool_response("echo", "call-1", serde_json::json!({"text": "1"})),
        MockProvider::tool_response("echo", "call-2", serde_json::json!({"text": "2"})),
        MockProvider::tool_response("echo", "call-3", serde_json::json!({"text": "3"})),
    ]);
    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(EchoTool));

    let agent = ReactTurn::new(
        provider,
        tools,
        Box::new(NoCompaction),
        HookRegistry::new(),
        Arc::new(NullStateReader),
        config(2),
    );

    let output = agent.execute(user_input("Go")).await.unwrap();
    assert_eq!(output.exit_reason, ExitReason::MaxTurns);
    assert_eq!(output.metadata.turns_used, 2);
}

#[test]
fn prelude_types_accessible() {
    let _content = Content::text("hello");
    let _config = config(5);
}

#[cfg(feature = "provider-anthropic")]
#[test]
fn anthropic_module_accessible() {
    let _provider = brain_provider_anthropic::AnthropicProvider::new("test-key");
}
