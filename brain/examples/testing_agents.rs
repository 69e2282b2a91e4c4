//! Example: testing agents with mock providers and tools.
//!
//! Demonstrates patterns for unit testing agents without real API calls.
//! No API key needed — everything is mocked.
//!
//! Run with: `cargo run --example testing_agents -p brain --features agent`

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::Arc;

use brain::prelude::*;
use brain_model::context::NoCompaction;
use brain_model::types::{ContentPart, ProviderRequest, ProviderResponse, Role, StopReason, TokenUsage};
use serde_json::json;

// --- Mock provider: returns pre-configured responses ---

struct MockProvider {
    responses: Mutex<VecDeque<ProviderResponse>>,
}

impl MockProvider {
    fn with_responses(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }

    fn text(text: &str) -> ProviderResponse {
        ProviderResponse {
            content: vec![ContentPart::Text {
                text: text.to_string(),
            }],
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
            model: "mock-model".into(),
            cost: None,
            truncated: None,
        }
    }

    fn tool_call(tool_name: &str, input: serde_json::Value) -> ProviderResponse {
        ProviderResponse {
            content: vec![ContentPart::ToolUse {
                id: "call-1".into(),
                name: tool_name.into(),
                input,
            }],
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
            model: "mock-model".into(),
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
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockProvider::text("No more responses configured"));
        async move { Ok(response) }
    }
}

// --- A simple tool for testing ---

struct AddTool;

impl ToolDyn for AddTool {
    fn name(&self) -> &str {
        "add"
    }
    fn description(&self) -> &str {
        "Add two numbers"
    }
    fn input_schema(&self) -> serde_json::Value {
        json!({"type": "object"})
    }
    fn call(
        &self,
        input: serde_json::Value,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<serde_json::Value, ToolError>> + Send + '_>,
    > {
        Box::pin(async move {
            let a = input["a"].as_f64().unwrap_or(0.0);
            let b = input["b"].as_f64().unwrap_or(0.0);
            Ok(json!({"result": a + b}))
        })
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

fn config(max_turns: usize) -> ReactConfig {
    ReactConfig {
        system_prompt: "You are a helpful assistant.".into(),
        default_model: "mock-model".into(),
        default_max_tokens: 256,
        default_max_turns: max_turns,
    }
}

#[tokio::main]
async fn main() {
    println!("=== Test 1: Simple single-turn response ===");
    {
        let provider = MockProvider::with_responses(vec![MockProvider::text("The answer is 42.")]);
        let agent = ReactTurn::new(
            provider,
            ToolRegistry::new(),
            Box::new(NoCompaction),
            HookRegistry::new(),
            Arc::new(NullStateReader),
            config(1),
        );
        let input = TurnInput::new(Content::text("What is the answer?"), brain_proto::turn::TriggerType::User);
        let output = agent.execute(input).await.unwrap();
        println!("  Response: {:?}", output.message.as_text());
        println!("  Turns: {}", output.metadata.turns_used);
        assert_eq!(output.metadata.turns_used, 1);
    }

    println!("\n=== Test 2: Tool call then final response ===");
    {
        let provider = MockProvider::with_responses(vec![
            MockProvider::tool_call("add", json!({"a": 3, "b": 4})),
            MockProvider::text("3 + 4 = 7"),
        ]);

        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(AddTool));

        let agent = ReactTurn::new(
            provider,
            tools,
            Box::new(NoCompaction),
            HookRegistry::new(),
            Arc::new(NullStateReader),
            config(5),
        );
        let input = TurnInput::new(Content::text("What is 3 + 4?"), brain_proto::turn::TriggerType::User);
        let output = agent.execute(input).await.unwrap();
        println!("  Response: {:?}", output.message.as_text());
        println!("  Turns: {}", output.metadata.turns_used);
        assert_eq!(output.metadata.turns_used, 2);
    }

    println!("\nAll test patterns demonstrated.");
    println!("Use these patterns in your #[cfg(test)] modules with assert! macros.");
}
