//! End-to-end agent using Anthropic, a tool registry, and the react turn.
//!
//! Requires the ANTHROPIC_API_KEY environment variable to be set.
//!
//! Run with:
//!
//! ```sh
//! ANTHROPIC_API_KEY=sk-ant-... cargo run --example full_agent -p brain --features agent,provider-anthropic
//! ```

use std::sync::Arc;

use brain::prelude::*;
use brain_context::SlidingWindow;
use brain_provider_anthropic::AnthropicProvider;

// ---------------------------------------------------------------------------
// A simple calculator tool for the agent to use
// ---------------------------------------------------------------------------

struct CalculateTool;

impl ToolDyn for CalculateTool {
    fn name(&self) -> &str {
        "calculate"
    }

    fn description(&self) -> &str {
        "Evaluate a simple math expression. Supports +, -, *, /."
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "A mathematical expression like \"2 + 2\"",
                }
            },
            "required": ["expression"],
        })
    }

    fn call(
        &self,
        input: serde_json::Value,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<serde_json::Value, ToolError>> + Send + '_>,
    > {
        Box::pin(async move {
            let expr = input["expression"]
                .as_str()
                .ok_or_else(|| ToolError::InvalidInput("expression must be a string".into()))?;
            let result = eval_simple(expr.trim())
                .ok_or_else(|| ToolError::InvalidInput(format!("cannot evaluate: {expr}")))?;
            Ok(serde_json::json!({ "result": result }))
        })
    }
}

fn eval_simple(expr: &str) -> Option<f64> {
    for op in [" + ", " - ", " * ", " / "] {
        if let Some((left, right)) = expr.split_once(op) {
            let a: f64 = left.trim().parse().ok()?;
            let b: f64 = right.trim().parse().ok()?;
            return Some(match op.trim() {
                "+" => a + b,
                "-" => a - b,
                "*" => a * b,
                "/" => a / b,
                _ => return None,
            });
        }
    }
    expr.parse().ok()
}

// ---------------------------------------------------------------------------
// A state reader with nothing behind it — this example does not persist state
// ---------------------------------------------------------------------------

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

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let api_key = std::env::var("ANTHROPIC_API_KEY")
        .expect("ANTHROPIC_API_KEY environment variable must be set");
    let provider = AnthropicProvider::new(&api_key);

    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(CalculateTool));

    let config = ReactConfig {
        system_prompt: "You are a helpful math assistant. Use the calculate tool for arithmetic. \
             After getting the result, respond with a short sentence stating the answer."
            .into(),
        default_model: "claude-haiku-4-5-20251001".into(),
        default_max_tokens: 1024,
        default_max_turns: 5,
    };

    let agent = ReactTurn::new(
        provider,
        tools,
        Box::new(SlidingWindow::new()),
        HookRegistry::new(),
        Arc::new(NullStateReader),
        config,
    );

    let input = TurnInput::new(
        Content::text("What is 42 * 17? Use the calculate tool."),
        brain_proto::turn::TriggerType::User,
    );
    let output = agent.execute(input).await?;

    println!("Agent response: {:?}", output.message.as_text());
    println!("Turns taken:    {}", output.metadata.turns_used);
    println!(
        "Token usage:    {} input / {} output",
        output.metadata.tokens_in, output.metadata.tokens_out
    );

    Ok(())
}
