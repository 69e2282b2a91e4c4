#![cfg(feature = "provider-ollama")]
//! Smoke tests against a local Ollama instance.
//!
//! These tests are `#[ignore]` by default. Run them with:
//!
//!     cargo test -p brain --features provider-ollama,agent --test smoke_ollama -- --ignored
//!
//! They require a running Ollama server with the `llama3.2` model pulled.
//! Start Ollama first: `ollama serve` then `ollama pull llama3.2`.
//!
//! Tool calling is not tested here because small local models are unreliable
//! with tool use. These tests validate basic completion and the full agent
//! loop.

use brain_model::provider::Provider;
use brain_model::types::{ContentPart, ProviderMessage, ProviderRequest, Role};
use brain_provider_ollama::OllamaProvider;

fn ollama() -> OllamaProvider {
    OllamaProvider::new().with_keep_alive("0") // unload after test
}

// ===========================================================================
// Test 1: Basic completion
// ===========================================================================

#[tokio::test]
#[ignore = "requires local Ollama"]
async fn smoke_basic_completion() {
    let provider = ollama();

    let request = ProviderRequest {
        model: Some("llama3.2".into()),
        messages: vec![ProviderMessage {
            role: Role::User,
            content: vec![ContentPart::Text {
                text: "What is 2+2? Reply with just the number.".into(),
            }],
        }],
        tools: vec![],
        max_tokens: Some(64),
        temperature: Some(0.0),
        system: Some("You are a helpful assistant. Reply concisely with only the answer.".into()),
        extra: serde_json::json!(null),
    };

    let response = provider.complete(request).await.unwrap();

    assert!(!response.content.is_empty(), "should have content");
    let text = match &response.content[0] {
        ContentPart::Text { text } => text.clone(),
        other => panic!("expected Text, got {other:?}"),
    };
    assert!(text.contains('4'), "expected '4' in response, got: {text}");

    println!("  response: {text}");
    println!(
        "  tokens: {} in / {} out",
        response.usage.input_tokens, response.usage.output_tokens
    );
}

// ===========================================================================
// Test 2: Full agent loop (no tools — local models unreliable with tool calling)
// ===========================================================================

#[cfg(feature = "agent")]
#[tokio::test]
#[ignore = "requires local Ollama"]
async fn smoke_full_agent_loop() {
    use brain_agent::{ReactConfig, ReactTurn};
    use brain_hooks::HookRegistry;
    use brain_model::context::NoCompaction;
    use brain_proto::content::Content;
    use brain_proto::turn::{ExitReason, Turn, TurnInput, TriggerType};
    use brain_tool::ToolRegistry;
    use std::sync::Arc;

    let provider = ollama();
    let tools = ToolRegistry::new();

    let config = ReactConfig {
        system_prompt: "You are a helpful assistant. Answer concisely in one sentence.".into(),
        default_model: "llama3.2".into(),
        default_max_tokens: 128,
        default_max_turns: 1,
    };

    let agent = ReactTurn::new(
        provider,
        tools,
        Box::new(NoCompaction),
        HookRegistry::new(),
        Arc::new(brain_state_memory::MemoryStore::new()),
        config,
    );

    let input = TurnInput::new(
        Content::text("What is the capital of France?"),
        TriggerType::User,
    );
    let output = agent.execute(input).await.unwrap();

    println!("  response: {:?}", output.message.as_text());
    println!("  turns: {}", output.metadata.turns_used);

    assert_eq!(output.exit_reason, ExitReason::Complete);
    assert_eq!(output.metadata.turns_used, 1, "should complete in 1 turn (no tools)");
    let text = output.message.as_text().unwrap_or_default().to_lowercase();
    assert!(text.contains("paris"), "expected 'paris' in: {text}");
}
