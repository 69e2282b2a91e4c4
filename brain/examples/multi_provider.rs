//! Multi-provider: same request sent to Anthropic and OpenAI.
//!
//! Demonstrates provider-agnostic design — the same ProviderRequest works
//! with any Provider implementation.
//!
//! Set ANTHROPIC_API_KEY and OPENAI_API_KEY, then run:
//!   cargo run --example multi_provider -p brain --features provider-anthropic,provider-openai

use brain_model::provider::Provider;
use brain_model::types::{ContentPart, ProviderMessage, ProviderRequest, Role};
use brain_provider_anthropic::AnthropicProvider;
use brain_provider_openai::OpenAIProvider;

/// Send a request to any provider and print the result.
async fn ask(name: &str, provider: &impl Provider, request: ProviderRequest) {
    println!("--- {name} ---");
    match provider.complete(request).await {
        Ok(response) => {
            let text = response
                .content
                .iter()
                .find_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .unwrap_or("[no text in response]");

            println!("Model:    {}", response.model);
            println!("Response: {text}");
            println!(
                "Usage:    {} input / {} output tokens",
                response.usage.input_tokens, response.usage.output_tokens
            );
        }
        Err(e) => {
            eprintln!("Error from {name}: {e}");
        }
    }
    println!();
}

fn request(model: &str) -> ProviderRequest {
    ProviderRequest {
        model: Some(model.into()),
        messages: vec![ProviderMessage {
            role: Role::User,
            content: vec![ContentPart::Text {
                text: "In one sentence, what is the theory of relativity?".into(),
            }],
        }],
        tools: vec![],
        max_tokens: Some(256),
        temperature: None,
        system: None,
        extra: serde_json::json!(null),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let anthropic_key = std::env::var("ANTHROPIC_API_KEY")
        .expect("ANTHROPIC_API_KEY environment variable must be set");
    let openai_key = std::env::var("OPENAI_API_KEY")
        .expect("OPENAI_API_KEY environment variable must be set");

    let anthropic = AnthropicProvider::new(&anthropic_key);
    let openai = OpenAIProvider::new(&openai_key);

    ask("Anthropic", &anthropic, request("claude-3-5-haiku-20241022")).await;
    ask("OpenAI", &openai, request("gpt-4o-mini")).await;

    Ok(())
}
