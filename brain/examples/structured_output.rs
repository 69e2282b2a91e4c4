//! Structured output: asking for JSON Schema-shaped responses via the system
//! prompt and parsing the result.
//!
//! `ProviderRequest` has no schema-constrained response mode, so this example
//! embeds the JSON Schema in the system prompt instead and relies on the
//! model to follow it, which works well for capable chat models.
//!
//! Set ANTHROPIC_API_KEY in your environment and run:
//!   cargo run --example structured_output -p brain --features provider-anthropic

use brain_model::provider::Provider;
use brain_model::types::{ContentPart, ProviderMessage, ProviderRequest, Role};
use brain_provider_anthropic::AnthropicProvider;

/// A movie review with structured fields.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
struct MovieReview {
    /// Title of the movie.
    title: String,
    /// Rating from 1 to 10.
    rating: u8,
    /// Brief summary of the review.
    summary: String,
    /// Whether the reviewer recommends the movie.
    recommended: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let api_key = std::env::var("ANTHROPIC_API_KEY")
        .expect("ANTHROPIC_API_KEY environment variable must be set");
    let provider = AnthropicProvider::new(&api_key);

    let schema = schemars::schema_for!(MovieReview);
    let schema_value = serde_json::to_value(&schema)?;

    let system = format!(
        "Respond with a single JSON object matching this JSON Schema, and nothing else \
         (no markdown fences, no commentary):\n{}",
        serde_json::to_string_pretty(&schema_value)?
    );

    let request = ProviderRequest {
        model: Some("claude-haiku-4-5-20251001".into()),
        messages: vec![ProviderMessage {
            role: Role::User,
            content: vec![ContentPart::Text {
                text: "Review the movie Inception.".into(),
            }],
        }],
        tools: vec![],
        max_tokens: Some(1024),
        temperature: Some(0.0),
        system: Some(system),
        extra: serde_json::json!(null),
    };

    let response = provider.complete(request).await?;

    let text = response
        .content
        .iter()
        .find_map(|part| match part {
            ContentPart::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .expect("response should contain text");

    println!("Raw JSON response:\n{text}\n");

    let review: MovieReview = serde_json::from_str(text)?;

    println!("Parsed MovieReview:");
    println!("  Title:       {}", review.title);
    println!("  Rating:      {}/10", review.rating);
    println!("  Summary:     {}", review.summary);
    println!("  Recommended: {}", review.recommended);

    Ok(())
}
