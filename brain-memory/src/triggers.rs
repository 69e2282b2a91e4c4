//! Observer and reflector triggers.
//!
//! Both run fire-and-forget from the agent loop's perspective: callers
//! spawn these and never await completion inline with a turn, and any
//! failure is logged, never propagated.

use async_trait::async_trait;
use brain_model::provider::Provider;
use brain_model::types::{ContentPart, ProviderMessage, ProviderRequest, Role};
use serde::Deserialize;

/// A memory candidate extracted by an [`Observer`], not yet written to
/// the memory service.
#[derive(Debug, Clone, Deserialize)]
pub struct CandidateMemory {
    /// The text to remember.
    pub content: String,
    /// Free-form category (no semantic effect, per spec).
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "general".to_string()
}

/// Extracts candidate memories from a recent conversation window.
/// Object-safe so [`crate::MemoryService`] can hold one behind a `Box`
/// regardless of which provider backs it.
#[async_trait]
pub trait Observer: Send + Sync {
    /// Inspect `recent_window` (the unobserved turns' text) and return
    /// memories worth persisting. An empty vec means nothing survived.
    async fn observe(&self, recent_window: &str) -> Result<Vec<CandidateMemory>, String>;
}

const OBSERVER_SYSTEM_PROMPT: &str = "You extract durable facts worth remembering from a \
conversation excerpt. Respond with a JSON array of objects, each `{\"content\": \"...\", \
\"category\": \"...\"}`. Only include facts that would still matter days from now \
(preferences, commitments, identifying details). If nothing qualifies, respond with `[]`. \
Respond with the JSON array alone, no commentary, no markdown fences.";

/// An [`Observer`] backed by a (typically cheaper) [`Provider`] model.
pub struct ProviderObserver<P: Provider> {
    provider: P,
    model: String,
}

impl<P: Provider> ProviderObserver<P> {
    /// Build an observer that calls `model` on `provider` for extraction.
    pub fn new(provider: P, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

#[async_trait]
impl<P: Provider> Observer for ProviderObserver<P> {
    async fn observe(&self, recent_window: &str) -> Result<Vec<CandidateMemory>, String> {
        let request = ProviderRequest {
            model: Some(self.model.clone()),
            messages: vec![ProviderMessage {
                role: Role::User,
                content: vec![ContentPart::Text {
                    text: recent_window.to_string(),
                }],
            }],
            tools: vec![],
            max_tokens: Some(512),
            temperature: Some(0.0),
            system: Some(OBSERVER_SYSTEM_PROMPT.to_string()),
            extra: serde_json::Value::Null,
        };
        let response = self
            .provider
            .complete(request)
            .await
            .map_err(|e| e.to_string())?;
        let text = response
            .content
            .iter()
            .find_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .unwrap_or_default();
        serde_json::from_str(text).map_err(|e| format!("observer response not valid JSON: {e}"))
    }
}

/// The reflector's trigger condition is implemented (`turns_since_reflection
/// >= REF_THRESHOLD`, in [`crate::MemoryService::on_turn`]); its compaction
/// algorithm is left as a logged no-op, per the spec's own open question
/// ("a placeholder in the source... conservative default of no-op, log
/// that reflection was due").
pub fn reflect(conversation_id: &str) {
    tracing::info!(conversation_id, "reflection due (no-op: compaction policy not implemented)");
}
