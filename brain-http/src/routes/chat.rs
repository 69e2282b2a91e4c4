//! `POST /chat` and `POST /chat/stream` (SPEC_FULL.md §4.2, §4.10).

use std::convert::Infallible;
use std::time::Duration;

use async_stream::stream;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::Json;
use brain_proto::effect::LogLevel;
use brain_proto::turn::{TriggerType, TurnInput};
use brain_proto::{Content, Effect};
use brain_store::Role;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body shared by both chat routes.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    message: String,
    #[serde(rename = "conversationId")]
    conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    response: String,
    #[serde(rename = "conversationId")]
    conversation_id: String,
}

/// If `conversation_id` names an existing conversation, use it; else
/// create a fresh one and initialise its `MemoryState` (spec.md §4.2
/// step 1). The id returned is always the canonical one to reply with.
async fn resolve_conversation(
    state: &AppState,
    conversation_id: Option<String>,
) -> Result<String, ApiError> {
    if let Some(id) = conversation_id {
        if state.store().get_conversation(&id).await?.is_some() {
            return Ok(id);
        }
    }
    Ok(state.store().create_conversation(None).await?.id)
}

fn build_input(message: &str, conversation_id: &str) -> TurnInput {
    let mut input = TurnInput::new(Content::Text(message.to_string()), TriggerType::User);
    input.session = Some(brain_proto::SessionId::new(conversation_id));
    input
}

fn text_of(content: &Content) -> String {
    match content {
        Content::Text(text) => text.clone(),
        Content::Blocks(blocks) => blocks
            .iter()
            .filter_map(|block| match block {
                brain_proto::content::ContentBlock::Text { text } => Some(text.clone()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Rough chars/4 token estimate — good enough for the observer/reflector
/// thresholds, which only need to fire in the right ballpark.
fn approx_tokens(text: &str) -> i64 {
    (text.chars().count() as i64 / 4).max(1)
}

/// Apply the side-effects a turn declared but did not execute itself
/// (SPEC_FULL.md §4.2; `brain_proto::turn::TurnOutput::effects`'s own
/// doc comment: "the calling layer decides when and how to execute
/// them"). `Delegate`/`Handoff`/`Signal` need an orchestrator this HTTP
/// surface doesn't have — they're logged, not dropped silently.
async fn apply_effects(state: &AppState, effects: &[Effect]) {
    for effect in effects {
        match effect {
            Effect::WriteMemory { scope, key, value } => {
                if let Err(err) = state.state_store().write(scope, key, value.clone()).await {
                    tracing::warn!(key = %key, error = %err, "chat: failed to apply write_memory effect");
                }
            }
            Effect::DeleteMemory { scope, key } => {
                if let Err(err) = state.state_store().delete(scope, key).await {
                    tracing::warn!(key = %key, error = %err, "chat: failed to apply delete_memory effect");
                }
            }
            Effect::Log { level, message, .. } => match level {
                LogLevel::Error => tracing::error!(%message, "turn effect"),
                LogLevel::Warn => tracing::warn!(%message, "turn effect"),
                LogLevel::Info => tracing::info!(%message, "turn effect"),
                _ => tracing::debug!(%message, "turn effect"),
            },
            other => tracing::info!(effect = ?other, "chat: effect not actioned by the http surface"),
        }
    }
}

/// `POST /chat` — one synchronous tool-use loop.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if req.message.trim().is_empty() {
        return Err(ApiError::Validation("message must not be empty".into()));
    }

    let conversation_id = resolve_conversation(&state, req.conversation_id).await?;
    state
        .store()
        .insert_message(&conversation_id, Role::User, &req.message)
        .await?;

    let input = build_input(&req.message, &conversation_id);
    let output = state.turn().execute(input).await?;
    let response_text = text_of(&output.message);

    state
        .store()
        .insert_message(&conversation_id, Role::Assistant, &response_text)
        .await?;
    apply_effects(&state, &output.effects).await;

    let recent_window = format!("user: {}\nassistant: {response_text}", req.message);
    let tokens = approx_tokens(&req.message) + approx_tokens(&response_text);
    if let Err(err) = state.memory().on_turn(&conversation_id, tokens, &recent_window).await {
        tracing::warn!(conversation_id = %conversation_id, error = %err, "chat: on_turn failed");
    }

    Ok(Json(ChatResponse {
        response: response_text,
        conversation_id,
    }))
}

/// `POST /chat/stream` — SSE framing of the same loop.
///
/// `brain_proto::Turn::execute` is non-streaming: one call returns one
/// `TurnOutput`. The agent loop's own `thinking`/`tool_result` events are
/// internal to the implementation behind that boundary (SPEC_FULL.md §4.2
/// step 4), so this route synthesises the public event vocabulary from
/// `TurnOutput.metadata.tools_called` after the call completes, then emits
/// a final `delta` + `done` — a single batch rather than a true token
/// stream, since the `Turn` trait deliberately gives callers no finer
/// granularity than "the whole turn."
pub async fn chat_stream(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> impl IntoResponse {
    let events = stream! {
        let conversation_id = match resolve_conversation(&state, req.conversation_id.clone()).await {
            Ok(id) => id,
            Err(err) => {
                yield sse_json("error", serde_json::json!({ "message": err.to_string() }));
                return;
            }
        };
        if let Err(err) = state
            .store()
            .insert_message(&conversation_id, Role::User, &req.message)
            .await
        {
            yield sse_json("error", serde_json::json!({ "message": err.to_string() }));
            return;
        }

        let input = build_input(&req.message, &conversation_id);
        match state.turn().execute(input).await {
            Ok(output) => {
                for call in &output.metadata.tools_called {
                    yield sse_json(
                        "thinking",
                        serde_json::json!({ "tool": call.name, "input": serde_json::Value::Null }),
                    );
                    yield sse_json(
                        "tool_result",
                        serde_json::json!({
                            "tool": call.name,
                            "summary": if call.success { "ok" } else { "failed" },
                        }),
                    );
                }
                let text = text_of(&output.message);

                if let Err(err) = state
                    .store()
                    .insert_message(&conversation_id, Role::Assistant, &text)
                    .await
                {
                    tracing::warn!(conversation_id = %conversation_id, error = %err, "chat_stream: failed to persist assistant message");
                }
                apply_effects(&state, &output.effects).await;

                let recent_window = format!("user: {}\nassistant: {text}", req.message);
                let tokens = approx_tokens(&req.message) + approx_tokens(&text);
                if let Err(err) = state.memory().on_turn(&conversation_id, tokens, &recent_window).await {
                    tracing::warn!(conversation_id = %conversation_id, error = %err, "chat_stream: on_turn failed");
                }

                yield sse_json("delta", serde_json::json!({ "text": text }));
                yield sse_json(
                    "done",
                    serde_json::json!({
                        "conversationId": conversation_id,
                        "jobIds": Vec::<String>::new(),
                        "toolCallCount": output.metadata.tools_called.len(),
                    }),
                );
            }
            Err(err) => {
                yield sse_json("error", serde_json::json!({ "message": err.to_string() }));
            }
        }
    };
    Sse::new(events).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

fn sse_json(event: &str, payload: serde_json::Value) -> Result<Event, Infallible> {
    Ok(Event::default().event(event).json_data(payload).unwrap_or_else(|_| {
        Event::default().event("error").data("event serialization failed")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_proto::content::ContentBlock;

    #[test]
    fn text_of_plain_text_passes_through() {
        assert_eq!(text_of(&Content::Text("hello".into())), "hello");
    }

    #[test]
    fn text_of_joins_text_blocks_and_skips_others() {
        let content = Content::Blocks(vec![
            ContentBlock::Text { text: "first".into() },
            ContentBlock::ToolUse {
                id: "t1".into(),
                name: "search".into(),
                input: serde_json::Value::Null,
            },
            ContentBlock::Text { text: "second".into() },
        ]);
        assert_eq!(text_of(&content), "first\nsecond");
    }

    #[test]
    fn build_input_carries_the_conversation_id_as_a_session() {
        let input = build_input("hi", "conv-1");
        assert_eq!(input.session.unwrap().as_str(), "conv-1");
    }

    #[test]
    fn approx_tokens_never_returns_zero() {
        assert_eq!(approx_tokens(""), 1);
        assert!(approx_tokens("a rather long message indeed") > 1);
    }
}
