//! Agent-mode job execution: run the job's `job` payload through a
//! turn (SPEC_FULL.md §2, §4.5). The payload shape is intentionally
//! small: `{ "message": string, "session"?: string }`. `source` (e.g.
//! `"schedule"`) becomes the turn's trigger when it names one of the
//! protocol's known triggers, and an opaque custom trigger otherwise.

use std::sync::Arc;

use brain_proto::effect::LogLevel;
use brain_proto::turn::TriggerType;
use brain_proto::{Content, Effect, SessionId, StateStore, Turn, TurnInput, TurnOutput};

use crate::error::ExecError;

#[derive(serde::Deserialize)]
struct AgentPayload {
    message: String,
    session: Option<String>,
}

pub async fn run(
    turn: &Arc<dyn Turn>,
    state_store: &Arc<dyn StateStore>,
    job: Option<&serde_json::Value>,
    source: Option<&str>,
) -> Result<serde_json::Value, ExecError> {
    let job = job.cloned().unwrap_or(serde_json::Value::Null);
    let payload: AgentPayload = serde_json::from_value(job).map_err(ExecError::BadPayload)?;

    let mut input = TurnInput::new(Content::Text(payload.message), trigger_for(source));
    input.session = payload.session.map(SessionId::new);

    let output: TurnOutput = turn.execute(input).await.map_err(ExecError::Turn)?;
    apply_effects(state_store, &output.effects).await;
    Ok(serde_json::json!({
        "message": output.message,
        "exit_reason": output.exit_reason,
    }))
}

/// Applies the effects a turn declared but did not execute itself. Mirrors
/// `brain-http`'s `routes::chat::apply_effects` — `Delegate`/`Handoff`/
/// `Signal` need an orchestrator agent-mode jobs don't have here, so
/// they're logged rather than dropped silently.
async fn apply_effects(state_store: &Arc<dyn StateStore>, effects: &[Effect]) {
    for effect in effects {
        match effect {
            Effect::WriteMemory { scope, key, value } => {
                if let Err(err) = state_store.write(scope, key, value.clone()).await {
                    tracing::warn!(key = %key, error = %err, "agent job: failed to apply write_memory effect");
                }
            }
            Effect::DeleteMemory { scope, key } => {
                if let Err(err) = state_store.delete(scope, key).await {
                    tracing::warn!(key = %key, error = %err, "agent job: failed to apply delete_memory effect");
                }
            }
            Effect::Log { level, message, .. } => match level {
                LogLevel::Error => tracing::error!(%message, "turn effect"),
                LogLevel::Warn => tracing::warn!(%message, "turn effect"),
                LogLevel::Info => tracing::info!(%message, "turn effect"),
                _ => tracing::debug!(%message, "turn effect"),
            },
            other => tracing::info!(effect = ?other, "agent job: effect not actioned by the worker"),
        }
    }
}

fn trigger_for(source: Option<&str>) -> TriggerType {
    match source {
        Some("schedule") => TriggerType::Schedule,
        Some("agent") => TriggerType::Task,
        Some("http") => TriggerType::User,
        Some(other) => TriggerType::Custom(other.to_string()),
        None => TriggerType::Task,
    }
}
