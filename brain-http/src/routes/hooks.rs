//! `POST /hooks/:plugin` (SPEC_FULL.md §4.10) — forwards an arbitrary
//! external trigger event to a named plugin.
//!
//! There is no `TriggerEvent`/`onTrigger` protocol in `brain_proto`; the
//! closest seam the protocol offers is [`brain_proto::hook::Hook`]. This
//! bridges the external event onto [`HookPoint::PreToolUse`] with
//! `tool_name` set to the plugin name and `tool_input` set to the posted
//! payload — the plugin's hook sees "a tool named after me is about to be
//! used" and can `Halt`, `SkipTool`, or rewrite the input exactly as it
//! would for an in-loop tool call.

use axum::extract::{Path, State};
use axum::Json;
use brain_proto::hook::{HookContext, HookPoint};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn trigger(
    State(state): State<AppState>,
    Path(plugin): Path<String>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let hook = state
        .hook(&plugin)
        .ok_or_else(|| ApiError::NotFound(plugin.clone()))?;

    let mut ctx = HookContext::new(HookPoint::PreToolUse);
    ctx.tool_name = Some(plugin);
    ctx.tool_input = Some(payload);

    let action = hook
        .on_event(&ctx)
        .await
        .map_err(|err| ApiError::Upstream(err.to_string()))?;
    Ok(Json(serde_json::to_value(action).unwrap_or(serde_json::Value::Null)))
}
