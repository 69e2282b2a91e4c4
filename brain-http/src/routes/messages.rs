//! CRUD for `messages`, scoped under a conversation (SPEC_FULL.md §4.10).

use axum::extract::{Path, State};
use axum::Json;
use brain_store::{Message, Role};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateMessage {
    role: String,
    content: String,
}

pub async fn list(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError> {
    state
        .store()
        .get_conversation(&conversation_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(conversation_id.clone()))?;
    Ok(Json(state.store().list_messages(&conversation_id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Json(req): Json<CreateMessage>,
) -> Result<Json<Message>, ApiError> {
    let role = match req.role.as_str() {
        "user" => Role::User,
        "assistant" => Role::Assistant,
        other => return Err(ApiError::Validation(format!("unknown role: {other}"))),
    };
    state
        .store()
        .get_conversation(&conversation_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(conversation_id.clone()))?;
    Ok(Json(
        state
            .store()
            .insert_message(&conversation_id, role, &req.content)
            .await?,
    ))
}
