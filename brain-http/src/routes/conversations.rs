//! CRUD for `conversations` (SPEC_FULL.md §4.10).

use axum::extract::{Path, State};
use axum::Json;
use brain_store::Conversation;
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateConversation {
    title: Option<String>,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Conversation>>, ApiError> {
    Ok(Json(state.store().list_conversations().await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateConversation>,
) -> Result<Json<Conversation>, ApiError> {
    Ok(Json(state.store().create_conversation(req.title).await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Conversation>, ApiError> {
    state
        .store()
        .get_conversation(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(id))
}
