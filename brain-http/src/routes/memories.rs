//! CRUD for `memories` (SPEC_FULL.md §4.7, §4.10).

use axum::extract::{Path, Query, State};
use axum::Json;
use brain_memory::{MemoryEntry, MemoryHit};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StoreMemory {
    content: String,
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchMemory {
    q: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    5
}

pub async fn search(
    State(state): State<AppState>,
    Query(req): Query<SearchMemory>,
) -> Result<Json<Vec<MemoryHit>>, ApiError> {
    Ok(Json(state.memory().search(&req.q, req.limit).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<StoreMemory>,
) -> Result<Json<MemoryEntry>, ApiError> {
    if req.content.trim().is_empty() {
        return Err(ApiError::Validation("content must not be empty".into()));
    }
    Ok(Json(
        state.memory().store(&req.content, req.category.as_deref()).await?,
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(), ApiError> {
    Ok(state.memory().remove(&id).await?)
}
