//! `models/config` and `voice-config` CRUD (SPEC_FULL.md §4.10), backed by
//! `brain-store`'s `app_config` table.

use axum::extract::{Path, State};
use axum::Json;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn get(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .store()
        .get_config(&key)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(key))
}

pub async fn put(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(value): Json<serde_json::Value>,
) -> Result<(), ApiError> {
    state.store().put_config(&key, &value).await?;
    Ok(())
}
