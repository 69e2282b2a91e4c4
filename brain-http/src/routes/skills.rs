//! CRUD for `skills` (SPEC_FULL.md §4.4, §4.10).
//!
//! `owner = system` rows are provisioned by the operator and read-only to
//! the agent's self-management tools, but this HTTP surface IS the
//! operator path — every mutation here is permitted regardless of owner.

use axum::extract::{Path, State};
use axum::Json;
use brain_store::{Skill, SkillOwner, SkillTier};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PutSkill {
    id: String,
    name: String,
    version: String,
    description: String,
    tier: SkillTier,
    transport: Option<String>,
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default)]
    config: serde_json::Value,
    #[serde(default = "default_owner")]
    owner: SkillOwner,
    stdio_command: Option<String>,
    stdio_args: Option<serde_json::Value>,
    http_url: Option<String>,
    instruction_path: Option<String>,
    instruction_content: Option<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_owner() -> SkillOwner {
    SkillOwner::System
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Skill>>, ApiError> {
    Ok(Json(state.store().list_skills().await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Skill>, ApiError> {
    state
        .store()
        .get_skill(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(id))
}

pub async fn put(
    State(state): State<AppState>,
    Json(req): Json<PutSkill>,
) -> Result<Json<Skill>, ApiError> {
    let created_at = String::new();
    let skill = Skill {
        id: req.id,
        name: req.name,
        version: req.version,
        description: req.description,
        tier: req.tier,
        transport: req.transport,
        enabled: req.enabled,
        config: req.config,
        owner: req.owner,
        stdio_command: req.stdio_command,
        stdio_args: req.stdio_args,
        http_url: req.http_url,
        instruction_path: req.instruction_path,
        instruction_content: req.instruction_content,
        created_at: created_at.clone(),
        updated_at: created_at,
    };
    Ok(Json(state.store().upsert_skill(&skill).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(), ApiError> {
    if state.store().delete_skill(&id).await? {
        Ok(())
    } else {
        Err(ApiError::NotFound(id))
    }
}
