//! CRUD for `schedules` (SPEC_FULL.md §4.6, §4.10). Mutations go through
//! [`brain_schedule::ScheduleManager`] rather than the store directly, so
//! the in-process timer stays in sync with the row.

use axum::extract::{Path, State};
use axum::Json;
use brain_store::{Schedule, WorkType};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSchedule {
    name: String,
    cron_expr: String,
    job_type: WorkType,
    config: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSchedule {
    name: String,
    cron_expr: String,
    job_type: WorkType,
    config: serde_json::Value,
    enabled: bool,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Schedule>>, ApiError> {
    Ok(Json(state.store().list_schedules().await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Schedule>, ApiError> {
    state
        .store()
        .get_schedule(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(id))
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateSchedule>,
) -> Result<Json<Schedule>, ApiError> {
    Ok(Json(
        state
            .schedules()
            .create(&req.name, &req.cron_expr, req.job_type, req.config)
            .await?,
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateSchedule>,
) -> Result<Json<Schedule>, ApiError> {
    Ok(Json(
        state
            .schedules()
            .update(&id, &req.name, &req.cron_expr, req.job_type, &req.config, req.enabled)
            .await?,
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(), ApiError> {
    if state.schedules().delete(&id).await? {
        Ok(())
    } else {
        Err(ApiError::NotFound(id))
    }
}

pub async fn trigger(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let job_id = state.schedules().trigger(&id).await?;
    Ok(Json(serde_json::json!({ "jobId": job_id })))
}
