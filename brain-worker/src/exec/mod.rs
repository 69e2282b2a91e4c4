//! Per-job-type execution (SPEC_FULL.md §2, §4.5).

mod agent;
mod command;
mod http;

use std::sync::Arc;

use brain_proto::bus::{JobDispatch, JobType};
use brain_proto::{StateStore, Turn};

use crate::error::ExecError;

pub async fn dispatch(
    job: &JobDispatch,
    turn: &Arc<dyn Turn>,
    state_store: &Arc<dyn StateStore>,
    command_workdir: &std::path::Path,
) -> Result<serde_json::Value, ExecError> {
    match job.job_type {
        JobType::Command => command::run(job.command.as_deref(), job.vars.as_ref(), command_workdir).await,
        JobType::Http => {
            http::run(
                job.url.as_deref(),
                job.method.as_deref(),
                job.headers.as_ref(),
                job.vars.as_ref(),
            )
            .await
        }
        JobType::Agent => agent::run(turn, state_store, job.job.as_ref(), job.source.as_deref()).await,
    }
}
