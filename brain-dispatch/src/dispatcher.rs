//! `dispatch(job)`: assign an id, persist, publish, return immediately.

use brain_bus::{subjects, BusClient};
use brain_proto::bus::{JobDispatch, JobType};
use brain_store::{Store, WorkType};

use crate::error::DispatchError;

/// The job a caller wants dispatched. Mirrors [`JobDispatch`]'s payload
/// fields minus the ones the dispatcher itself assigns (`job_id`,
/// `created_at`).
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    /// What kind of job this is.
    pub job_type: JobType,
    /// Agent-mode payload.
    pub job: Option<serde_json::Value>,
    /// Command-mode shell command.
    pub command: Option<String>,
    /// HTTP-mode target URL.
    pub url: Option<String>,
    /// HTTP-mode method.
    pub method: Option<String>,
    /// HTTP-mode headers.
    pub headers: Option<serde_json::Value>,
    /// Template variables.
    pub vars: Option<serde_json::Value>,
    /// Who is dispatching this (`"schedule"`, `"agent"`, `"http"`, …).
    pub source: Option<String>,
}

impl DispatchRequest {
    /// A bare command-mode request with no vars/headers/source set.
    pub fn command(command: impl Into<String>) -> Self {
        Self {
            job_type: JobType::Command,
            job: None,
            command: Some(command.into()),
            url: None,
            method: None,
            headers: None,
            vars: None,
            source: None,
        }
    }

    /// Attach a `source` (who dispatched this job).
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

fn to_work_type(job_type: JobType) -> WorkType {
    match job_type {
        JobType::Agent => WorkType::Agent,
        JobType::Command => WorkType::Command,
        JobType::Http => WorkType::Http,
    }
}

/// Assigns a fresh job id, persists `status = dispatched`, then publishes
/// a [`JobDispatch`] envelope (with a W3C-style trace context) and returns
/// the id immediately — the caller never blocks on worker execution.
///
/// Persisting before publishing matters: a worker can pick up the
/// envelope and publish `received`/`running` status before this function
/// returns, and the status tracker needs the `dispatched` row to already
/// exist when that happens.
pub async fn dispatch(
    bus: &BusClient,
    store: &Store,
    request: DispatchRequest,
) -> Result<String, DispatchError> {
    let job_id = uuid::Uuid::new_v4().to_string();
    let trace_context = format!(
        "00-{}-{}-01",
        uuid::Uuid::new_v4().simple(),
        &uuid::Uuid::new_v4().simple().to_string()[..16]
    );
    let mut envelope = JobDispatch::new(job_id.clone(), request.job_type, chrono::Utc::now().to_rfc3339());
    envelope.job = request.job;
    envelope.command = request.command;
    envelope.url = request.url;
    envelope.method = request.method;
    envelope.headers = request.headers;
    envelope.vars = request.vars;
    envelope.source = request.source.clone();
    envelope.trace_context = Some(trace_context);

    store
        .insert_job_dispatched(&job_id, to_work_type(request.job_type), request.source.as_deref())
        .await?;
    bus.publish(subjects::JOBS_DISPATCH, &envelope).await?;

    Ok(job_id)
}
