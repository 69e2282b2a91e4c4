#![deny(missing_docs)]
//! Ephemeral task pod manager for the Brain (spec §4.9).
//!
//! `dispatch` validates mounts, builds an isolated workload spec, creates
//! it in the cluster, persists a `running` row, and spawns a listener
//! for the task's terminal result. `cancel` deletes the workload and
//! stops that listener.

mod error;
mod mount;
mod workload;

pub use error::TaskError;
pub use mount::{MountGrant, MountRequest};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use brain_bus::{subjects, BusClient};
use brain_proto::bus::{TaskResult, TaskResultStatus};
use brain_store::Store;
use k8s_openapi::api::batch::v1::Job;
use kube::api::{Api, DeleteParams, PostParams, PropagationPolicy};
use tokio::task::JoinHandle;

/// Default active deadline when a request doesn't specify one (spec §4.9).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1800);

/// Whether a task runs the full agent loop or a fixed script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskMode {
    /// Runs the agent loop inside the toolbox.
    Agent,
    /// Runs a fixed script inside the toolbox.
    Script,
}

impl TaskMode {
    /// Lowercase wire/env representation.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskMode::Agent => "agent",
            TaskMode::Script => "script",
        }
    }
}

/// A request to dispatch one ephemeral task (spec §4.9).
pub struct TaskRequest {
    /// Optional named recipe the task was built from.
    pub recipe: Option<String>,
    /// Toolbox/image identifier the task runs in.
    pub toolbox: String,
    /// Agent loop or fixed script.
    pub mode: TaskMode,
    /// The task's natural-language or script goal.
    pub goal: String,
    /// Requested mounts, validated against the manager's allowlist.
    pub mounts: Vec<MountRequest>,
    /// Wall-clock deadline; defaults to [`DEFAULT_TIMEOUT`].
    pub timeout: Duration,
    /// CPU resource limit (Kubernetes quantity syntax).
    pub cpu_limit: String,
    /// Memory resource limit (Kubernetes quantity syntax).
    pub mem_limit: String,
}

impl TaskRequest {
    /// Build a request with the spec-mandated default timeout and
    /// conservative resource caps.
    pub fn new(toolbox: impl Into<String>, mode: TaskMode, goal: impl Into<String>) -> Self {
        Self {
            recipe: None,
            toolbox: toolbox.into(),
            mode,
            goal: goal.into(),
            mounts: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            cpu_limit: "1".to_string(),
            mem_limit: "512Mi".to_string(),
        }
    }
}

/// Manages ephemeral, isolated task pods. `mount_allowlist` is the
/// explicit allowlist every request's mounts are checked against; an
/// empty allowlist denies all mounts.
#[derive(Clone)]
pub struct TaskManager {
    store: Store,
    bus: BusClient,
    jobs: Api<Job>,
    mount_allowlist: Vec<String>,
    listeners: Arc<Mutex<HashMap<String, JoinHandle<()>>>>,
}

impl TaskManager {
    /// Build a task manager bound to one Kubernetes namespace.
    pub fn new(store: Store, bus: BusClient, kube_client: kube::Client, namespace: &str, mount_allowlist: Vec<String>) -> Self {
        Self {
            store,
            bus,
            jobs: Api::namespaced(kube_client, namespace),
            mount_allowlist,
            listeners: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Dispatch a new task pod. Returns the task id immediately; the
    /// pod runs and reports its result asynchronously.
    pub async fn dispatch(&self, request: TaskRequest) -> Result<String, TaskError> {
        let grants = mount::validate_mounts(&request.mounts, &self.mount_allowlist)?;

        let task_id = uuid::Uuid::new_v4().to_string();
        let job = workload::build_job(
            &task_id,
            &request.toolbox,
            request.mode,
            &request.goal,
            &grants,
            request.timeout,
            &request.cpu_limit,
            &request.mem_limit,
        );
        let job_name = job.metadata.name.clone().unwrap_or_default();

        let mounts_json = if request.mounts.is_empty() {
            None
        } else {
            Some(serde_json::to_value(
                grants
                    .iter()
                    .map(|g| serde_json::json!({"path": g.path, "readOnly": g.read_only}))
                    .collect::<Vec<_>>(),
            )?)
        };

        self.store
            .insert_task_pod(
                &task_id,
                request.recipe.as_deref(),
                &request.toolbox,
                request.mode.as_str(),
                &request.goal,
                mounts_json.as_ref(),
                &job_name,
            )
            .await?;

        self.jobs.create(&PostParams::default(), &job).await?;

        self.spawn_result_listener(task_id.clone()).await?;

        Ok(task_id)
    }

    async fn spawn_result_listener(&self, task_id: String) -> Result<(), TaskError> {
        let stream = self
            .bus
            .ensure_stream("tasks", vec![subjects::TASKS_RESULT_WILDCARD.to_string()])
            .await?;
        let consumer = self
            .bus
            .durable_consumer(
                &stream,
                &format!("task-result-{task_id}"),
                &subjects::task_result(&task_id),
                Duration::from_secs(30),
                5,
            )
            .await?;

        let store = self.store.clone();
        let listeners = self.listeners.clone();
        let id = task_id.clone();

        let handle = tokio::spawn(async move {
            loop {
                match consumer.next::<TaskResult>().await {
                    Ok(delivered) => {
                        let result = &delivered.payload;
                        let status = match result.status {
                            TaskResultStatus::Completed => "completed",
                            TaskResultStatus::Failed => "failed",
                            TaskResultStatus::Timeout => "timeout",
                        };
                        if let Err(err) = store
                            .complete_task_pod(
                                &id,
                                status,
                                result.result.as_ref(),
                                result.error.as_deref(),
                                result.duration_ms as i64,
                                result.files_changed.as_deref(),
                            )
                            .await
                        {
                            tracing::error!(task_id = %id, error = %err, "task: failed to persist terminal result");
                        }
                        delivered.ack().await.ok();
                        break;
                    }
                    Err(err) => {
                        tracing::error!(task_id = %id, error = %err, "task: result consumer error, retrying");
                    }
                }
            }
            listeners.lock().unwrap_or_else(|p| p.into_inner()).remove(&id);
        });

        self.listeners
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(task_id, handle);
        Ok(())
    }

    /// Cancel a running task: delete its workload and stop listening for
    /// a result that will never arrive.
    pub async fn cancel(&self, task_id: &str) -> Result<(), TaskError> {
        let pod = self
            .store
            .get_task_pod(task_id)
            .await?
            .ok_or_else(|| TaskError::NotFound(task_id.to_string()))?;

        let delete_params = DeleteParams {
            propagation_policy: Some(PropagationPolicy::Background),
            ..Default::default()
        };
        self.jobs.delete(&pod.job_name, &delete_params).await?;

        if let Some(handle) = self
            .listeners
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .remove(task_id)
        {
            handle.abort();
        }

        self.store
            .complete_task_pod(task_id, "cancelled", None, Some("cancelled by caller"), 0, None)
            .await?;
        Ok(())
    }
}
