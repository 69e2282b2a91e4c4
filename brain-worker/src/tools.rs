//! Built-in tools bound into agent-mode jobs' `ToolRegistry`
//! (SPEC_FULL.md §4.4). Mirrors `brain`'s own `tools.rs` — an agent-mode
//! job can dispatch and poll further jobs against the same store the
//! `brain` daemon writes into.

use std::pin::Pin;

use brain_dispatch::DispatchRequest;
use brain_proto::bus::JobType;
use brain_store::Store;
use brain_tool::{ToolDyn, ToolError};
use serde_json::{json, Value};

/// `dispatch_job`: hand a command/http/agent job to the dispatcher and
/// return its id immediately.
pub struct DispatchJobTool {
    bus: brain_bus::BusClient,
    store: Store,
}

impl DispatchJobTool {
    /// Build the tool over an already-connected bus and store.
    pub fn new(bus: brain_bus::BusClient, store: Store) -> Self {
        Self { bus, store }
    }
}

#[derive(serde::Deserialize)]
struct DispatchJobInput {
    #[serde(rename = "type")]
    job_type: JobType,
    job: Option<Value>,
    command: Option<String>,
    url: Option<String>,
    method: Option<String>,
    headers: Option<Value>,
    vars: Option<Value>,
}

impl ToolDyn for DispatchJobTool {
    fn name(&self) -> &str {
        "dispatch_job"
    }

    fn description(&self) -> &str {
        "Dispatch a command, http, or agent job to a worker and return its job id"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "type": {"type": "string", "enum": ["command", "http", "agent"]},
                "job": {"type": "object"},
                "command": {"type": "string"},
                "url": {"type": "string"},
                "method": {"type": "string"},
                "headers": {"type": "object"},
                "vars": {"type": "object"},
            },
            "required": ["type"],
        })
    }

    fn call(
        &self,
        input: Value,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Value, ToolError>> + Send + '_>> {
        Box::pin(async move {
            let input: DispatchJobInput = serde_json::from_value(input)
                .map_err(|err| ToolError::InvalidInput(err.to_string()))?;
            let request = DispatchRequest {
                job_type: input.job_type,
                job: input.job,
                command: input.command,
                url: input.url,
                method: input.method,
                headers: input.headers,
                vars: input.vars,
                source: Some("agent".to_string()),
            };
            let job_id = brain_dispatch::dispatch(&self.bus, &self.store, request)
                .await
                .map_err(|err| ToolError::ExecutionFailed(err.to_string()))?;
            Ok(json!({ "job_id": job_id }))
        })
    }
}

/// `get_job_status`: look up one job's current row.
pub struct GetJobStatusTool {
    store: Store,
}

impl GetJobStatusTool {
    /// Build the tool over the shared store.
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[derive(serde::Deserialize)]
struct JobIdInput {
    job_id: String,
}

impl ToolDyn for GetJobStatusTool {
    fn name(&self) -> &str {
        "get_job_status"
    }

    fn description(&self) -> &str {
        "Fetch the current status and result of a previously dispatched job"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"job_id": {"type": "string"}},
            "required": ["job_id"],
        })
    }

    fn call(
        &self,
        input: Value,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Value, ToolError>> + Send + '_>> {
        Box::pin(async move {
            let input: JobIdInput = serde_json::from_value(input)
                .map_err(|err| ToolError::InvalidInput(err.to_string()))?;
            let job = self
                .store
                .get_job(&input.job_id)
                .await
                .map_err(|err| ToolError::ExecutionFailed(err.to_string()))?
                .ok_or_else(|| ToolError::InvalidInput(format!("unknown job: {}", input.job_id)))?;
            serde_json::to_value(job).map_err(|err| ToolError::ExecutionFailed(err.to_string()))
        })
    }
}

/// `list_jobs`: list every job the store has ever dispatched, newest first.
pub struct ListJobsTool {
    store: Store,
}

impl ListJobsTool {
    /// Build the tool over the shared store.
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

impl ToolDyn for ListJobsTool {
    fn name(&self) -> &str {
        "list_jobs"
    }

    fn description(&self) -> &str {
        "List all dispatched jobs, newest first"
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    fn call(
        &self,
        _input: Value,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Value, ToolError>> + Send + '_>> {
        Box::pin(async move {
            let jobs = self
                .store
                .list_jobs()
                .await
                .map_err(|err| ToolError::ExecutionFailed(err.to_string()))?;
            serde_json::to_value(jobs).map_err(|err| ToolError::ExecutionFailed(err.to_string()))
        })
    }
}
