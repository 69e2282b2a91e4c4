//! Wire envelopes carried over the durable message bus.
//!
//! These are plain serde structs/enums, not traits — the bus transport
//! itself (subjects, queue groups, ack semantics) is `brain-bus`'s concern.
//! Keeping the envelope shapes here means every crate that needs to read or
//! construct one (`brain-dispatch`, `brain-schedule`, `brain-transfer`,
//! `brain-task`, `brain-agent`) shares a single definition.

use serde::{Deserialize, Serialize};

/// A request to run a job, published by the Brain onto `jobs.dispatch`.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDispatch {
    /// Unique job identifier, assigned by the dispatcher.
    pub job_id: String,
    /// What kind of job this is.
    #[serde(rename = "type")]
    pub job_type: JobType,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
    /// Agent-mode job payload (present iff `job_type == Agent`).
    pub job: Option<serde_json::Value>,
    /// Command-mode shell command (present iff `job_type == Command`).
    pub command: Option<String>,
    /// HTTP-mode target URL (present iff `job_type == Http`).
    pub url: Option<String>,
    /// HTTP-mode method.
    pub method: Option<String>,
    /// HTTP-mode headers.
    pub headers: Option<serde_json::Value>,
    /// Template variables available to the job.
    pub vars: Option<serde_json::Value>,
    /// Who triggered this job (`"schedule"`, `"agent"`, `"http"`, …).
    pub source: Option<String>,
    /// Distributed-trace propagation context (W3C traceparent or similar).
    pub trace_context: Option<String>,
}

impl JobDispatch {
    /// Build an envelope with its required fields; mode-specific fields
    /// (`job`/`command`/`url`/…) default to `None` and are set by the
    /// caller afterward.
    pub fn new(job_id: impl Into<String>, job_type: JobType, created_at: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            job_type,
            created_at: created_at.into(),
            job: None,
            command: None,
            url: None,
            method: None,
            headers: None,
            vars: None,
            source: None,
            trace_context: None,
        }
    }
}

/// What kind of job a [`JobDispatch`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    /// Run through the agent loop.
    Agent,
    /// Run a shell command in the worker's sandbox.
    Command,
    /// Issue an HTTP request.
    Http,
}

/// A status update published by a worker on `jobs.status.<jobId>`.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatus {
    /// The job this update concerns.
    pub job_id: String,
    /// Which worker process emitted this update.
    pub worker_id: String,
    /// The new status.
    pub status: JobState,
    /// Result payload (present only on `status == Completed`).
    pub result: Option<serde_json::Value>,
    /// Error string (present only on `status == Failed`).
    pub error: Option<String>,
    /// Wall-clock duration once terminal.
    pub duration_ms: Option<u64>,
    /// Trace id echoed back for correlation.
    pub trace_id: Option<String>,
}

impl JobStatus {
    /// Build a status update with its required fields; `result`/`error`/
    /// `duration_ms`/`trace_id` default to `None`.
    pub fn new(job_id: impl Into<String>, worker_id: impl Into<String>, status: JobState) -> Self {
        Self {
            job_id: job_id.into(),
            worker_id: worker_id.into(),
            status,
            result: None,
            error: None,
            duration_ms: None,
            trace_id: None,
        }
    }
}

/// The lifecycle state of a job row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Published to the bus, not yet picked up.
    Dispatched,
    /// A worker claimed it.
    Received,
    /// A worker is executing it.
    Running,
    /// Finished successfully. Terminal.
    Completed,
    /// Finished with an error. Terminal.
    Failed,
}

impl JobState {
    /// Terminal states are immutable once reached (§3 of the spec).
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

/// Published by a joining Brain instance to announce it wants to become
/// active (`transfer.ready`).
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferReady {
    /// The joining instance's id.
    pub id: String,
    /// The joining instance's software version.
    pub version: String,
    /// ISO-8601 timestamp.
    pub timestamp: String,
}

impl TransferReady {
    /// Build a `transfer.ready` announcement.
    pub fn new(id: impl Into<String>, version: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self { id: id.into(), version: version.into(), timestamp: timestamp.into() }
    }
}

/// Published by the active instance once it has drained and written a
/// handoff note (`transfer.clear`).
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferClear {
    /// The active instance's id.
    pub id: String,
    /// The handoff note the joining instance should read.
    pub handoff_note_id: String,
    /// ISO-8601 timestamp.
    pub timestamp: String,
}

impl TransferClear {
    /// Build a `transfer.clear` announcement.
    pub fn new(id: impl Into<String>, handoff_note_id: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self { id: id.into(), handoff_note_id: handoff_note_id.into(), timestamp: timestamp.into() }
    }
}

/// Published by the joining instance once it has read the handoff note and
/// is ready to take over (`transfer.ack`).
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferAck {
    /// The joining instance's id.
    pub id: String,
    /// ISO-8601 timestamp.
    pub timestamp: String,
}

impl TransferAck {
    /// Build a `transfer.ack` announcement.
    pub fn new(id: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self { id: id.into(), timestamp: timestamp.into() }
    }
}

/// Published by either side to abandon an in-progress handoff
/// (`transfer.abort`).
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferAbort {
    /// The publishing instance's id.
    pub id: String,
    /// Why the handoff is being aborted.
    pub reason: String,
    /// ISO-8601 timestamp.
    pub timestamp: String,
}

impl TransferAbort {
    /// Build a `transfer.abort` announcement.
    pub fn new(id: impl Into<String>, reason: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self { id: id.into(), reason: reason.into(), timestamp: timestamp.into() }
    }
}

/// Published by an MCP extension server announcing itself to the Brain
/// (`extensions.announce`).
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionAnnounce {
    /// Extension's self-assigned id.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Extension's own version string.
    pub version: String,
    /// Human-readable description.
    pub description: String,
    /// The streamable-HTTP endpoint to reach it at.
    pub mcp_url: String,
    /// Transport kind. Always `"streamable-http"` for announced extensions
    /// (stdio extensions are configured directly as skills, not announced).
    pub transport: String,
    /// Tool names the extension claims to expose, if known up front.
    pub tools: Option<Vec<String>>,
    /// Free-form tags for discovery/filtering.
    pub tags: Option<Vec<String>>,
}

/// Liveness ping from an announced extension (`extensions.<id>.heartbeat`).
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Heartbeat {
    /// Extension id this heartbeat is for.
    pub id: String,
    /// ISO-8601 timestamp.
    pub timestamp: String,
    /// Extension process uptime in seconds.
    pub uptime: u64,
    /// Number of requests the extension is currently handling.
    pub active_requests: u32,
}

/// Terminal result from an ephemeral task pod (`tasks.result.<taskId>`).
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    /// The task this result is for.
    pub task_id: String,
    /// Terminal status.
    pub status: TaskResultStatus,
    /// Result payload on success.
    pub result: Option<serde_json::Value>,
    /// Error string on failure.
    pub error: Option<String>,
    /// Wall-clock duration.
    pub duration_ms: u64,
    /// Files the task modified, if the toolbox reports that.
    pub files_changed: Option<Vec<String>>,
    /// Trace id echoed back for correlation.
    pub trace_id: Option<String>,
}

/// How an ephemeral task pod finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskResultStatus {
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Failed,
    /// Killed after exceeding its deadline.
    Timeout,
}
