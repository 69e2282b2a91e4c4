//! Subject name builders for the topics in SPEC_FULL.md §4.1.
//!
//! Centralised here so the dispatcher, schedule manager, transfer state
//! machine, and task manager never hand-format a subject string twice with
//! subtly different separators.

/// Subject workers pull `JobDispatch` envelopes from, as a queue group.
pub const JOBS_DISPATCH: &str = "jobs.dispatch";

/// Subject prefix for `JobStatus` updates. Brain subscribes with a wildcard.
pub const JOBS_STATUS_WILDCARD: &str = "jobs.status.*";

/// The subject a worker publishes a status update for one job to.
pub fn job_status(job_id: &str) -> String {
    format!("jobs.status.{job_id}")
}

/// Published by a joining instance to announce it wants to activate.
pub const TRANSFER_READY: &str = "transfer.ready";

/// Published by the active instance once it has drained and written a
/// handoff note.
pub const TRANSFER_CLEAR: &str = "transfer.clear";

/// Published by the joining instance once it has read the handoff note.
pub const TRANSFER_ACK: &str = "transfer.ack";

/// Published by either side to abandon an in-progress handoff.
pub const TRANSFER_ABORT: &str = "transfer.abort";

/// Published by an MCP extension server announcing itself.
pub const EXTENSIONS_ANNOUNCE: &str = "extensions.announce";

/// Subject prefix for extension heartbeats. Brain subscribes with a
/// wildcard.
pub const EXTENSIONS_HEARTBEAT_WILDCARD: &str = "extensions.*.heartbeat";

/// The subject one extension publishes heartbeats to.
pub fn extension_heartbeat(extension_id: &str) -> String {
    format!("extensions.{extension_id}.heartbeat")
}

/// Subject prefix for ephemeral task results. Brain subscribes with a
/// wildcard.
pub const TASKS_RESULT_WILDCARD: &str = "tasks.result.*";

/// The subject a task pod publishes its terminal result to.
pub fn task_result(task_id: &str) -> String {
    format!("tasks.result.{task_id}")
}
