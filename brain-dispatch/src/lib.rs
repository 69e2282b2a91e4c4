#![deny(missing_docs)]
//! Dispatcher, Status Tracker, and zombie reaper for the Brain
//! (SPEC_FULL.md §4.5).
//!
//! [`dispatch`] assigns a job id, persists `status = dispatched`, and
//! then publishes the envelope without waiting on the worker. The status
//! tracker ([`tracker::run`]) persists every `jobs.status.*` update and
//! wakes local waiters via [`JobEvents`] on the terminal transition.
//! [`wait_for_completion`] is how a caller (the agent loop, the HTTP
//! surface) blocks on a specific job without polling.

mod dispatcher;
mod error;
mod events;
mod tracker;

pub use dispatcher::{dispatch, DispatchRequest};
pub use error::DispatchError;
pub use events::JobEvents;
pub use tracker::{run as run_status_tracker, run_reaper, subscribe, REAPER_IDLE_THRESHOLD, REAPER_SCAN_INTERVAL};

use std::time::Duration;

use brain_store::{Job, JobStatus, Store};

/// Default timeout for [`wait_for_completion`], matching spec §4.5.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_millis(120_000);

/// Block until `job_id` reaches a terminal status, or `timeout` elapses.
///
/// 1. If the persisted row is already terminal, resolves immediately.
/// 2. Otherwise registers a [`JobEvents`] listener *before* re-checking
///    the row, closing the race where the terminal update landed between
///    the first read and listener registration.
/// 3. On timeout, force-fails the job with `reason = "did not complete
///    within Ns"` and returns it with `status = failed`.
pub async fn wait_for_completion(
    store: &Store,
    events: &JobEvents,
    job_id: &str,
    timeout: Duration,
) -> Result<Job, DispatchError> {
    let row = store
        .get_job(job_id)
        .await?
        .ok_or_else(|| DispatchError::UnknownJob(job_id.to_string()))?;
    if row.status.is_terminal() {
        return Ok(row);
    }

    let notify = events.handle_for(job_id);
    let notified = notify.notified();

    // Race protection: the terminal update may have landed and already
    // notified (and been removed from the registry) between our first
    // read and subscribing here — re-check before waiting.
    let row = store
        .get_job(job_id)
        .await?
        .ok_or_else(|| DispatchError::UnknownJob(job_id.to_string()))?;
    if row.status.is_terminal() {
        return Ok(row);
    }

    tokio::select! {
        _ = notified => {
            store
                .get_job(job_id)
                .await?
                .ok_or_else(|| DispatchError::UnknownJob(job_id.to_string()))
        }
        _ = tokio::time::sleep(timeout) => {
            let reason = format!("did not complete within {}s", timeout.as_secs());
            tracing::warn!(job_id, reason = %reason, "wait_for_completion: timed out");
            let forced = store
                .update_job_status(job_id, None, JobStatus::Failed, None, Some(&reason), None)
                .await;
            match forced {
                Ok(()) | Err(brain_store::StoreError::JobTerminal(_)) => {}
                Err(err) => return Err(err.into()),
            }
            store
                .get_job(job_id)
                .await?
                .ok_or_else(|| DispatchError::UnknownJob(job_id.to_string()))
        }
    }
}
