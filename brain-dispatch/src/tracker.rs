//! Status Tracker: persists every `jobs.status.*` update, emits a local
//! event on the terminal transition. Plus the zombie reaper.

use std::time::Duration;

use brain_bus::{subjects, BusClient, Consumer};
use brain_proto::bus::JobState;
use brain_store::{JobStatus as StoredJobStatus, Store};
use chrono::{DateTime, Utc};

use crate::error::DispatchError;
use crate::events::JobEvents;

/// How often the zombie reaper scans for stalled jobs.
pub const REAPER_SCAN_INTERVAL: Duration = Duration::from_secs(60);

/// A job idle (no status update) longer than this is force-failed.
pub const REAPER_IDLE_THRESHOLD: Duration = Duration::from_secs(120);

fn to_stored_status(state: JobState) -> StoredJobStatus {
    match state {
        JobState::Dispatched => StoredJobStatus::Dispatched,
        JobState::Received => StoredJobStatus::Received,
        JobState::Running => StoredJobStatus::Running,
        JobState::Completed => StoredJobStatus::Completed,
        JobState::Failed => StoredJobStatus::Failed,
    }
}

/// Build a durable, queue-grouped consumer on `jobs.status.*` for use with
/// [`run`]. The stream must already include that subject (callers pass the
/// same `JOBS` stream the dispatcher publishes onto).
pub async fn subscribe(
    bus: &BusClient,
    stream: &async_nats::jetstream::stream::Stream,
    durable_name: &str,
) -> Result<Consumer, DispatchError> {
    bus.durable_consumer(
        stream,
        durable_name,
        subjects::JOBS_STATUS_WILDCARD,
        Duration::from_secs(30),
        5,
    )
    .await
    .map_err(Into::into)
}

/// Run the status tracker loop forever: pull the next `JobStatus`, persist
/// it, emit the local `job:<id>` event on a terminal transition, and ack.
///
/// Per §4.5's ordering note ("Brain only acts on the terminal
/// transition"), non-terminal updates are persisted but don't notify —
/// `wait_for_completion` only cares about completion.
pub async fn run(consumer: Consumer, store: Store, events: JobEvents) {
    loop {
        let delivered = match consumer.next::<brain_proto::bus::JobStatus>().await {
            Ok(d) => d,
            Err(err) => {
                tracing::warn!(error = %err, "status tracker: bus read failed, retrying");
                tokio::time::sleep(Duration::from_secs(1)).await;
                continue;
            }
        };

        let update = &delivered.payload;
        let result = store
            .update_job_status(
                &update.job_id,
                Some(&update.worker_id),
                to_stored_status(update.status),
                update.result.as_ref(),
                update.error.as_deref(),
                update.duration_ms.map(|ms| ms as i64),
            )
            .await;

        match result {
            Ok(()) => {
                if update.status.is_terminal() {
                    events.notify(&update.job_id);
                }
            }
            Err(brain_store::StoreError::JobTerminal(_)) => {
                // Redelivery of an already-terminal update; idempotent, just ack.
                tracing::debug!(job_id = %update.job_id, "status tracker: duplicate terminal update");
            }
            Err(err) => {
                tracing::error!(job_id = %update.job_id, error = %err, "status tracker: persist failed");
            }
        }

        if let Err(err) = delivered.ack().await {
            tracing::warn!(error = %err, "status tracker: ack failed");
        }
    }
}

/// Run the zombie reaper loop forever: every [`REAPER_SCAN_INTERVAL`],
/// force-fail any job in `dispatched|received|running` whose `updated_at`
/// is older than [`REAPER_IDLE_THRESHOLD`].
pub async fn run_reaper(store: Store, events: JobEvents) {
    let mut interval = tokio::time::interval(REAPER_SCAN_INTERVAL);
    loop {
        interval.tick().await;
        if let Err(err) = reap_once(&store, &events).await {
            tracing::error!(error = %err, "zombie reaper: scan failed");
        }
    }
}

async fn reap_once(store: &Store, events: &JobEvents) -> Result<(), DispatchError> {
    let now = Utc::now();
    for job in store.list_active_jobs().await? {
        let updated_at: DateTime<Utc> = match DateTime::parse_from_rfc3339(&job.updated_at) {
            Ok(ts) => ts.with_timezone(&Utc),
            Err(_) => continue,
        };
        let idle = now.signed_duration_since(updated_at);
        if idle.to_std().unwrap_or(Duration::ZERO) < REAPER_IDLE_THRESHOLD {
            continue;
        }

        tracing::warn!(job_id = %job.job_id, "zombie reaper: force-failing stalled job");
        let reaped = store
            .update_job_status(
                &job.job_id,
                None,
                StoredJobStatus::Failed,
                None,
                Some("reaper: job exceeded idle threshold without a status update"),
                None,
            )
            .await;
        if let Err(brain_store::StoreError::JobTerminal(_)) = reaped {
            continue; // raced with a real terminal update; nothing to reap
        }
        reaped?;
        events.notify(&job.job_id);
    }
    Ok(())
}
