//! Schedule manager error taxonomy.

use thiserror::Error;

/// Errors from schedule-manager operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The relational store failed.
    #[error("store error: {0}")]
    Store(#[from] brain_store::StoreError),

    /// Dispatching the triggered job failed.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] brain_dispatch::DispatchError),

    /// The cron expression failed semantic parsing (beyond the 5-field
    /// grammar `brain-store` already checked).
    #[error("invalid cron expression: {0}")]
    InvalidCron(String),

    /// `trigger`/`update`/`delete` referenced a schedule that doesn't exist.
    #[error("unknown schedule: {0}")]
    UnknownSchedule(String),

    /// `trigger` was called on a disabled schedule.
    #[error("schedule {0} is disabled")]
    Disabled(String),

    /// The job type stored on the row isn't one `brain-schedule` knows how
    /// to translate into a dispatch envelope.
    #[error("unsupported job type for schedule {0}")]
    UnsupportedJobType(String),
}
