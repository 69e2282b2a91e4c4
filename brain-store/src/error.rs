//! Store error taxonomy.

use thiserror::Error;

/// Errors from state store operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying SQLite call failed.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A JSON column failed to serialize or deserialize.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The requested row does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A cron expression failed the 5-field grammar check.
    #[error("invalid cron expression: {0}")]
    InvalidCron(String),

    /// An update targeted a terminal job row, which is immutable.
    #[error("job {0} is terminal and cannot be updated")]
    JobTerminal(String),

    /// An invalid state transition was attempted (programmer error —
    /// per SPEC_FULL.md §7, abort and log, don't try to recover).
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
}
