//! Dispatcher/tracker error taxonomy.

use thiserror::Error;

/// Errors from dispatch and status-tracking operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The bus publish or subscribe failed.
    #[error("bus error: {0}")]
    Bus(#[from] brain_bus::BusError),

    /// The relational store failed.
    #[error("store error: {0}")]
    Store(#[from] brain_store::StoreError),

    /// `waitForCompletion` was asked about a job that was never dispatched.
    #[error("unknown job: {0}")]
    UnknownJob(String),
}
