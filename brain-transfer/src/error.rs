//! Transfer handshake error taxonomy.

use thiserror::Error;

/// Errors from transfer-coordinator operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum TransferError {
    /// The bus failed to publish or deliver a handshake message.
    #[error("bus error: {0}")]
    Bus(#[from] brain_bus::BusError),

    /// The relational store failed.
    #[error("store error: {0}")]
    Store(#[from] brain_store::StoreError),

    /// A method was called while the coordinator was in a state that does
    /// not permit it (e.g. `join` called twice).
    #[error("transfer coordinator is in state {0:?}, which does not permit this operation")]
    WrongState(crate::TransferState),
}
