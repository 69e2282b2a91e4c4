//! Task manager error taxonomy.

use thiserror::Error;

/// Errors from ephemeral task dispatch and lifecycle management.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum TaskError {
    /// The relational store failed.
    #[error("store error: {0}")]
    Store(#[from] brain_store::StoreError),

    /// The bus failed to publish or deliver a message.
    #[error("bus error: {0}")]
    Bus(#[from] brain_bus::BusError),

    /// The Kubernetes API server rejected or failed a request.
    #[error("kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Failed to serialize a mount grant list to JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A requested mount path isn't covered by the allowlist. An empty
    /// allowlist denies every mount.
    #[error("mount path {0} is not in the allowlist")]
    MountDenied(String),

    /// `cancel` (or a result lookup) referenced a task that doesn't exist.
    #[error("unknown task: {0}")]
    NotFound(String),
}
