//! Memory service error taxonomy.

use thiserror::Error;

/// Errors from the memory service.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Embedding computation failed. `store` rejects on this per spec —
    /// there is no "store without embedding" fallback.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// The embedding backend is unreachable or returned a bad response.
    #[error("embedding backend error: {0}")]
    EmbeddingBackend(#[source] reqwest::Error),

    /// The vector store (SQLite-backed) failed.
    #[error("vector store error: {0}")]
    VectorStore(#[from] rusqlite::Error),

    /// The relational metadata store failed.
    #[error("metadata store error: {0}")]
    Store(#[from] brain_store::StoreError),

    /// A JSON column failed to (de)serialize.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// No memory entry exists with the given id.
    #[error("memory entry not found: {0}")]
    NotFound(String),
}
