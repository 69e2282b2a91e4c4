//! Vector payload storage and similarity search.
//!
//! No ANN index: personal-scale memory (low thousands of entries) makes
//! a brute-force cosine scan over a SQLite BLOB column fast enough, and
//! keeps the dependency footprint to the `rusqlite` the rest of the
//! workspace already carries rather than pulling in a dedicated vector
//! database.

use crate::embedder::cosine_similarity;
use crate::error::MemoryError;
use rusqlite::{params, Connection};
use std::sync::Mutex;

/// One scored hit from [`VectorStore::search`].
#[derive(Debug, Clone)]
pub struct ScoredEntry {
    /// The memory entry's id (shared with `brain_store::MemoryEntryMeta::id`).
    pub id: String,
    /// Cosine similarity to the query, in `[-1.0, 1.0]`.
    pub score: f32,
}

/// Stores embedding vectors keyed by memory entry id.
pub struct VectorStore {
    conn: Mutex<Connection>,
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS vectors (
    id        TEXT PRIMARY KEY,
    embedding BLOB NOT NULL
);
"#;

impl VectorStore {
    /// Open (creating if absent) the vector payload database at `path`.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, MemoryError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory vector store, for tests.
    pub fn open_in_memory() -> Result<Self, MemoryError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store (or replace) the embedding for `id`.
    pub fn put(&self, id: &str, embedding: &[f32]) -> Result<(), MemoryError> {
        let bytes = encode(embedding);
        let conn = self.lock();
        conn.execute(
            "INSERT INTO vectors (id, embedding) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET embedding = excluded.embedding",
            params![id, bytes],
        )?;
        Ok(())
    }

    /// Remove the embedding for `id`. Idempotent.
    pub fn remove(&self, id: &str) -> Result<(), MemoryError> {
        let conn = self.lock();
        conn.execute("DELETE FROM vectors WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Return the `limit` highest-scoring ids for `query`, ordered by
    /// descending similarity, above `min_score`.
    pub fn search(
        &self,
        query: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<ScoredEntry>, MemoryError> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT id, embedding FROM vectors")?;
        let mut scored: Vec<ScoredEntry> = stmt
            .query_map([], |row| {
                let id: String = row.get(0)?;
                let bytes: Vec<u8> = row.get(1)?;
                Ok((id, bytes))
            })?
            .filter_map(|r| r.ok())
            .map(|(id, bytes)| {
                let embedding = decode(&bytes);
                let score = cosine_similarity(query, &embedding);
                ScoredEntry { id, score }
            })
            .filter(|entry| entry.score >= min_score)
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }
}

fn encode(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn decode(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes(chunk.try_into().unwrap()))
        .collect()
}
