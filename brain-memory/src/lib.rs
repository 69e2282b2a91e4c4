#![deny(missing_docs)]
//! Memory service for the Brain.
//!
//! Combines [`brain_store::Store`] (entry metadata, durable across
//! restarts) with a [`vector::VectorStore`] (embedding payloads) behind
//! the `store`/`search`/`remove` API from SPEC_FULL.md §4.7, plus the
//! observer/reflector triggers that fire off the back of every
//! assistant turn.

mod embedder;
mod error;
mod triggers;
mod vector;

pub use embedder::{cosine_similarity, Embedder, HttpEmbedder};
pub use error::MemoryError;
pub use triggers::{reflect, CandidateMemory, Observer, ProviderObserver};
pub use vector::{ScoredEntry, VectorStore};

use brain_store::{MemoryStatePatch, Store};

/// Default minimum cosine similarity for a search hit to surface.
pub const DEFAULT_MIN_SCORE: f32 = 0.2;

/// A stored memory entry, as returned by [`MemoryService::store`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct MemoryEntry {
    /// Unique id.
    pub id: String,
    /// The stored text.
    pub content: String,
    /// Free-form category.
    pub category: String,
}

/// A scored search hit, as returned by [`MemoryService::search`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct MemoryHit {
    /// The matched entry's id.
    pub id: String,
    /// The stored text.
    pub content: String,
    /// Free-form category.
    pub category: String,
    /// Cosine similarity to the query.
    pub score: f32,
}

/// The memory service: store/search/remove, plus the observer/reflector
/// triggers invoked once per assistant turn.
pub struct MemoryService {
    store: Store,
    vectors: VectorStore,
    embedder: Box<dyn Embedder>,
    observer: Option<Box<dyn Observer>>,
    min_score: f32,
    obs_threshold: i64,
    ref_threshold: i64,
}

impl MemoryService {
    /// Build a memory service. `observer` is optional — without one, the
    /// observer trigger only logs that it fired (matching the
    /// reflector's always-no-op behaviour) instead of extracting memories.
    pub fn new(
        store: Store,
        vectors: VectorStore,
        embedder: Box<dyn Embedder>,
        observer: Option<Box<dyn Observer>>,
        obs_threshold: i64,
        ref_threshold: i64,
    ) -> Self {
        Self {
            store,
            vectors,
            embedder,
            observer,
            min_score: DEFAULT_MIN_SCORE,
            obs_threshold,
            ref_threshold,
        }
    }

    /// Override the minimum similarity threshold used by [`Self::search`].
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    /// Compute an embedding for `content` and persist both the metadata
    /// row and the vector. Rejects on embedder failure — there is no
    /// partial write.
    pub async fn store(
        &self,
        content: &str,
        category: Option<&str>,
    ) -> Result<MemoryEntry, MemoryError> {
        let category = category.unwrap_or("general");
        let embedding = self.embedder.embed(content).await?;
        let id = uuid::Uuid::new_v4().to_string();
        let meta = self.store.insert_memory_entry_meta(&id, content, category).await?;
        self.vectors.put(&id, &embedding)?;
        Ok(MemoryEntry {
            id: meta.id,
            content: meta.content,
            category: meta.category,
        })
    }

    /// Embed `query` and return the `limit` best matches above the
    /// configured minimum score, descending by similarity.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<MemoryHit>, MemoryError> {
        let embedding = self.embedder.embed(query).await?;
        let scored = self.vectors.search(&embedding, limit, self.min_score)?;
        let mut hits = Vec::with_capacity(scored.len());
        for ScoredEntry { id, score } in scored {
            let Some(meta) = self.store.get_memory_entry_meta(&id).await? else {
                continue; // vector survives a metadata delete race; skip it
            };
            hits.push(MemoryHit {
                id: meta.id,
                content: meta.content,
                category: meta.category,
                score,
            });
        }
        Ok(hits)
    }

    /// Remove a memory entry's vector and metadata. Idempotent.
    pub async fn remove(&self, id: &str) -> Result<(), MemoryError> {
        self.vectors.remove(id)?;
        self.store.delete_memory_entry_meta(id).await?;
        Ok(())
    }

    /// Account for one assistant turn: bump `unobserved_token_count` by
    /// `approx_tokens` and `turns_since_reflection` by one, under the
    /// optimistic lock, retrying on version contention. Fires the
    /// observer and/or reflector trigger (logged, never awaited by the
    /// caller's turn) when their thresholds are crossed.
    pub async fn on_turn(
        &self,
        conversation_id: &str,
        approx_tokens: i64,
        recent_window: &str,
    ) -> Result<(), MemoryError> {
        loop {
            let Some(state) = self.store.get_memory_state(conversation_id).await? else {
                return Err(MemoryError::NotFound(conversation_id.to_string()));
            };
            let new_tokens = state.unobserved_token_count + approx_tokens;
            let new_turns = state.turns_since_reflection + 1;

            let observer_due = new_tokens >= self.obs_threshold;
            let reflector_due = new_turns >= self.ref_threshold;

            let patch = MemoryStatePatch {
                unobserved_token_count: Some(if observer_due { 0 } else { new_tokens }),
                turns_since_reflection: Some(if reflector_due { 0 } else { new_turns }),
                last_observer_at: observer_due.then(now_iso),
                last_reflector_at: reflector_due.then(now_iso),
            };

            let applied = self
                .store
                .update_memory_state(conversation_id, &patch, state.version)
                .await?;
            if !applied {
                continue; // another writer raced us; re-read and retry
            }

            if observer_due {
                self.run_observer(conversation_id, recent_window).await;
            }
            if reflector_due {
                reflect(conversation_id);
            }
            return Ok(());
        }
    }

    async fn run_observer(&self, conversation_id: &str, recent_window: &str) {
        let Some(observer) = &self.observer else {
            tracing::info!(conversation_id, "observer due (no observer configured)");
            return;
        };
        match observer.observe(recent_window).await {
            Ok(candidates) => {
                for candidate in candidates {
                    if let Err(err) = self.store(&candidate.content, Some(&candidate.category)).await {
                        tracing::warn!(conversation_id, error = %err, "observer candidate failed to store");
                    }
                }
            }
            Err(err) => {
                tracing::warn!(conversation_id, error = %err, "observer extraction failed");
            }
        }
    }
}

fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}
