#![deny(missing_docs)]
//! Embedded relational state store for the Brain.
//!
//! One SQLite database file, one writer within the process (SPEC_FULL.md
//! §3/§5). [`Store`] owns the connection behind a `std::sync::Mutex` and
//! exposes narrow CRUD methods per entity, plus the optimistic-locking
//! primitive over `memory_state` that the rest of the system builds on.

mod error;
mod models;
mod schema;

pub use error::StoreError;
pub use models::*;

use std::sync::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

/// The embedded state store. Cheap to clone (an `Arc` around the
/// connection mutex); every clone shares the same underlying database
/// handle.
#[derive(Clone)]
pub struct Store {
    conn: std::sync::Arc<Mutex<Connection>>,
}

impl Store {
    /// Open (creating if absent) a SQLite database at `path` and apply the
    /// schema. `CREATE TABLE IF NOT EXISTS` is idempotent, so this is safe
    /// to call on every process start.
    pub async fn open(path: impl AsRef<std::path::Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_owned();
        let conn = Connection::open(path)?;
        conn.execute_batch(schema::SCHEMA)?;
        Ok(Self {
            conn: std::sync::Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database. Used by tests and by `brain-env-local`
    /// style development fallbacks.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::SCHEMA)?;
        Ok(Self {
            conn: std::sync::Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ------------------------------------------------------------------
    // Conversations + MemoryState
    // ------------------------------------------------------------------

    /// Create a new conversation and initialise its `MemoryState` row at
    /// version 0, in one go (per §3, "exactly one MemoryState row per
    /// conversation").
    pub async fn create_conversation(
        &self,
        title: Option<String>,
    ) -> Result<Conversation, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = now_iso();
        let conn = self.lock();
        conn.execute(
            "INSERT INTO conversations (id, title, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
            params![id, title, now],
        )?;
        conn.execute(
            "INSERT INTO memory_state (conversation_id, version, unobserved_token_count, turns_since_reflection)
             VALUES (?1, 0, 0, 0)",
            params![id],
        )?;
        Ok(Conversation {
            id,
            title,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Fetch a conversation by id.
    pub async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, StoreError> {
        let conn = self.lock();
        conn.query_row(
            "SELECT id, title, created_at, updated_at FROM conversations WHERE id = ?1",
            params![id],
            |row| {
                Ok(Conversation {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    created_at: row.get(2)?,
                    updated_at: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(Into::into)
    }

    /// List all conversations, newest first.
    pub async fn list_conversations(&self) -> Result<Vec<Conversation>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, title, created_at, updated_at FROM conversations ORDER BY created_at DESC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Conversation {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    created_at: row.get(2)?,
                    updated_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Fetch the `MemoryState` row for a conversation.
    pub async fn get_memory_state(
        &self,
        conversation_id: &str,
    ) -> Result<Option<MemoryState>, StoreError> {
        let conn = self.lock();
        conn.query_row(
            "SELECT conversation_id, version, unobserved_token_count, turns_since_reflection,
                    last_observer_at, last_reflector_at
             FROM memory_state WHERE conversation_id = ?1",
            params![conversation_id],
            |row| {
                Ok(MemoryState {
                    conversation_id: row.get(0)?,
                    version: row.get(1)?,
                    unobserved_token_count: row.get(2)?,
                    turns_since_reflection: row.get(3)?,
                    last_observer_at: row.get(4)?,
                    last_reflector_at: row.get(5)?,
                })
            },
        )
        .optional()
        .map_err(Into::into)
    }

    /// Apply `patch` to the `MemoryState` row for `conversation_id`, but
    /// only if its current version equals `expected_version`. Returns
    /// `true` iff the update applied (row is now at `expected_version + 1`);
    /// `false` means the caller raced and should re-read.
    ///
    /// This is the optimistic-concurrency primitive: the `UPDATE ... WHERE
    /// version = ?` succeeds (affects one row) iff no other writer got
    /// there first.
    pub async fn update_memory_state(
        &self,
        conversation_id: &str,
        patch: &MemoryStatePatch,
        expected_version: i64,
    ) -> Result<bool, StoreError> {
        let conn = self.lock();
        let affected = conn.execute(
            "UPDATE memory_state SET
                version = version + 1,
                unobserved_token_count = COALESCE(?1, unobserved_token_count),
                turns_since_reflection = COALESCE(?2, turns_since_reflection),
                last_observer_at = COALESCE(?3, last_observer_at),
                last_reflector_at = COALESCE(?4, last_reflector_at)
             WHERE conversation_id = ?5 AND version = ?6",
            params![
                patch.unobserved_token_count,
                patch.turns_since_reflection,
                patch.last_observer_at,
                patch.last_reflector_at,
                conversation_id,
                expected_version,
            ],
        )?;
        Ok(affected == 1)
    }

    // ------------------------------------------------------------------
    // Messages
    // ------------------------------------------------------------------

    /// Insert a message. `created_at` is server-assigned.
    pub async fn insert_message(
        &self,
        conversation_id: &str,
        role: Role,
        content: &str,
    ) -> Result<Message, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = now_iso();
        let conn = self.lock();
        conn.execute(
            "INSERT INTO messages (id, conversation_id, role, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, conversation_id, role.as_str(), content, now],
        )?;
        conn.execute(
            "UPDATE conversations SET updated_at = ?1 WHERE id = ?2",
            params![now, conversation_id],
        )?;
        Ok(Message {
            id,
            conversation_id: conversation_id.to_string(),
            role,
            content: content.to_string(),
            created_at: now,
        })
    }

    /// List messages for a conversation, in insertion order.
    pub async fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, conversation_id, role, content, created_at FROM messages
             WHERE conversation_id = ?1 ORDER BY created_at ASC, rowid ASC",
        )?;
        let rows = stmt
            .query_map(params![conversation_id], |row| {
                let role: String = row.get(2)?;
                Ok(Message {
                    id: row.get(0)?,
                    conversation_id: row.get(1)?,
                    role: Role::parse(&role),
                    content: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ------------------------------------------------------------------
    // Jobs
    // ------------------------------------------------------------------

    /// Record a freshly-dispatched job at `status = dispatched`.
    pub async fn insert_job_dispatched(
        &self,
        job_id: &str,
        job_type: WorkType,
        source: Option<&str>,
    ) -> Result<Job, StoreError> {
        let now = now_iso();
        let conn = self.lock();
        conn.execute(
            "INSERT INTO jobs (job_id, type, status, source, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![job_id, job_type.as_str(), JobStatus::Dispatched.as_str(), source, now],
        )?;
        Ok(Job {
            job_id: job_id.to_string(),
            job_type,
            status: JobStatus::Dispatched,
            worker_id: None,
            result: None,
            error: None,
            duration_ms: None,
            source: source.map(str::to_string),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Fetch a job by id.
    pub async fn get_job(&self, job_id: &str) -> Result<Option<Job>, StoreError> {
        let conn = self.lock();
        conn.query_row(
            "SELECT job_id, type, status, worker_id, result, error, duration_ms, source, created_at, updated_at
             FROM jobs WHERE job_id = ?1",
            params![job_id],
            row_to_job,
        )
        .optional()
        .map_err(Into::into)
    }

    /// List all jobs, newest first.
    pub async fn list_jobs(&self) -> Result<Vec<Job>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT job_id, type, status, worker_id, result, error, duration_ms, source, created_at, updated_at
             FROM jobs ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map([], row_to_job)?.collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// List jobs currently in a non-terminal status, for the zombie reaper.
    pub async fn list_active_jobs(&self) -> Result<Vec<Job>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT job_id, type, status, worker_id, result, error, duration_ms, source, created_at, updated_at
             FROM jobs WHERE status IN ('dispatched', 'received', 'running')",
        )?;
        let rows = stmt.query_map([], row_to_job)?.collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Apply a status transition to a job. Refuses (returns
    /// [`StoreError::JobTerminal`]) if the row is already terminal — per
    /// §3, "once terminal it is immutable."
    #[allow(clippy::too_many_arguments)]
    pub async fn update_job_status(
        &self,
        job_id: &str,
        worker_id: Option<&str>,
        status: JobStatus,
        result: Option<&serde_json::Value>,
        error: Option<&str>,
        duration_ms: Option<i64>,
    ) -> Result<(), StoreError> {
        let now = now_iso();
        let conn = self.lock();
        let current: Option<String> = conn
            .query_row(
                "SELECT status FROM jobs WHERE job_id = ?1",
                params![job_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(current) = current else {
            return Err(StoreError::NotFound(format!("job {job_id}")));
        };
        if JobStatus::parse(&current).is_terminal() {
            return Err(StoreError::JobTerminal(job_id.to_string()));
        }
        let result_json = result.map(serde_json::to_string).transpose()?;
        conn.execute(
            "UPDATE jobs SET status = ?1, worker_id = COALESCE(?2, worker_id),
                result = COALESCE(?3, result), error = COALESCE(?4, error),
                duration_ms = COALESCE(?5, duration_ms), updated_at = ?6
             WHERE job_id = ?7",
            params![status.as_str(), worker_id, result_json, error, duration_ms, now, job_id],
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Schedules
    // ------------------------------------------------------------------

    /// Create a schedule row. Rejects cron expressions that don't match
    /// the 5-field grammar — callers pass a validated [`cron::Schedule`]
    /// string from `brain-schedule` here, but this store-level check is
    /// the last line of defense per §3 ("rejected at write").
    pub async fn create_schedule(
        &self,
        name: &str,
        cron_expr: &str,
        job_type: WorkType,
        config: serde_json::Value,
    ) -> Result<Schedule, StoreError> {
        validate_cron_grammar(cron_expr)?;
        let id = uuid::Uuid::new_v4().to_string();
        let now = now_iso();
        let config_str = serde_json::to_string(&config)?;
        let conn = self.lock();
        conn.execute(
            "INSERT INTO schedules (id, name, cron_expr, type, config, enabled, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)",
            params![id, name, cron_expr, job_type.as_str(), config_str, now],
        )?;
        Ok(Schedule {
            id,
            name: name.to_string(),
            cron_expr: cron_expr.to_string(),
            job_type,
            config,
            enabled: true,
            last_run_at: None,
            last_status: None,
            last_output: None,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Fetch a schedule by id.
    pub async fn get_schedule(&self, id: &str) -> Result<Option<Schedule>, StoreError> {
        let conn = self.lock();
        conn.query_row(
            "SELECT id, name, cron_expr, type, config, enabled, last_run_at, last_status,
                    last_output, created_at, updated_at
             FROM schedules WHERE id = ?1",
            params![id],
            row_to_schedule,
        )
        .optional()
        .map_err(Into::into)
    }

    /// List all schedules.
    pub async fn list_schedules(&self) -> Result<Vec<Schedule>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, name, cron_expr, type, config, enabled, last_run_at, last_status,
                    last_output, created_at, updated_at
             FROM schedules ORDER BY created_at ASC",
        )?;
        let rows = stmt
            .query_map([], row_to_schedule)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Record the outcome of a manual or timer-driven fire.
    pub async fn record_schedule_fired(
        &self,
        id: &str,
        status: &str,
        output: Option<&str>,
    ) -> Result<(), StoreError> {
        let now = now_iso();
        let conn = self.lock();
        conn.execute(
            "UPDATE schedules SET last_run_at = ?1, last_status = ?2, last_output = ?3, updated_at = ?1
             WHERE id = ?4",
            params![now, status, output, id],
        )?;
        Ok(())
    }

    /// Replace a schedule's definition in place, re-validating the cron
    /// grammar. Returns `None` if no row exists with that id. Callers
    /// (`brain-schedule`) are responsible for re-registering the timer
    /// atomically with this write — this method only touches the row.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_schedule(
        &self,
        id: &str,
        name: &str,
        cron_expr: &str,
        job_type: WorkType,
        config: &serde_json::Value,
        enabled: bool,
    ) -> Result<Option<Schedule>, StoreError> {
        validate_cron_grammar(cron_expr)?;
        let now = now_iso();
        let config_str = serde_json::to_string(config)?;
        let conn = self.lock();
        let affected = conn.execute(
            "UPDATE schedules SET name = ?1, cron_expr = ?2, type = ?3, config = ?4,
                enabled = ?5, updated_at = ?6
             WHERE id = ?7",
            params![name, cron_expr, job_type.as_str(), config_str, enabled as i64, now, id],
        )?;
        drop(conn);
        if affected == 0 {
            return Ok(None);
        }
        self.get_schedule(id).await
    }

    /// Delete a schedule. Returns `true` iff a row was deleted (per §8's
    /// idempotent-delete property).
    pub async fn delete_schedule(&self, id: &str) -> Result<bool, StoreError> {
        let conn = self.lock();
        let affected = conn.execute("DELETE FROM schedules WHERE id = ?1", params![id])?;
        Ok(affected == 1)
    }

    // ------------------------------------------------------------------
    // Skills
    // ------------------------------------------------------------------

    /// Create or fully replace a skill row, keyed by id. `created_at` is
    /// preserved across repeat upserts of the same id (§8's round-trip
    /// property).
    #[allow(clippy::too_many_arguments)]
    pub async fn upsert_skill(&self, skill: &Skill) -> Result<Skill, StoreError> {
        let now = now_iso();
        let conn = self.lock();
        let existing_created_at: Option<String> = conn
            .query_row(
                "SELECT created_at FROM skills WHERE id = ?1",
                params![skill.id],
                |row| row.get(0),
            )
            .optional()?;
        let created_at = existing_created_at.unwrap_or_else(|| now.clone());
        let config_str = serde_json::to_string(&skill.config)?;
        let stdio_args_str = skill.stdio_args.as_ref().map(serde_json::to_string).transpose()?;
        conn.execute(
            "INSERT INTO skills (id, name, version, description, tier, transport, enabled, config,
                                  owner, stdio_command, stdio_args, http_url, instruction_path,
                                  instruction_content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name, version = excluded.version, description = excluded.description,
                tier = excluded.tier, transport = excluded.transport, enabled = excluded.enabled,
                config = excluded.config, owner = excluded.owner, stdio_command = excluded.stdio_command,
                stdio_args = excluded.stdio_args, http_url = excluded.http_url,
                instruction_path = excluded.instruction_path, instruction_content = excluded.instruction_content,
                updated_at = excluded.updated_at",
            params![
                skill.id, skill.name, skill.version, skill.description, skill.tier.as_str(),
                skill.transport, skill.enabled as i64, config_str, skill.owner.as_str(),
                skill.stdio_command, stdio_args_str, skill.http_url, skill.instruction_path,
                skill.instruction_content, created_at, now,
            ],
        )?;
        self.get_skill(&skill.id).await?.ok_or_else(|| StoreError::NotFound(skill.id.clone()))
    }

    /// Fetch a skill by id.
    pub async fn get_skill(&self, id: &str) -> Result<Option<Skill>, StoreError> {
        let conn = self.lock();
        conn.query_row(
            "SELECT id, name, version, description, tier, transport, enabled, config, owner,
                    stdio_command, stdio_args, http_url, instruction_path, instruction_content,
                    created_at, updated_at
             FROM skills WHERE id = ?1",
            params![id],
            row_to_skill,
        )
        .optional()
        .map_err(Into::into)
    }

    /// List all skills.
    pub async fn list_skills(&self) -> Result<Vec<Skill>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, name, version, description, tier, transport, enabled, config, owner,
                    stdio_command, stdio_args, http_url, instruction_path, instruction_content,
                    created_at, updated_at
             FROM skills ORDER BY created_at ASC",
        )?;
        let rows = stmt.query_map([], row_to_skill)?.collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Delete a skill. Returns `true` iff a row was deleted. Authorisation
    /// (owner=system is read-only to the agent) is the caller's
    /// responsibility — this method performs no ownership check, matching
    /// `brain-tool::UnifiedRegistry`'s self-management tools, which check
    /// before calling.
    pub async fn delete_skill(&self, id: &str) -> Result<bool, StoreError> {
        let conn = self.lock();
        let affected = conn.execute("DELETE FROM skills WHERE id = ?1", params![id])?;
        Ok(affected == 1)
    }

    // ------------------------------------------------------------------
    // Memory entry metadata
    // ------------------------------------------------------------------

    /// Insert the metadata row for a memory entry. The embedding itself is
    /// the vector store's concern (`brain-memory`).
    pub async fn insert_memory_entry_meta(
        &self,
        id: &str,
        content: &str,
        category: &str,
    ) -> Result<MemoryEntryMeta, StoreError> {
        let now = now_iso();
        let conn = self.lock();
        conn.execute(
            "INSERT INTO memory_entries (id, content, category, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![id, content, category, now],
        )?;
        Ok(MemoryEntryMeta {
            id: id.to_string(),
            content: content.to_string(),
            category: category.to_string(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Delete a memory entry's metadata row. Returns `true` iff a row was
    /// deleted.
    pub async fn delete_memory_entry_meta(&self, id: &str) -> Result<bool, StoreError> {
        let conn = self.lock();
        let affected = conn.execute("DELETE FROM memory_entries WHERE id = ?1", params![id])?;
        Ok(affected == 1)
    }

    /// Fetch a memory entry's metadata row.
    pub async fn get_memory_entry_meta(
        &self,
        id: &str,
    ) -> Result<Option<MemoryEntryMeta>, StoreError> {
        let conn = self.lock();
        conn.query_row(
            "SELECT id, content, category, created_at, updated_at FROM memory_entries WHERE id = ?1",
            params![id],
            |row| {
                Ok(MemoryEntryMeta {
                    id: row.get(0)?,
                    content: row.get(1)?,
                    category: row.get(2)?,
                    created_at: row.get(3)?,
                    updated_at: row.get(4)?,
                })
            },
        )
        .optional()
        .map_err(Into::into)
    }

    // ------------------------------------------------------------------
    // Handoff notes + changelog
    // ------------------------------------------------------------------

    /// Append a handoff note. Handoff notes are append-only; the newest
    /// row is authoritative.
    pub async fn insert_handoff_note(
        &self,
        from_version: &str,
        to_version: Option<&str>,
        active_conversations: &[String],
        pending_schedules: &[String],
    ) -> Result<HandoffNote, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = now_iso();
        let active_json = serde_json::to_string(active_conversations)?;
        let pending_json = serde_json::to_string(pending_schedules)?;
        let conn = self.lock();
        conn.execute(
            "INSERT INTO handoff_notes (id, from_version, to_version, active_conversations, pending_schedules, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, from_version, to_version, active_json, pending_json, now],
        )?;
        Ok(HandoffNote {
            id,
            from_version: from_version.to_string(),
            to_version: to_version.map(str::to_string),
            active_conversations: active_conversations.to_vec(),
            pending_schedules: pending_schedules.to_vec(),
            created_at: now,
        })
    }

    /// Fetch the newest handoff note, if any — the one a newly-activated
    /// instance must read (§8: "the latest row at activation time").
    pub async fn latest_handoff_note(&self) -> Result<Option<HandoffNote>, StoreError> {
        let conn = self.lock();
        conn.query_row(
            "SELECT id, from_version, to_version, active_conversations, pending_schedules, created_at
             FROM handoff_notes ORDER BY created_at DESC LIMIT 1",
            [],
            row_to_handoff_note,
        )
        .optional()
        .map_err(Into::into)
    }

    /// Record a changelog entry for a version, undelivered by default.
    pub async fn insert_changelog_entry(
        &self,
        version: &str,
        summary: &str,
    ) -> Result<(), StoreError> {
        let conn = self.lock();
        conn.execute(
            "INSERT OR IGNORE INTO changelog (version, summary, delivered) VALUES (?1, ?2, 0)",
            params![version, summary],
        )?;
        Ok(())
    }

    /// Fetch at most one undelivered changelog entry and mark it
    /// delivered in the same call (at-most-once exposure, per §4.3).
    pub async fn take_undelivered_changelog_entry(
        &self,
    ) -> Result<Option<ChangelogEntry>, StoreError> {
        let conn = self.lock();
        let entry = conn
            .query_row(
                "SELECT version, summary, delivered FROM changelog WHERE delivered = 0 ORDER BY version DESC LIMIT 1",
                [],
                |row| {
                    Ok(ChangelogEntry {
                        version: row.get(0)?,
                        summary: row.get(1)?,
                        delivered: false,
                    })
                },
            )
            .optional()?;
        if let Some(entry) = &entry {
            conn.execute(
                "UPDATE changelog SET delivered = 1 WHERE version = ?1",
                params![entry.version],
            )?;
        }
        Ok(entry)
    }

    // ------------------------------------------------------------------
    // Task pods
    // ------------------------------------------------------------------

    /// Record a freshly-created task pod at `status = running`.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_task_pod(
        &self,
        task_id: &str,
        recipe: Option<&str>,
        toolbox: &str,
        mode: &str,
        goal: &str,
        mounts: Option<&serde_json::Value>,
        job_name: &str,
    ) -> Result<TaskPod, StoreError> {
        let now = now_iso();
        let mounts_str = mounts.map(serde_json::to_string).transpose()?;
        let conn = self.lock();
        conn.execute(
            "INSERT INTO task_pods (task_id, recipe, toolbox, mode, goal, mounts, job_name, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'running', ?8, ?8)",
            params![task_id, recipe, toolbox, mode, goal, mounts_str, job_name, now],
        )?;
        Ok(TaskPod {
            task_id: task_id.to_string(),
            recipe: recipe.map(str::to_string),
            toolbox: toolbox.to_string(),
            mode: mode.to_string(),
            goal: goal.to_string(),
            mounts: mounts.cloned(),
            job_name: job_name.to_string(),
            status: "running".to_string(),
            result: None,
            error: None,
            duration_ms: None,
            files_changed: None,
            trace_id: None,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Move a task pod to a terminal status with its result.
    pub async fn complete_task_pod(
        &self,
        task_id: &str,
        status: &str,
        result: Option<&serde_json::Value>,
        error: Option<&str>,
        duration_ms: i64,
        files_changed: Option<&[String]>,
    ) -> Result<(), StoreError> {
        let now = now_iso();
        let result_str = result.map(serde_json::to_string).transpose()?;
        let files_str = files_changed.map(serde_json::to_string).transpose()?;
        let conn = self.lock();
        conn.execute(
            "UPDATE task_pods SET status = ?1, result = ?2, error = ?3, duration_ms = ?4,
                files_changed = ?5, updated_at = ?6
             WHERE task_id = ?7",
            params![status, result_str, error, duration_ms, files_str, now, task_id],
        )?;
        Ok(())
    }

    /// Fetch a task pod by id.
    pub async fn get_task_pod(&self, task_id: &str) -> Result<Option<TaskPod>, StoreError> {
        let conn = self.lock();
        conn.query_row(
            "SELECT task_id, recipe, toolbox, mode, goal, mounts, job_name, status, result, error,
                    duration_ms, files_changed, trace_id, created_at, updated_at
             FROM task_pods WHERE task_id = ?1",
            params![task_id],
            row_to_task_pod,
        )
        .optional()
        .map_err(Into::into)
    }

    // ------------------------------------------------------------------
    // Secrets
    // ------------------------------------------------------------------

    /// Replace (or create) a secret by key. The plaintext value is never
    /// stored in this API's signature name — callers pass
    /// already-encrypted bytes (encryption is the caller's concern;
    /// `brain-http` encrypts before calling this).
    pub async fn put_secret(&self, key: &str, value_encrypted: &[u8]) -> Result<(), StoreError> {
        let now = now_iso();
        let conn = self.lock();
        conn.execute(
            "INSERT INTO secrets (key, value_encrypted, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(key) DO UPDATE SET value_encrypted = excluded.value_encrypted, updated_at = excluded.updated_at",
            params![key, value_encrypted, now],
        )?;
        Ok(())
    }

    /// Fetch the encrypted bytes for a secret. This is the only method
    /// that can see the ciphertext; HTTP responses must go through
    /// [`Store::get_secret_masked`] instead.
    pub async fn get_secret_encrypted(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let conn = self.lock();
        conn.query_row(
            "SELECT value_encrypted FROM secrets WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(Into::into)
    }

    /// Fetch a secret's metadata with the decrypted value masked
    /// (all but the last four characters elided). `decrypted_value` is
    /// supplied by the caller after it has decrypted
    /// [`Store::get_secret_encrypted`]'s bytes — this crate has no
    /// decryption logic of its own, only the masking rule.
    pub async fn get_secret_masked(
        &self,
        key: &str,
        decrypted_value: &str,
    ) -> Result<Option<MaskedSecret>, StoreError> {
        let conn = self.lock();
        conn.query_row(
            "SELECT key, created_at, updated_at FROM secrets WHERE key = ?1",
            params![key],
            |row| {
                Ok(MaskedSecret {
                    key: row.get(0)?,
                    masked_value: models::mask(decrypted_value),
                    created_at: row.get(1)?,
                    updated_at: row.get(2)?,
                })
            },
        )
        .optional()
        .map_err(Into::into)
    }

    /// Delete a secret. Returns `true` iff a row was deleted.
    pub async fn delete_secret(&self, key: &str) -> Result<bool, StoreError> {
        let conn = self.lock();
        let affected = conn.execute("DELETE FROM secrets WHERE key = ?1", params![key])?;
        Ok(affected == 1)
    }

    // ------------------------------------------------------------------
    // App config (non-secret, e.g. `models`, `voice`)
    // ------------------------------------------------------------------

    /// Replace (or create) a named config blob.
    pub async fn put_config(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError> {
        let now = now_iso();
        let value_str = serde_json::to_string(value)?;
        let conn = self.lock();
        conn.execute(
            "INSERT INTO app_config (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value_str, now],
        )?;
        Ok(())
    }

    /// Fetch a named config blob, if one has been set.
    pub async fn get_config(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let conn = self.lock();
        let raw: Option<String> = conn
            .query_row("SELECT value FROM app_config WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        raw.map(|s| serde_json::from_str(&s).map_err(StoreError::from)).transpose()
    }
}

/// Validate the 5-field cron grammar (`min hour dom month dow`) without
/// pulling a scheduling dependency into the storage crate. `brain-schedule`
/// performs the richer semantic parse (via the `cron` crate) before
/// computing fire times; this is the last-line-of-defense check at write
/// time per §3.
fn validate_cron_grammar(expr: &str) -> Result<(), StoreError> {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(StoreError::InvalidCron(format!(
            "expected 5 fields, got {}: {expr}",
            fields.len()
        )));
    }
    Ok(())
}

fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn row_to_job(row: &rusqlite::Row<'_>) -> rusqlite::Result<Job> {
    let job_type: String = row.get(1)?;
    let status: String = row.get(2)?;
    let result: Option<String> = row.get(4)?;
    Ok(Job {
        job_id: row.get(0)?,
        job_type: WorkType::parse(&job_type),
        status: JobStatus::parse(&status),
        worker_id: row.get(3)?,
        result: result.and_then(|s| serde_json::from_str(&s).ok()),
        error: row.get(5)?,
        duration_ms: row.get(6)?,
        source: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn row_to_schedule(row: &rusqlite::Row<'_>) -> rusqlite::Result<Schedule> {
    let job_type: String = row.get(3)?;
    let config: String = row.get(4)?;
    Ok(Schedule {
        id: row.get(0)?,
        name: row.get(1)?,
        cron_expr: row.get(2)?,
        job_type: WorkType::parse(&job_type),
        config: serde_json::from_str(&config).unwrap_or(serde_json::Value::Null),
        enabled: row.get::<_, i64>(5)? != 0,
        last_run_at: row.get(6)?,
        last_status: row.get(7)?,
        last_output: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn row_to_skill(row: &rusqlite::Row<'_>) -> rusqlite::Result<Skill> {
    let tier: String = row.get(4)?;
    let config: String = row.get(7)?;
    let owner: String = row.get(8)?;
    let stdio_args: Option<String> = row.get(10)?;
    Ok(Skill {
        id: row.get(0)?,
        name: row.get(1)?,
        version: row.get(2)?,
        description: row.get(3)?,
        tier: SkillTier::parse(&tier),
        transport: row.get(5)?,
        enabled: row.get::<_, i64>(6)? != 0,
        config: serde_json::from_str(&config).unwrap_or(serde_json::Value::Null),
        owner: SkillOwner::parse(&owner),
        stdio_command: row.get(9)?,
        stdio_args: stdio_args.and_then(|s| serde_json::from_str(&s).ok()),
        http_url: row.get(11)?,
        instruction_path: row.get(12)?,
        instruction_content: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

fn row_to_handoff_note(row: &rusqlite::Row<'_>) -> rusqlite::Result<HandoffNote> {
    let active: String = row.get(3)?;
    let pending: String = row.get(4)?;
    Ok(HandoffNote {
        id: row.get(0)?,
        from_version: row.get(1)?,
        to_version: row.get(2)?,
        active_conversations: serde_json::from_str(&active).unwrap_or_default(),
        pending_schedules: serde_json::from_str(&pending).unwrap_or_default(),
        created_at: row.get(5)?,
    })
}

fn row_to_task_pod(row: &rusqlite::Row<'_>) -> rusqlite::Result<TaskPod> {
    let mounts: Option<String> = row.get(5)?;
    let result: Option<String> = row.get(8)?;
    let files_changed: Option<String> = row.get(11)?;
    Ok(TaskPod {
        task_id: row.get(0)?,
        recipe: row.get(1)?,
        toolbox: row.get(2)?,
        mode: row.get(3)?,
        goal: row.get(4)?,
        mounts: mounts.and_then(|s| serde_json::from_str(&s).ok()),
        job_name: row.get(6)?,
        status: row.get(7)?,
        result: result.and_then(|s| serde_json::from_str(&s).ok()),
        error: row.get(9)?,
        duration_ms: row.get(10)?,
        files_changed: files_changed.and_then(|s| serde_json::from_str(&s).ok()),
        trace_id: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}
