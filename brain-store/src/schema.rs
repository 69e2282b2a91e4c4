//! Schema definition. One additive, idempotent `CREATE TABLE IF NOT EXISTS`
//! batch applied on [`crate::Store::open`]. No migration framework — per
//! SPEC_FULL.md §3 the Non-goals rule out multi-version deployments beyond
//! the handoff protocol itself, and the schema only ever grows.

pub(crate) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS conversations (
    id         TEXT PRIMARY KEY,
    title      TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS memory_state (
    conversation_id        TEXT UNIQUE NOT NULL,
    version                INTEGER NOT NULL DEFAULT 0,
    unobserved_token_count INTEGER NOT NULL DEFAULT 0,
    turns_since_reflection INTEGER NOT NULL DEFAULT 0,
    last_observer_at       TEXT,
    last_reflector_at      TEXT,
    FOREIGN KEY (conversation_id) REFERENCES conversations(id)
);

CREATE TABLE IF NOT EXISTS messages (
    id              TEXT PRIMARY KEY,
    conversation_id TEXT NOT NULL,
    role            TEXT NOT NULL,
    content         TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    FOREIGN KEY (conversation_id) REFERENCES conversations(id)
);
CREATE INDEX IF NOT EXISTS idx_messages_conversation
    ON messages(conversation_id, created_at);

CREATE TABLE IF NOT EXISTS jobs (
    job_id      TEXT PRIMARY KEY,
    type        TEXT NOT NULL,
    status      TEXT NOT NULL,
    worker_id   TEXT,
    result      TEXT,
    error       TEXT,
    duration_ms INTEGER,
    source      TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status, updated_at);

CREATE TABLE IF NOT EXISTS schedules (
    id           TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    cron_expr    TEXT NOT NULL,
    type         TEXT NOT NULL,
    config       TEXT NOT NULL,
    enabled      INTEGER NOT NULL DEFAULT 1,
    last_run_at  TEXT,
    last_status  TEXT,
    last_output  TEXT,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS skills (
    id                  TEXT PRIMARY KEY,
    name                TEXT NOT NULL,
    version             TEXT NOT NULL,
    description         TEXT NOT NULL,
    tier                TEXT NOT NULL,
    transport           TEXT,
    enabled             INTEGER NOT NULL DEFAULT 1,
    config              TEXT NOT NULL,
    owner               TEXT NOT NULL,
    stdio_command       TEXT,
    stdio_args          TEXT,
    http_url            TEXT,
    instruction_path    TEXT,
    instruction_content TEXT,
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS memory_entries (
    id         TEXT PRIMARY KEY,
    content    TEXT NOT NULL,
    category   TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_memory_entries_category ON memory_entries(category);

CREATE TABLE IF NOT EXISTS handoff_notes (
    id                   TEXT PRIMARY KEY,
    from_version         TEXT NOT NULL,
    to_version           TEXT,
    active_conversations TEXT NOT NULL,
    pending_schedules    TEXT NOT NULL,
    created_at           TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS changelog (
    version   TEXT PRIMARY KEY,
    summary   TEXT NOT NULL,
    delivered INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS task_pods (
    task_id       TEXT PRIMARY KEY,
    recipe        TEXT,
    toolbox       TEXT NOT NULL,
    mode          TEXT NOT NULL,
    goal          TEXT NOT NULL,
    mounts        TEXT,
    job_name      TEXT NOT NULL,
    status        TEXT NOT NULL,
    result        TEXT,
    error         TEXT,
    duration_ms   INTEGER,
    files_changed TEXT,
    trace_id      TEXT,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS secrets (
    key             TEXT PRIMARY KEY,
    value_encrypted BLOB NOT NULL,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

-- Opaque, non-secret config blobs addressed by key (e.g. "models", "voice"),
-- backing the HTTP surface's `/config/models` and `/config/voice` routes.
CREATE TABLE IF NOT EXISTS app_config (
    key        TEXT PRIMARY KEY,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;
