//! Row types returned by the store. Plain data, no behaviour.

use serde::{Deserialize, Serialize};

/// A conversation: the parent of messages and the unique owner of one
/// [`MemoryState`] row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique id.
    pub id: String,
    /// Optional display title.
    pub title: Option<String>,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
    /// ISO-8601 last-update timestamp.
    pub updated_at: String,
}

/// Who authored a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The human user.
    User,
    /// The model.
    Assistant,
}

impl Role {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    pub(crate) fn parse(s: &str) -> Self {
        match s {
            "assistant" => Role::Assistant,
            _ => Role::User,
        }
    }
}

/// One turn in a conversation. Insertion order is stable;
/// `created_at` is server-assigned at insert time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique id.
    pub id: String,
    /// Owning conversation.
    pub conversation_id: String,
    /// Who said it.
    pub role: Role,
    /// The message text.
    pub content: String,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
}

/// Per-conversation memory bookkeeping, updated only via
/// [`crate::Store::update_memory_state`]'s optimistic-lock primitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryState {
    /// Owning conversation (unique).
    pub conversation_id: String,
    /// Monotonically non-decreasing version, bumped on every successful
    /// update.
    pub version: i64,
    /// Approximate un-observed token count since the last observer run.
    pub unobserved_token_count: i64,
    /// Turns elapsed since the last reflector run.
    pub turns_since_reflection: i64,
    /// ISO-8601 timestamp of the last observer run, if any.
    pub last_observer_at: Option<String>,
    /// ISO-8601 timestamp of the last reflector run, if any.
    pub last_reflector_at: Option<String>,
}

/// A patch applied by [`crate::Store::update_memory_state`]. `None` fields
/// are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct MemoryStatePatch {
    /// New unobserved-token-count value, if changing.
    pub unobserved_token_count: Option<i64>,
    /// New turns-since-reflection value, if changing.
    pub turns_since_reflection: Option<i64>,
    /// New last-observer timestamp, if changing.
    pub last_observer_at: Option<String>,
    /// New last-reflector timestamp, if changing.
    pub last_reflector_at: Option<String>,
}

/// What kind of work a [`Job`] or [`crate::Store`] schedule row describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    /// Runs through the agent loop.
    Agent,
    /// Runs a shell command on a worker.
    Command,
    /// Issues an HTTP request.
    Http,
}

impl WorkType {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            WorkType::Agent => "agent",
            WorkType::Command => "command",
            WorkType::Http => "http",
        }
    }

    pub(crate) fn parse(s: &str) -> Self {
        match s {
            "command" => WorkType::Command,
            "http" => WorkType::Http,
            _ => WorkType::Agent,
        }
    }
}

/// A job's lifecycle status. Terminal (`Completed`/`Failed`) rows are
/// immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Published to the bus, not yet picked up.
    Dispatched,
    /// A worker claimed it.
    Received,
    /// A worker is executing it.
    Running,
    /// Finished successfully. Terminal.
    Completed,
    /// Finished with an error. Terminal.
    Failed,
}

impl JobStatus {
    /// Whether this status is terminal (no further transitions permitted).
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            JobStatus::Dispatched => "dispatched",
            JobStatus::Received => "received",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub(crate) fn parse(s: &str) -> Self {
        match s {
            "received" => JobStatus::Received,
            "running" => JobStatus::Running,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Dispatched,
        }
    }
}

/// A row in the `jobs` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique id.
    pub job_id: String,
    /// What kind of job this is.
    pub job_type: WorkType,
    /// Current lifecycle status.
    pub status: JobStatus,
    /// The worker that last reported on this job, if any.
    pub worker_id: Option<String>,
    /// Result payload, present once completed.
    pub result: Option<serde_json::Value>,
    /// Error string, present once failed.
    pub error: Option<String>,
    /// Wall-clock duration once terminal.
    pub duration_ms: Option<i64>,
    /// Who dispatched this job (`"schedule"`, `"agent"`, `"http"`, …).
    pub source: Option<String>,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
    /// ISO-8601 last-update timestamp.
    pub updated_at: String,
}

/// A row in the `schedules` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    /// Unique id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Standard 5-field cron expression.
    pub cron_expr: String,
    /// What kind of job firing this schedule dispatches.
    pub job_type: WorkType,
    /// Job-type-specific configuration.
    pub config: serde_json::Value,
    /// Whether the schedule manager should register a timer for this row.
    pub enabled: bool,
    /// ISO-8601 timestamp of the last fire, if any.
    pub last_run_at: Option<String>,
    /// Status recorded at the last fire, if any.
    pub last_status: Option<String>,
    /// Output recorded at the last fire, if any.
    pub last_output: Option<String>,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
    /// ISO-8601 last-update timestamp.
    pub updated_at: String,
}

/// A skill's classification, controlling where/how its tools run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillTier {
    /// A static prompt fragment, no executable tools.
    Instruction,
    /// An MCP server spawned as a child process.
    Stdio,
    /// An MCP server reached over HTTP, managed alongside the Brain.
    Sidecar,
    /// An MCP server reached over HTTP, managed independently.
    Service,
}

impl SkillTier {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            SkillTier::Instruction => "instruction",
            SkillTier::Stdio => "stdio",
            SkillTier::Sidecar => "sidecar",
            SkillTier::Service => "service",
        }
    }

    pub(crate) fn parse(s: &str) -> Self {
        match s {
            "stdio" => SkillTier::Stdio,
            "sidecar" => SkillTier::Sidecar,
            "service" => SkillTier::Service,
            _ => SkillTier::Instruction,
        }
    }
}

/// Who owns a skill row, controlling who may mutate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillOwner {
    /// Provisioned by the operator; read-only to the agent.
    System,
    /// Created or modified by the agent itself via self-management tools.
    Agent,
}

impl SkillOwner {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            SkillOwner::System => "system",
            SkillOwner::Agent => "agent",
        }
    }

    pub(crate) fn parse(s: &str) -> Self {
        match s {
            "agent" => SkillOwner::Agent,
            _ => SkillOwner::System,
        }
    }
}

/// A row in the `skills` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    /// Unique id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Skill's own version string.
    pub version: String,
    /// Human-readable description.
    pub description: String,
    /// Tier, controlling how the registry binds the skill.
    pub tier: SkillTier,
    /// Transport for non-instruction tiers (`"stdio"` or `"http"`).
    pub transport: Option<String>,
    /// Whether the registry should currently bind this skill's tools.
    pub enabled: bool,
    /// Tier-specific configuration.
    pub config: serde_json::Value,
    /// Who may mutate this row.
    pub owner: SkillOwner,
    /// Stdio-tier: the command to spawn.
    pub stdio_command: Option<String>,
    /// Stdio-tier: arguments to the command.
    pub stdio_args: Option<serde_json::Value>,
    /// HTTP-tier: the streamable-HTTP endpoint.
    pub http_url: Option<String>,
    /// Instruction-tier: path to the instruction file, if file-backed.
    pub instruction_path: Option<String>,
    /// Instruction-tier: inline instruction content, if not file-backed.
    pub instruction_content: Option<String>,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
    /// ISO-8601 last-update timestamp.
    pub updated_at: String,
}

/// Metadata row for a memory entry. The embedding vector itself lives in
/// the vector store (`brain-memory`'s concern); this row is what the
/// relational store can answer CRUD/listing queries over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntryMeta {
    /// Unique id, shared with the vector store's entry id.
    pub id: String,
    /// The stored text.
    pub content: String,
    /// Free-form category string (no semantic effect — spec §9).
    pub category: String,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
    /// ISO-8601 last-update timestamp.
    pub updated_at: String,
}

/// An append-only snapshot written by a departing Brain instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffNote {
    /// Unique id.
    pub id: String,
    /// Departing instance's version.
    pub from_version: String,
    /// Joining instance's version, if known.
    pub to_version: Option<String>,
    /// Conversation ids with in-flight or recently-active state.
    pub active_conversations: Vec<String>,
    /// Schedule ids pending at handoff time.
    pub pending_schedules: Vec<String>,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
}

/// A changelog entry, delivered at most once via the system prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangelogEntry {
    /// Version this entry describes (primary key).
    pub version: String,
    /// Human-readable summary.
    pub summary: String,
    /// Whether this entry has already been surfaced once.
    pub delivered: bool,
}

/// A row in the `task_pods` table — one ephemeral, isolated workload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskPod {
    /// Unique id.
    pub task_id: String,
    /// Optional named recipe the task was built from.
    pub recipe: Option<String>,
    /// Toolbox/image identifier the task runs in.
    pub toolbox: String,
    /// Whether the task runs the agent loop or a fixed script.
    pub mode: String,
    /// The task's natural-language or script goal.
    pub goal: String,
    /// Requested mounts, if any.
    pub mounts: Option<serde_json::Value>,
    /// Underlying workload resource name (e.g. Kubernetes Job name).
    pub job_name: String,
    /// Current status.
    pub status: String,
    /// Result payload, once completed.
    pub result: Option<serde_json::Value>,
    /// Error string, once failed.
    pub error: Option<String>,
    /// Wall-clock duration once terminal.
    pub duration_ms: Option<i64>,
    /// Files the task modified, if reported.
    pub files_changed: Option<Vec<String>>,
    /// Trace id for correlation.
    pub trace_id: Option<String>,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
    /// ISO-8601 last-update timestamp.
    pub updated_at: String,
}

/// A secret, returned to callers only in masked form
/// (all but the last four characters elided).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskedSecret {
    /// The secret's key.
    pub key: String,
    /// All but the last four characters replaced with `*`.
    pub masked_value: String,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
    /// ISO-8601 last-update timestamp.
    pub updated_at: String,
}

pub(crate) fn mask(value: &str) -> String {
    let len = value.chars().count();
    if len <= 4 {
        return "*".repeat(len);
    }
    let visible: String = value.chars().skip(len - 4).collect();
    format!("{}{}", "*".repeat(len - 4), visible)
}
