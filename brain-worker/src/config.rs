//! Worker configuration (SPEC_FULL.md §2, §4.5): environment variables
//! only, same env-or-default idiom as the `brain` daemon's own config.

/// Which LLM backend agent-mode jobs run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// `brain-provider-anthropic`.
    Anthropic,
    /// `brain-provider-openai`.
    OpenAi,
    /// `brain-provider-ollama`.
    Ollama,
}

/// Errors constructing a [`Config`] from the process environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `BRAIN_PROVIDER` was set to something other than
    /// `anthropic`/`openai`/`ollama`.
    #[error("unknown BRAIN_PROVIDER {0:?}, expected anthropic|openai|ollama")]
    UnknownProvider(String),

    /// The selected provider needs an API key and none was set.
    #[error("{0}_API_KEY is not set")]
    MissingApiKey(&'static str),
}

/// Resolved worker configuration.
pub struct Config {
    /// NATS server URL.
    pub nats_url: String,
    /// This worker's identity, reported in every `JobStatus` it publishes.
    pub worker_id: String,
    /// Durable queue-group name every worker instance shares, so each
    /// dispatched job lands on exactly one of them.
    pub queue_group: String,
    /// Which provider agent-mode jobs run against.
    pub provider: ProviderKind,
    /// API key for the selected provider, when it needs one.
    pub provider_api_key: Option<String>,
    /// Model identifier for agent-mode jobs.
    pub model: String,
    /// Working directory command-mode jobs run in.
    pub command_workdir: std::path::PathBuf,
    /// Upper bound on a single job's execution time.
    pub job_timeout: std::time::Duration,
    /// Path to the same SQLite store the `brain` daemon writes jobs
    /// into — lets `dispatch_job`/`get_job_status`/`list_jobs` built-ins
    /// work from agent-mode jobs the same way they do from `brain` itself.
    pub store_path: std::path::PathBuf,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let provider = match env_or("BRAIN_PROVIDER", "anthropic").as_str() {
            "anthropic" => ProviderKind::Anthropic,
            "openai" => ProviderKind::OpenAi,
            "ollama" => ProviderKind::Ollama,
            other => return Err(ConfigError::UnknownProvider(other.to_string())),
        };

        let provider_api_key = match provider {
            ProviderKind::Anthropic => Some(
                std::env::var("ANTHROPIC_API_KEY")
                    .map_err(|_| ConfigError::MissingApiKey("ANTHROPIC"))?,
            ),
            ProviderKind::OpenAi => Some(
                std::env::var("OPENAI_API_KEY")
                    .map_err(|_| ConfigError::MissingApiKey("OPENAI"))?,
            ),
            ProviderKind::Ollama => None,
        };

        let timeout_secs: u64 = env_or("BRAIN_WORKER_JOB_TIMEOUT_SECS", "300")
            .parse()
            .unwrap_or(300);

        Ok(Self {
            nats_url: env_or("BRAIN_NATS_URL", "nats://127.0.0.1:4222"),
            worker_id: env_or("BRAIN_WORKER_ID", "brain-worker-0"),
            queue_group: env_or("BRAIN_WORKER_QUEUE_GROUP", "brain-workers"),
            provider,
            provider_api_key,
            model: env_or("BRAIN_MODEL", "claude-sonnet-4-5"),
            command_workdir: std::path::PathBuf::from(env_or("BRAIN_WORKER_WORKDIR", ".")),
            job_timeout: std::time::Duration::from_secs(timeout_secs),
            store_path: std::path::PathBuf::from(env_or("BRAIN_STORE_PATH", "brain.sqlite3")),
        })
    }
}
