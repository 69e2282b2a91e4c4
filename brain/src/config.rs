//! Daemon configuration (SPEC_FULL.md §5, §8).
//!
//! Every setting is an environment variable with a conservative local
//! default, in the style of the example repos in this workspace's
//! retrieval pack: no config file, no CLI flags, just `env::var` with
//! `unwrap_or_else` fallbacks read once at startup.

use std::path::PathBuf;

/// Which LLM backend `main` wires a [`brain_model::provider::Provider`]
/// implementation for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// `brain-provider-anthropic`.
    Anthropic,
    /// `brain-provider-openai`.
    OpenAi,
    /// `brain-provider-ollama`, no API key required.
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

/// Resolved daemon configuration. Built once in `main` via [`Config::from_env`].
pub struct Config {
    /// SQLite path for `brain-store`'s relational rows.
    pub store_path: PathBuf,
    /// SQLite path for `brain-memory`'s embedding vectors.
    pub vector_path: PathBuf,
    /// NATS server URL for `brain-bus`.
    pub nats_url: String,
    /// Address the HTTP surface binds to.
    pub http_addr: String,
    /// Bearer token the HTTP surface requires on every gated route.
    pub http_token: String,
    /// 32-byte key used to encrypt secrets at rest (`brain-http`'s
    /// `/secrets` routes). Must be exactly 32 bytes once decoded.
    pub secrets_key: [u8; 32],
    /// Which provider to construct.
    pub provider: ProviderKind,
    /// API key for the selected provider, when it needs one.
    pub provider_api_key: Option<String>,
    /// Model identifier passed as `ReactConfig::default_model`.
    pub model: String,
    /// Embedding model `brain-memory`'s HTTP embedder requests.
    pub embedding_model: String,
    /// Base URL of the embeddings API (Ollama-compatible by default).
    pub embedding_api_url: String,
    /// This instance's identity for `brain-transfer`'s handshake.
    pub instance_id: String,
    /// Reported in `TransferReady`; bump on every release.
    pub version: String,
    /// Unobserved-token-count threshold that fires the memory observer.
    pub memory_obs_threshold: i64,
    /// Turns-since-reflection threshold that fires the memory reflector.
    pub memory_ref_threshold: i64,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Read configuration from the process environment, falling back to
    /// defaults suitable for a single local instance talking to a
    /// co-located NATS server.
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

        let secrets_key_hex = env_or(
            "BRAIN_SECRETS_KEY",
            "0000000000000000000000000000000000000000000000000000000000000000",
        );
        let secrets_key = decode_key(&secrets_key_hex);

        Ok(Self {
            store_path: PathBuf::from(env_or("BRAIN_STORE_PATH", "brain.sqlite3")),
            vector_path: PathBuf::from(env_or("BRAIN_VECTOR_PATH", "brain-vectors.sqlite3")),
            nats_url: env_or("BRAIN_NATS_URL", "nats://127.0.0.1:4222"),
            http_addr: env_or("BRAIN_HTTP_ADDR", "0.0.0.0:8080"),
            http_token: env_or("BRAIN_HTTP_TOKEN", "dev-token"),
            secrets_key,
            provider,
            provider_api_key,
            model: env_or("BRAIN_MODEL", "claude-sonnet-4-5"),
            embedding_model: env_or("BRAIN_EMBEDDING_MODEL", "nomic-embed-text"),
            embedding_api_url: env_or("BRAIN_EMBEDDING_API_URL", "http://127.0.0.1:11434/api/embeddings"),
            instance_id: env_or("BRAIN_INSTANCE_ID", "brain-0"),
            version: env!("CARGO_PKG_VERSION").to_string(),
            memory_obs_threshold: env_or("BRAIN_MEMORY_OBS_THRESHOLD", "2000")
                .parse()
                .unwrap_or(2000),
            memory_ref_threshold: env_or("BRAIN_MEMORY_REF_THRESHOLD", "20")
                .parse()
                .unwrap_or(20),
        })
    }
}

/// Best-effort hex decode into a 32-byte key. Short or malformed input is
/// padded/truncated rather than rejected — `BRAIN_SECRETS_KEY` is meant to
/// be set in production, and a soft fallback keeps local development
/// from failing to boot over a missing key.
fn decode_key(hex: &str) -> [u8; 32] {
    let mut key = [0u8; 32];
    let bytes: Vec<u8> = (0..hex.len())
        .step_by(2)
        .filter_map(|i| hex.get(i..i + 2))
        .filter_map(|byte| u8::from_str_radix(byte, 16).ok())
        .collect();
    let n = bytes.len().min(32);
    key[..n].copy_from_slice(&bytes[..n]);
    key
}
