//! Per-job execution errors (SPEC_FULL.md §4.5). Every variant's
//! `Display` becomes the `error` field of the terminal `JobStatus`.

/// Why a job failed to run to completion.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// Command-mode job: the job carried no `command` field.
    #[error("command job missing a command")]
    MissingCommand,
    /// Command-mode job: spawning the shell failed.
    #[error("spawn failed: {0}")]
    Spawn(#[source] std::io::Error),
    /// Command-mode job: the command exited non-zero.
    #[error("command exited with status {0}")]
    NonZeroExit(i32),
    /// HTTP-mode job: the job carried no `url` field.
    #[error("http job missing a url")]
    MissingUrl,
    /// HTTP-mode job: the request itself failed (DNS, connect, TLS, …).
    #[error("http request failed: {0}")]
    Request(#[source] reqwest::Error),
    /// HTTP-mode job: the server responded with a non-2xx status.
    #[error("http response status {0}")]
    BadStatus(u16),
    /// Agent-mode job: the job carried no payload, or it didn't parse.
    #[error("agent job payload invalid: {0}")]
    BadPayload(#[source] serde_json::Error),
    /// Agent-mode job: the turn itself failed.
    #[error("agent turn failed: {0}")]
    Turn(#[source] brain_proto::TurnError),
    /// The job ran longer than the configured timeout.
    #[error("job exceeded its timeout")]
    Timeout,
}
