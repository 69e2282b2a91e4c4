//! Provider trait for LLM backends.
//!
//! The [`Provider`] trait uses RPITIT (return-position `impl Trait` in traits)
//! and is intentionally NOT object-safe. The object-safe boundary is
//! `brain_proto::Turn` — the agent loop (`brain-agent`), generic over `P: Provider`, implements Turn.

use crate::types::{ProviderRequest, ProviderResponse};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Errors from LLM providers.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Authentication/authorization failed (bad or missing API key).
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The request was malformed or rejected by the provider as invalid.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The requested model does not exist or isn't accessible.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// Provider rate-limited the request. `retry_after` is populated when
    /// the provider's response included a `Retry-After` header.
    #[error("rate limited")]
    RateLimit {
        /// Delay before retrying, if the provider specified one.
        retry_after: Option<Duration>,
    },

    /// The provider is temporarily overloaded or unavailable.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The request timed out.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// A transport-level (connection, TLS, DNS) error occurred.
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The provider's response could not be parsed.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ProviderError {
    /// Whether retrying this request might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimit { .. }
                | ProviderError::ServiceUnavailable(_)
                | ProviderError::Timeout(_)
                | ProviderError::Network(_)
        )
    }
}

/// LLM provider interface.
///
/// Each provider (Anthropic, OpenAI, Ollama) implements this trait.
/// Provider-native features (truncation, caching, thinking blocks)
/// are handled by the provider impl using `ProviderRequest.extra`.
///
/// This trait uses RPITIT and is NOT object-safe. That's intentional —
/// the agent loop is generic over `P: Provider`, and the object-safe boundary
/// is `brain_proto::Turn`.
pub trait Provider: Send + Sync {
    /// Send a completion request to the provider.
    fn complete(
        &self,
        request: ProviderRequest,
    ) -> impl Future<Output = Result<ProviderResponse, ProviderError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_display() {
        assert_eq!(
            ProviderError::ServiceUnavailable("overloaded".into()).to_string(),
            "service unavailable: overloaded"
        );
        assert_eq!(
            ProviderError::RateLimit { retry_after: None }.to_string(),
            "rate limited"
        );
        assert_eq!(
            ProviderError::Authentication("bad key".into()).to_string(),
            "authentication failed: bad key"
        );
        assert_eq!(
            ProviderError::InvalidResponse("bad json".into()).to_string(),
            "invalid response: bad json"
        );
    }

    #[test]
    fn provider_error_retryable() {
        assert!(ProviderError::RateLimit { retry_after: None }.is_retryable());
        assert!(ProviderError::ServiceUnavailable("timeout".into()).is_retryable());
        assert!(ProviderError::Timeout(Duration::from_secs(30)).is_retryable());
        assert!(!ProviderError::Authentication("bad key".into()).is_retryable());
        assert!(!ProviderError::InvalidResponse("x".into()).is_retryable());
        assert!(!ProviderError::ModelNotFound("x".into()).is_retryable());
        assert!(!ProviderError::InvalidRequest("x".into()).is_retryable());
    }
}
