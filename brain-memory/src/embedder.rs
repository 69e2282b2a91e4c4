//! Text embedding.

use crate::error::MemoryError;
use async_trait::async_trait;

/// Computes a dense vector embedding for a piece of text.
///
/// `store` calls this lazily, once per call, and rejects the whole
/// operation on failure (no silent "stored without a vector" fallback).
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed `text`, returning a dense vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError>;
}

/// Embeds text via an OpenAI-compatible `/embeddings` HTTP endpoint.
/// Works against OpenAI itself or any self-hosted server speaking the
/// same wire format (Ollama's `/api/embeddings`-compatible proxies,
/// local embedding servers, etc).
pub struct HttpEmbedder {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
}

impl HttpEmbedder {
    /// Create an embedder pointed at `api_url` (e.g.
    /// `https://api.openai.com/v1/embeddings`), using `model` for every
    /// request.
    pub fn new(api_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key: None,
            model: model.into(),
        }
    }

    /// Attach a bearer token for backends that require authentication.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

#[derive(serde::Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(serde::Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(serde::Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
        let mut req = self.client.post(&self.api_url).json(&EmbeddingRequest {
            model: &self.model,
            input: text,
        });
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let response = req.send().await.map_err(MemoryError::EmbeddingBackend)?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MemoryError::Embedding(format!("{status}: {body}")));
        }
        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(MemoryError::EmbeddingBackend)?;
        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| MemoryError::Embedding("empty embedding response".into()))
    }
}

/// Cosine similarity between two equal-length vectors. Returns 0.0 for
/// a degenerate (zero-norm) input rather than dividing by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
