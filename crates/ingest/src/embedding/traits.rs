use async_trait::async_trait;
use redline_core::{PipelineError, Retryable};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding backend not configured: {0}")]
    NotConfigured(String),
}

impl Retryable for EmbeddingError {
    fn is_retryable(&self) -> bool {
        matches!(self, EmbeddingError::RateLimited(_))
    }
}

impl From<EmbeddingError> for PipelineError {
    fn from(e: EmbeddingError) -> Self {
        match e {
            EmbeddingError::RateLimited(_) => PipelineError::ServiceRateLimited(e.to_string()),
            EmbeddingError::NotConfigured(_) => PipelineError::ConfigurationMissing(e.to_string()),
            _ => PipelineError::ServiceUnavailable(e.to_string()),
        }
    }
}

/// Trait for embedding backends (OpenAI, Ollama, etc.)
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, returning one vector per input text (in order).
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Expected dimensionality of the output vectors, when known.
    fn dimensions(&self) -> Option<usize>;
}

/// Check every vector against the expected dimensionality, if one is set.
pub(crate) fn check_dimensions(
    expected: Option<usize>,
    vectors: &[Vec<f32>],
) -> Result<(), EmbeddingError> {
    let Some(expected) = expected else {
        return Ok(());
    };
    match vectors.iter().find(|v| v.len() != expected) {
        Some(v) => Err(EmbeddingError::DimensionMismatch {
            expected,
            actual: v.len(),
        }),
        None => Ok(()),
    }
}
