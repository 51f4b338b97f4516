pub mod batcher;
pub mod ollama;
pub mod openai;
pub mod traits;

use std::sync::Arc;

use redline_core::Config;

pub use batcher::EmbeddingClient;
pub use ollama::OllamaEmbedder;
pub use openai::OpenAiEmbedder;
pub use traits::{Embedder, EmbeddingError};

/// Create an embedding backend from config.
pub fn create_embedder(config: &Config) -> Result<Arc<dyn Embedder>, EmbeddingError> {
    let embedding = &config.embedding;
    match embedding.provider.as_str() {
        "openai" => {
            let api_key = config
                .llm
                .openai_api_key
                .clone()
                .ok_or_else(|| EmbeddingError::NotConfigured("OPENAI_API_KEY is not set".into()))?;
            Ok(Arc::new(OpenAiEmbedder::new(
                api_key,
                embedding.model.clone(),
                config.llm.openai_base_url.clone(),
                embedding.dimensions,
            )))
        }
        "ollama" => Ok(Arc::new(OllamaEmbedder::new(
            config.ollama.url.clone(),
            config.ollama.embedding_model.clone(),
            embedding.dimensions,
        ))),
        other => Err(EmbeddingError::NotConfigured(format!(
            "unknown embedding provider: {other}"
        ))),
    }
}
