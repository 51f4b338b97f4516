use redline_core::config::{LlmConfig, OllamaConfig};
use redline_core::{KnowledgeEntry, RetryPolicy};
use tracing::{error, info};

use crate::prompt::build_revision_messages;
use crate::provider::{LlmError, LlmProvider};

/// Produces a policy-aligned revision of a contract via an LLM provider.
pub struct ContractReviser {
    provider: Box<dyn LlmProvider>,
    retry: RetryPolicy,
    temperature: f32,
    max_tokens: u32,
}

impl ContractReviser {
    pub fn new(
        provider: Box<dyn LlmProvider>,
        retry: RetryPolicy,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self {
            provider,
            retry,
            temperature,
            max_tokens,
        }
    }

    /// Build from config, creating the appropriate provider.
    pub fn from_config(
        llm_config: &LlmConfig,
        ollama_config: &OllamaConfig,
        retry: RetryPolicy,
    ) -> Result<Self, LlmError> {
        let provider = crate::providers::create_provider(llm_config, ollama_config)?;
        Ok(Self::new(
            provider,
            retry,
            llm_config.temperature,
            llm_config.max_tokens,
        ))
    }

    /// Revised contract text, or the error that ended the last attempt.
    pub async fn try_revise(
        &self,
        chunks: &[String],
        entries: &[Vec<KnowledgeEntry>],
    ) -> Result<String, LlmError> {
        let messages = build_revision_messages(chunks, entries);
        info!(chunks = chunks.len(), "Requesting contract revision");

        let text = self
            .retry
            .run("contract revision", || {
                self.provider
                    .complete(messages.clone(), self.temperature, self.max_tokens)
            })
            .await?;

        if text.trim().is_empty() {
            return Err(LlmError::ParseError("empty completion".into()));
        }
        Ok(text)
    }

    /// Revised contract text, or `None` when the service could not produce one.
    pub async fn revise(&self, chunks: &[String], entries: &[Vec<KnowledgeEntry>]) -> Option<String> {
        match self.try_revise(chunks, entries).await {
            Ok(text) => Some(text),
            Err(e) => {
                error!("Error in chat completion: {e}");
                None
            }
        }
    }
}
