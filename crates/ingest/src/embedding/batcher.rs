use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use redline_core::{Config, RetryPolicy};
use tracing::{error, info, warn};

use super::traits::{Embedder, EmbeddingError};

/// Embeds texts in fixed-size batches, one batch at a time, retrying rate
/// limited batches with the configured backoff.
pub struct EmbeddingClient {
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
    retry: RetryPolicy,
    show_progress: bool,
}

impl EmbeddingClient {
    pub fn new(embedder: Arc<dyn Embedder>, batch_size: usize, retry: RetryPolicy) -> Self {
        Self {
            embedder,
            batch_size: batch_size.max(1),
            retry,
            show_progress: false,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, EmbeddingError> {
        let embedder = super::create_embedder(config)?;
        Ok(Self::new(
            embedder,
            config.embedding.batch_size,
            RetryPolicy::from_config(&config.retry),
        ))
    }

    /// Draw a progress bar over batches on stderr.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    fn progress_bar(&self, batches: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(batches as u64);
        let style = ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} batches")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        pb.set_style(style);
        pb.set_message("Embedding");
        pb
    }

    /// Embed every text, returning one slot per input in the same order.
    ///
    /// Blank texts are never sent and yield `None`. A batch that still fails
    /// after retries yields `None` for each of its texts; other batches are
    /// unaffected.
    pub async fn embed_all(&self, texts: &[String]) -> Vec<Option<Vec<f32>>> {
        let mut results: Vec<Option<Vec<f32>>> = vec![None; texts.len()];

        let pending: Vec<(usize, &str)> = texts
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.trim().is_empty())
            .map(|(i, t)| (i, t.as_str()))
            .collect();
        let skipped = texts.len() - pending.len();
        if skipped > 0 {
            warn!(skipped, "Skipping empty texts for embedding");
        }

        let batches: Vec<&[(usize, &str)]> = pending.chunks(self.batch_size).collect();
        let pb = self.progress_bar(batches.len());

        for (n, batch) in batches.iter().enumerate() {
            let inputs: Vec<&str> = batch.iter().map(|(_, t)| *t).collect();
            let outcome = self
                .retry
                .run("embedding", || self.embedder.embed_batch(&inputs))
                .await;

            match outcome {
                Ok(vectors) if vectors.len() == batch.len() => {
                    for ((i, _), vector) in batch.iter().zip(vectors) {
                        results[*i] = Some(vector);
                    }
                }
                Ok(vectors) => {
                    warn!(
                        batch = n + 1,
                        expected = batch.len(),
                        received = vectors.len(),
                        "Embedding count mismatch, dropping batch"
                    );
                }
                Err(e) => {
                    error!(batch = n + 1, size = batch.len(), "Failed to embed batch: {e}");
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        let embedded = results.iter().filter(|r| r.is_some()).count();
        info!(embedded, total = texts.len(), batches = batches.len(), "Embedding complete");
        results
    }
}
