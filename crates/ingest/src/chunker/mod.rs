//! Sentence-aware chunking engine.
//!
//! Splits document text into sentences, then greedily packs them into chunks
//! of at most `chunk_size` whitespace tokens, carrying the trailing
//! `chunk_overlap` sentences of each chunk into the next. Sentences longer than
//! a whole chunk are cut at word boundaries. When no splitter can segment the
//! text, a plain sliding word window is used instead.

mod helpers;
mod strategies;
mod types;

pub use helpers::{assemble_chunks, count_tokens, sliding_window_chunks};
pub use strategies::{PunctuationSplitter, SentenceSplitter, UnicodeSentenceSplitter};
pub use types::{ChunkConfig, SegmentationError};

use tracing::{debug, warn};

/// Turns raw document text into an ordered list of chunk strings.
pub struct Chunker {
    config: ChunkConfig,
    primary: Box<dyn SentenceSplitter>,
    fallback: Box<dyn SentenceSplitter>,
}

impl Chunker {
    /// Chunker using UAX #29 sentence boundaries, falling back to a
    /// punctuation regex.
    pub fn new(config: ChunkConfig) -> Self {
        Self::with_splitters(
            config,
            Box::new(UnicodeSentenceSplitter),
            Box::new(PunctuationSplitter),
        )
    }

    pub fn with_splitters(
        config: ChunkConfig,
        primary: Box<dyn SentenceSplitter>,
        fallback: Box<dyn SentenceSplitter>,
    ) -> Self {
        let normalized = config.normalized();
        if normalized != config {
            warn!(
                requested_size = config.chunk_size,
                requested_overlap = config.chunk_overlap,
                chunk_size = normalized.chunk_size,
                chunk_overlap = normalized.chunk_overlap,
                "Chunk overlap must be smaller than chunk size; adjusted"
            );
        }
        Self {
            config: normalized,
            primary,
            fallback,
        }
    }

    /// The effective (normalized) configuration.
    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Chunk `text`. Empty or whitespace-only text yields no chunks; any other
    /// text yields at least one.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let chunks = match self.split_sentences(text) {
            Some(sentences) => assemble_chunks(&sentences, &self.config),
            None => {
                warn!("Sentence segmentation unavailable, using sliding word window");
                sliding_window_chunks(text, &self.config)
            }
        };

        // A splitter that returned nothing usable for non-blank text.
        let chunks = if chunks.is_empty() {
            sliding_window_chunks(text, &self.config)
        } else {
            chunks
        };

        debug!(
            chunks = chunks.len(),
            chunk_size = self.config.chunk_size,
            chunk_overlap = self.config.chunk_overlap,
            "Chunked text"
        );
        chunks
    }

    /// Split into sentences with the primary splitter, then the fallback.
    /// `None` when both fail.
    pub fn split_sentences(&self, text: &str) -> Option<Vec<String>> {
        match self.primary.split(text) {
            Ok(sentences) => return Some(sentences),
            Err(e) => warn!(
                splitter = self.primary.name(),
                fallback = self.fallback.name(),
                "Sentence splitter failed: {e}"
            ),
        }
        match self.fallback.split(text) {
            Ok(sentences) => Some(sentences),
            Err(e) => {
                warn!(splitter = self.fallback.name(), "Fallback sentence splitter failed: {e}");
                None
            }
        }
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(ChunkConfig::default())
    }
}
