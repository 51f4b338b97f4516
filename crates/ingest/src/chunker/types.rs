//! Chunk configuration and segmentation errors.

use redline_core::config::ChunkingConfig;
use thiserror::Error;

const DEFAULT_CHUNK_SIZE: usize = 500;
const DEFAULT_CHUNK_OVERLAP: usize = 50;

// ── Configuration ───────────────────────────────────────────────────────────

/// Configuration for the chunking engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    /// Maximum whitespace tokens per chunk (default: 500).
    pub chunk_size: usize,
    /// Sentences repeated at the start of the next chunk (default: 50).
    pub chunk_overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl ChunkConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Clamp to a usable configuration: a zero size becomes the default, and an
    /// overlap that is not smaller than the size becomes `max(1, size / 10)`.
    pub fn normalized(&self) -> Self {
        let chunk_size = if self.chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            self.chunk_size
        };
        let chunk_overlap = if self.chunk_overlap >= chunk_size {
            (chunk_size / 10).max(1)
        } else {
            self.chunk_overlap
        };
        Self {
            chunk_size,
            chunk_overlap,
        }
    }
}

impl From<&ChunkingConfig> for ChunkConfig {
    fn from(config: &ChunkingConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap)
    }
}

// ── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SegmentationError {
    #[error("splitter unavailable: {0}")]
    Unavailable(String),
    #[error("segmentation failed: {0}")]
    Failed(String),
}
