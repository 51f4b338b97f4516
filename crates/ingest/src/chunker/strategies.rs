//! Sentence splitting strategies.

use std::sync::OnceLock;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use super::types::SegmentationError;

/// Splits text into ordered, trimmed, non-empty sentences.
pub trait SentenceSplitter: Send + Sync {
    fn name(&self) -> &'static str;

    fn split(&self, text: &str) -> Result<Vec<String>, SegmentationError>;
}

// ── UAX #29 ─────────────────────────────────────────────────────────────────

/// Unicode sentence boundaries (UAX #29). Needs no external resources.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeSentenceSplitter;

impl SentenceSplitter for UnicodeSentenceSplitter {
    fn name(&self) -> &'static str {
        "unicode"
    }

    fn split(&self, text: &str) -> Result<Vec<String>, SegmentationError> {
        Ok(text
            .split_sentence_bounds()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect())
    }
}

// ── Punctuation regex ───────────────────────────────────────────────────────

static SENTENCE_END: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

fn sentence_end() -> Result<&'static Regex, SegmentationError> {
    SENTENCE_END
        .get_or_init(|| Regex::new(r"[.!?]\s+"))
        .as_ref()
        .map_err(|e| SegmentationError::Unavailable(e.to_string()))
}

/// Splits on whitespace that directly follows `.`, `!` or `?`, keeping the
/// punctuation with its sentence.
#[derive(Debug, Clone, Copy, Default)]
pub struct PunctuationSplitter;

impl SentenceSplitter for PunctuationSplitter {
    fn name(&self) -> &'static str {
        "punctuation"
    }

    fn split(&self, text: &str) -> Result<Vec<String>, SegmentationError> {
        let re = sentence_end()?;
        let mut sentences = Vec::new();
        let mut start = 0;
        for m in re.find_iter(text) {
            // The terminator is a single ASCII byte.
            let end = m.start() + 1;
            let piece = text[start..end].trim();
            if !piece.is_empty() {
                sentences.push(piece.to_string());
            }
            start = m.end();
        }
        let tail = text[start..].trim();
        if !tail.is_empty() {
            sentences.push(tail.to_string());
        }
        Ok(sentences)
    }
}
