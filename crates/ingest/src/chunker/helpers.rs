//! Sentence packing and word-window utilities used by the chunker.

use super::types::ChunkConfig;

/// Approximate token count via whitespace splitting.
pub fn count_tokens(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Greedily pack `sentences` into chunks of at most `chunk_size` tokens.
///
/// On overflow the last `chunk_overlap` sentences of the flushed chunk start
/// the next one. Sentences are dropped from the front of that carried tail
/// while it would push the new chunk past `chunk_size`. A sentence longer than
/// `chunk_size` is emitted on its own, cut into groups of exactly `chunk_size`
/// words, and carries no overlap in either direction.
pub fn assemble_chunks(sentences: &[String], config: &ChunkConfig) -> Vec<String> {
    let config = config.normalized();
    let size = config.chunk_size;

    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_size = 0usize;

    for sentence in sentences {
        let sentence = sentence.trim();
        let s_size = count_tokens(sentence);
        if s_size == 0 {
            continue;
        }

        if s_size > size {
            if !current.is_empty() {
                chunks.push(current.join(" "));
                current.clear();
                current_size = 0;
            }
            let words: Vec<&str> = sentence.split_whitespace().collect();
            chunks.extend(words.chunks(size).map(|group| group.join(" ")));
            continue;
        }

        if current_size + s_size > size && !current.is_empty() {
            chunks.push(current.join(" "));

            let keep = config.chunk_overlap.min(current.len());
            let mut carried = current.split_off(current.len() - keep);
            let mut carried_size: usize = carried.iter().map(|s| count_tokens(s)).sum();
            let mut drop = 0;
            while drop < carried.len() && carried_size + s_size > size {
                carried_size -= count_tokens(carried[drop]);
                drop += 1;
            }
            carried.drain(..drop);

            current = carried;
            current.push(sentence);
            current_size = carried_size + s_size;
        } else {
            current.push(sentence);
            current_size += s_size;
        }
    }

    if !current.is_empty() {
        chunks.push(current.join(" "));
    }
    chunks
}

/// Windows of `chunk_size` words advancing by `chunk_size - chunk_overlap`.
/// Any text with at least one word yields at least one window.
pub fn sliding_window_chunks(text: &str, config: &ChunkConfig) -> Vec<String> {
    let config = config.normalized();
    let words: Vec<&str> = text.split_whitespace().collect();
    let step = config.chunk_size.saturating_sub(config.chunk_overlap).max(1);

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < words.len() {
        let end = (start + config.chunk_size).min(words.len());
        chunks.push(words[start..end].join(" "));
        if end == words.len() {
            break;
        }
        start += step;
    }
    chunks
}
