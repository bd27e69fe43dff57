//! Text chunking for ingestion — overlapping, sentence-aligned windows sized
//! for the embedding service.
//!
//! Sizes are measured in estimated tokens (~4 chars per token for English),
//! not an exact tokenizer. A single sentence longer than the window becomes
//! its own chunk rather than being cut mid-sentence.

use once_cell::sync::Lazy;
use regex::Regex;

/// Target chunk size in estimated tokens.
pub const CHUNK_SIZE: usize = 800;
/// Overlap carried between consecutive chunks, in estimated tokens.
pub const CHUNK_OVERLAP: usize = 150;

static EXCESS_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("valid newline regex"));

/// A bounded text window prepared for embedding, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub text: String,
    pub ordinal: usize,
}

/// Rough token count estimate (~4 chars per token for English).
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}

/// Split text into overlapping chunks on sentence boundaries.
///
/// Deterministic for identical input. Empty or whitespace-only input yields
/// an empty vec, not an error.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    let text = EXCESS_NEWLINES.replace_all(text.trim(), "\n\n");
    if text.is_empty() {
        return Vec::new();
    }

    let sentences = split_sentences(&text);
    let mut chunks: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_tokens = 0usize;

    for sentence in sentences {
        let sentence_tokens = estimate_tokens(sentence);

        if current_tokens + sentence_tokens > chunk_size && !current.is_empty() {
            chunks.push(current.join(" "));

            // Carry tail overlap into the next chunk for retrieval continuity
            let mut carried: Vec<&str> = Vec::new();
            let mut carried_tokens = 0usize;
            for s in current.iter().rev() {
                let t = estimate_tokens(s);
                if carried_tokens + t > overlap {
                    break;
                }
                carried.insert(0, s);
                carried_tokens += t;
            }
            current = carried;
            current_tokens = carried_tokens;
        }

        current.push(sentence);
        current_tokens += sentence_tokens;
    }

    if !current.is_empty() {
        chunks.push(current.join(" "));
    }

    chunks
        .into_iter()
        .enumerate()
        .map(|(ordinal, text)| Chunk { text, ordinal })
        .collect()
}

/// Split on sentence-final punctuation (`.`, `!`, `?`) followed by
/// whitespace. The punctuation stays with its sentence; the whitespace run
/// is consumed.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            if let Some(&(_, next)) = chars.peek() {
                if next.is_whitespace() {
                    let end = i + c.len_utf8();
                    sentences.push(&text[start..end]);
                    // Skip the whitespace run; if it reaches EOF there is no tail
                    start = text.len();
                    while let Some(&(j, w)) = chars.peek() {
                        if w.is_whitespace() {
                            chars.next();
                        } else {
                            start = j;
                            break;
                        }
                    }
                }
            }
        }
    }

    if start < text.len() {
        let tail = text[start..].trim_end();
        if !tail.is_empty() {
            sentences.push(tail);
        }
    }

    sentences
}
