//! Word-budget chunking of free-text submissions.
//!
//! Long submissions are split on whitespace into parts of at most `chunk_words` words, each
//! titled `"{title} (Part i/n)"`. Every part becomes a synthetic heading record carrying a
//! random v4 UUID, so chunk keys never depend on the title and cannot collide with keys
//! derived from PDF headings.

use uuid::Uuid;

use crate::store::{HeadingRecord, Sections, USER_INPUT_SOURCE};

use super::types::ChunkingError;

/// Default word budget per chunk.
pub const DEFAULT_CHUNK_WORDS: usize = 1000;

/// One titled slice of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPart {
    /// Part title; the submission title when no split was needed.
    pub title: String,
    /// Part text.
    pub content: String,
}

/// Split `content` into titled parts of at most `chunk_words` words.
///
/// Content within budget comes back as a single, untouched part. Otherwise the words are
/// rejoined with single spaces, so whitespace runs inside the original collapse, but no word
/// is dropped or reordered.
pub fn split_submission(
    title: &str,
    content: &str,
    chunk_words: usize,
) -> Result<Vec<ChunkPart>, ChunkingError> {
    if chunk_words == 0 {
        return Err(ChunkingError::InvalidChunkSize);
    }

    let words: Vec<&str> = content.split_whitespace().collect();
    if words.len() <= chunk_words {
        return Ok(vec![ChunkPart {
            title: title.to_string(),
            content: content.to_string(),
        }]);
    }

    let total = words.len().div_ceil(chunk_words);
    Ok(words
        .chunks(chunk_words)
        .enumerate()
        .map(|(index, slice)| ChunkPart {
            title: format!("{title} (Part {}/{total})", index + 1),
            content: slice.join(" "),
        })
        .collect())
}

/// Build the synthetic records for a submission, keyed by their generated identifiers.
pub fn chunk_records(
    title: &str,
    content: &str,
    chunk_words: usize,
) -> Result<Sections, ChunkingError> {
    let parts = split_submission(title, content, chunk_words)?;
    tracing::debug!(title, parts = parts.len(), chunk_words, "Submission chunked");

    Ok(parts
        .into_iter()
        .map(|part| {
            let id = Uuid::new_v4().to_string();
            let record = HeadingRecord {
                id: Some(id.clone()),
                title: part.title,
                source: USER_INPUT_SOURCE.to_string(),
                content: part.content,
                subsections: Sections::new(),
            };
            (id, record)
        })
        .collect())
}
