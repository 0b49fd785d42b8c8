//! Heading records and error types for the persisted store.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Insertion-ordered mapping from heading key to record.
pub type Sections = IndexMap<String, HeadingRecord>;

/// Source name attached to records created from free-text submissions.
pub const USER_INPUT_SOURCE: &str = "user_input";

/// A heading and the body text that follows it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadingRecord {
    /// Stable identifier assigned at creation; falls back to the store key when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Heading text as it appeared in the source.
    #[serde(default)]
    pub title: String,
    /// Origin document name.
    #[serde(default)]
    pub source: String,
    /// Body text joined with single spaces.
    #[serde(default)]
    pub content: String,
    /// Nested headings keyed like the top level.
    #[serde(default)]
    pub subsections: Sections,
}

impl HeadingRecord {
    /// Create an empty heading attributed to `source`.
    pub fn new(title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source: source.into(),
            ..Self::default()
        }
    }

    /// Identifier used when the record is indexed under `key`.
    pub fn effective_id<'a>(&'a self, key: &'a str) -> &'a str {
        self.id.as_deref().unwrap_or(key)
    }
}

/// Errors raised while reading or writing the persisted store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem access failed.
    #[error("Store I/O failed for {path}: {source}")]
    Io {
        /// Store location.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The store could not be encoded as JSON.
    #[error("Failed to serialize store: {0}")]
    Serialize(#[from] serde_json::Error),
}
