//! The merged, deduplicated corpus of heading records.

use serde::{Deserialize, Serialize};

use super::keys::unique_key;
use super::types::{HeadingRecord, Sections};

/// Outcome of merging one document's headings into the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Number of records inserted.
    pub inserted: usize,
    /// `(original, rewritten)` pairs for keys that collided with existing entries.
    pub renamed: Vec<(String, String)>,
}

/// Top-level key to record mapping shared by every processed document and submission.
///
/// Keys are unique across the whole store. Uniqueness is enforced by [`GlobalStore::merge`],
/// which is the only way records enter the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobalStore {
    sections: Sections,
}

impl GlobalStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one document's top-level headings, renaming keys that are already present.
    ///
    /// Records are inserted in the document's own order; a colliding key gets the smallest
    /// `" (n)"` suffix (`n >= 2`) that is still free. Existing records are never touched.
    pub fn merge(&mut self, document: Sections) -> MergeSummary {
        let mut summary = MergeSummary::default();

        for (key, record) in document {
            let final_key = unique_key(&key, |candidate| self.sections.contains_key(candidate));
            if final_key != key {
                tracing::debug!(original = %key, rewritten = %final_key, "Renamed colliding key");
                summary.renamed.push((key, final_key.clone()));
            }
            self.sections.insert(final_key, record);
            summary.inserted += 1;
        }

        summary
    }

    /// Number of top-level records.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Look up a top-level record by key.
    pub fn get(&self, key: &str) -> Option<&HeadingRecord> {
        self.sections.get(key)
    }

    /// Top-level keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Borrow the underlying mapping.
    pub fn sections(&self) -> &Sections {
        &self.sections
    }

    /// Consume the store, yielding its mapping in insertion order.
    pub fn into_sections(self) -> Sections {
        self.sections
    }
}
