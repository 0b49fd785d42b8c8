//! Projection of the heading hierarchy into search-ready records.

use serde::{Deserialize, Serialize};

use crate::store::{GlobalStore, HeadingRecord, Sections};

/// Denormalized record handed to the search engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRecord {
    /// Upsert key: the record's assigned identifier, else its store key.
    pub id: String,
    /// Heading title.
    pub title: String,
    /// Joined body text.
    pub content: String,
    /// Origin document name.
    pub source: String,
}

impl FlatRecord {
    fn from_entry(key: &str, record: &HeadingRecord) -> Self {
        Self {
            id: record.effective_id(key).to_string(),
            title: record.title.clone(),
            content: record.content.clone(),
            source: record.source.clone(),
        }
    }
}

/// Flatten `sections` depth-first: each record precedes its subsections, and siblings keep
/// their insertion order.
///
/// Traversal uses an explicit stack of sibling iterators rather than recursion.
pub fn flatten_sections(sections: &Sections) -> Vec<FlatRecord> {
    let mut records = Vec::new();
    let mut stack = vec![sections.iter()];

    while let Some(siblings) = stack.last_mut() {
        match siblings.next() {
            Some((key, record)) => {
                records.push(FlatRecord::from_entry(key, record));
                if !record.subsections.is_empty() {
                    stack.push(record.subsections.iter());
                }
            }
            None => {
                stack.pop();
            }
        }
    }

    records
}

/// Flatten the whole store in its insertion order.
pub fn flatten_store(store: &GlobalStore) -> Vec<FlatRecord> {
    flatten_sections(store.sections())
}
