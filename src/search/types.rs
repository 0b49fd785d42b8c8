//! Shared types used by the search engine client.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Errors returned while interacting with the search engine.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid search engine URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// A record could not be encoded for a bulk request.
    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
    /// The search engine responded with an unexpected status code.
    #[error("Unexpected search engine response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the engine.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Queries were issued before anything was indexed.
    #[error("Index '{0}' does not exist; index documents first")]
    IndexMissing(String),
    /// Some documents in a bulk upsert were rejected.
    #[error("{failed} of {total} documents were rejected: {reason}")]
    BulkRejected {
        /// Number of rejected documents.
        failed: usize,
        /// Number of documents in the request.
        total: usize,
        /// First rejection reason reported by the engine.
        reason: String,
    },
}

/// Counts reported after an upsert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexSummary {
    /// Documents created by the upsert.
    pub inserted: usize,
    /// Documents that replaced an existing id.
    pub updated: usize,
}

/// One ranked result from a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// Document identifier.
    pub id: String,
    /// Relevance score reported by the engine.
    pub score: Option<f64>,
    /// Heading title.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Origin document name.
    pub source: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkResponse {
    #[serde(default)]
    pub(crate) errors: bool,
    #[serde(default)]
    pub(crate) items: Vec<HashMap<String, BulkItem>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkItem {
    #[serde(default)]
    pub(crate) result: Option<String>,
    #[serde(default)]
    pub(crate) error: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub(crate) hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HitsEnvelope {
    #[serde(default)]
    pub(crate) hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawHit {
    #[serde(rename = "_id")]
    pub(crate) id: String,
    #[serde(rename = "_score", default)]
    pub(crate) score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub(crate) source: StoredDocument,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StoredDocument {
    #[serde(default)]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) content: String,
    #[serde(default)]
    pub(crate) source: String,
}

impl From<RawHit> for SearchHit {
    fn from(hit: RawHit) -> Self {
        let RawHit { id, score, source } = hit;
        Self {
            id,
            score,
            title: source.title,
            content: source.content,
            source: source.source,
        }
    }
}
