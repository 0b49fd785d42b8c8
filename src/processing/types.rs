//! Core data types and error definitions for the processing pipeline.

use serde::Serialize;
use thiserror::Error;

use crate::{extraction::ExtractionError, search::SearchError, store::StoreError};

/// Errors produced while splitting free text into chunks.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// A submission was chunked with an impossible word budget.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
}

/// Errors emitted by the knowledge service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The input directory could not be processed.
    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),
    /// Reading or writing the persisted store failed.
    #[error("Store unavailable: {0}")]
    Store(#[from] StoreError),
    /// Chunking rejected the submission.
    #[error("Failed to chunk submission: {0}")]
    Chunking(#[from] ChunkingError),
    /// The search engine rejected a request.
    #[error("Search engine request failed: {0}")]
    Search(#[from] SearchError),
    /// An operation needed the search engine but none is configured.
    #[error("No search engine configured; set ES_HOST")]
    SearchDisabled,
    /// A blocking extraction task panicked or was cancelled.
    #[error("Extraction task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Summary of a directory rebuild.
#[derive(Debug, Clone, Serialize)]
pub struct RebuildOutcome {
    /// Documents merged into the store.
    pub documents_processed: usize,
    /// Documents skipped because they were unreadable or empty.
    pub documents_skipped: usize,
    /// Top-level headings extracted from the directory.
    pub headings: usize,
    /// Free-text chunk records carried over from the previous store.
    pub submissions_kept: usize,
}

/// Summary of a free-text submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    /// Identifiers of the chunk records, in part order.
    pub chunk_ids: Vec<String>,
    /// Records pushed to the search engine (zero when indexing is disabled).
    pub indexed: usize,
}
