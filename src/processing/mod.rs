//! Free-text chunking, hierarchy flattening, and the knowledge service orchestrating them.

pub mod chunking;
pub mod flatten;
mod service;
pub mod types;

pub use chunking::{ChunkPart, DEFAULT_CHUNK_WORDS, chunk_records, split_submission};
pub use flatten::{FlatRecord, flatten_sections, flatten_store};
pub use service::{KnowledgeService, ServiceOptions};
pub use types::{ChunkingError, RebuildOutcome, ServiceError, SubmissionOutcome};
