//! Search engine adapter for flattened heading records.

mod client;
mod format;
mod types;

pub use client::{ElasticsearchIndex, SearchIndex};
pub use format::{NO_RESULTS, render_context};
pub use types::{IndexSummary, SearchError, SearchHit};
