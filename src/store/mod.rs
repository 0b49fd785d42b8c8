//! Heading records, cross-document key deduplication, and JSON persistence.

mod global;
pub mod keys;
mod persist;
pub mod types;

pub use global::{GlobalStore, MergeSummary};
pub use keys::unique_key;
pub use persist::{load_store, save_store, write_store};
pub use types::{HeadingRecord, Sections, StoreError, USER_INPUT_SOURCE};
