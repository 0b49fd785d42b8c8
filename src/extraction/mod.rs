//! PDF heading extraction: span collection, body-size estimation, and segmentation.

pub mod collector;
pub mod estimator;
pub mod pdf;
mod pipeline;
pub mod segmenter;
pub mod types;

pub use collector::{collect_document_runs, collect_page_runs};
pub use estimator::{BodySizeEstimate, estimate_body_size};
pub use pdf::{LayoutReader, PdfLayoutReader};
pub use pipeline::{
    ExtractionReport, SkippedDocument, extract_directory, extract_document, extract_documents,
    list_source_documents,
};
pub use segmenter::{Segmenter, segment_runs};
pub use types::{
    DEFAULT_HEADING_MARGIN, DEFAULT_SAMPLE_PAGES, ExtractionError, ExtractionSettings,
    PREAMBLE_TITLE, PageLayout, PreamblePolicy, RawLine, RawSpan, TextRun,
};
