//! Per-document and per-directory extraction.
//!
//! Documents are independent until they reach the store, so their layouts are read and
//! segmented in parallel. Merging happens afterwards on the calling thread, one whole document
//! at a time, in file-name order so that collision suffixes are reproducible between runs.

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::store::{GlobalStore, Sections};

use super::collector::collect_document_runs;
use super::estimator::estimate_body_size;
use super::pdf::LayoutReader;
use super::segmenter::segment_runs;
use super::types::{ExtractionError, ExtractionSettings};

/// A document left out of the merged store.
#[derive(Debug)]
pub struct SkippedDocument {
    /// Path of the skipped document.
    pub path: PathBuf,
    /// Reason the document was skipped.
    pub error: ExtractionError,
}

/// Result of extracting and merging a directory of documents.
#[derive(Debug, Default)]
pub struct ExtractionReport {
    /// Merged headings of every successfully processed document.
    pub store: GlobalStore,
    /// Documents that were merged, in merge order.
    pub processed: Vec<PathBuf>,
    /// Documents that could not be read or held no text.
    pub skipped: Vec<SkippedDocument>,
}

/// Extract the top-level headings of one document.
pub fn extract_document(
    reader: &dyn LayoutReader,
    path: &Path,
    settings: &ExtractionSettings,
) -> Result<Sections, ExtractionError> {
    tracing::info!(path = %path.display(), "Processing document");
    let pages = reader.read_layout(path)?;
    let runs = collect_document_runs(&pages);

    let Some(estimate) = estimate_body_size(&pages, settings.sample_pages, settings.heading_margin)
    else {
        return Err(ExtractionError::NoText {
            path: path.to_path_buf(),
        });
    };
    tracing::info!(
        path = %path.display(),
        pages = pages.len(),
        sampled_spans = estimate.sampled_spans,
        body_font_size = estimate.body_font_size,
        heading_threshold = estimate.heading_threshold,
        "Detected body font size"
    );

    let source = document_name(path);
    let sections = segment_runs(
        runs.iter().flatten(),
        &source,
        estimate.heading_threshold,
        settings.preamble,
    );
    tracing::debug!(path = %path.display(), headings = sections.len(), "Document segmented");
    Ok(sections)
}

/// List the PDFs directly inside `dir`, sorted by file name.
pub fn list_source_documents(dir: &Path) -> Result<Vec<PathBuf>, ExtractionError> {
    let mut documents = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| ExtractionError::InputDirectory {
            path: dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && has_pdf_extension(entry.path()) {
            documents.push(entry.into_path());
        }
    }
    Ok(documents)
}

/// Extract every document and merge the results into a fresh store.
///
/// Unreadable or text-free documents are logged and reported, never fatal.
pub fn extract_documents(
    reader: &dyn LayoutReader,
    documents: &[PathBuf],
    settings: &ExtractionSettings,
) -> ExtractionReport {
    let extracted: Vec<_> = documents
        .par_iter()
        .map(|path| (path, extract_document(reader, path, settings)))
        .collect();

    let mut report = ExtractionReport::default();
    for (path, outcome) in extracted {
        match outcome {
            Ok(sections) => {
                let summary = report.store.merge(sections);
                tracing::debug!(
                    path = %path.display(),
                    inserted = summary.inserted,
                    renamed = summary.renamed.len(),
                    "Merged document"
                );
                report.processed.push(path.clone());
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), error = %error, "Skipping document");
                report.skipped.push(SkippedDocument {
                    path: path.clone(),
                    error,
                });
            }
        }
    }

    tracing::info!(
        processed = report.processed.len(),
        skipped = report.skipped.len(),
        headings = report.store.len(),
        "Extraction complete"
    );
    report
}

/// List and extract every PDF in `dir`.
pub fn extract_directory(
    reader: &dyn LayoutReader,
    dir: &Path,
    settings: &ExtractionSettings,
) -> Result<ExtractionReport, ExtractionError> {
    let documents = list_source_documents(dir)?;
    if documents.is_empty() {
        tracing::warn!(dir = %dir.display(), "No PDF files found");
    }
    Ok(extract_documents(reader, &documents, settings))
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("pdf"))
}

fn document_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
