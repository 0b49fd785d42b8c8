//! Page layout, text run, and error types shared by the extraction stages.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Leading pages sampled by the body-size estimator.
pub const DEFAULT_SAMPLE_PAGES: usize = 50;
/// Points added to the body font size to classify a line as a heading.
pub const DEFAULT_HEADING_MARGIN: f32 = 5.0;
/// Title given to the synthetic heading that collects preamble text.
pub const PREAMBLE_TITLE: &str = "Untitled preamble";

/// Errors that cause a single source document to be skipped.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The document could not be opened or parsed.
    #[error("Failed to read {path}: {reason}")]
    Unreadable {
        /// Document that failed to load.
        path: PathBuf,
        /// Parser diagnostic.
        reason: String,
    },
    /// The sampled pages contained no text at all.
    #[error("No text found in {path}")]
    NoText {
        /// Document without extractable runs.
        path: PathBuf,
    },
    /// The input directory could not be listed.
    #[error("Failed to list input directory {path}: {source}")]
    InputDirectory {
        /// Directory that was scanned.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: walkdir::Error,
    },
}

/// One span of text rendered in a single font size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSpan {
    /// Span text exactly as reported by the layout source.
    pub text: String,
    /// Effective font size in points.
    pub size: f32,
}

/// A visual line made of one or more spans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLine {
    /// Spans in reading order.
    pub spans: Vec<RawSpan>,
}

/// Layout of a single page as supplied by a [`super::LayoutReader`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    /// 1-based page number.
    pub number: u32,
    /// Lines in reading order.
    pub lines: Vec<RawLine>,
}

/// A non-empty line of text with its dominant font size.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Trimmed line text.
    pub text: String,
    /// Largest span size within the line.
    pub size: f32,
    /// 1-based page number.
    pub page: u32,
    /// 0-based position among the page's runs.
    pub order: usize,
}

/// Handling of body text that precedes the first heading in a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreamblePolicy {
    /// Drop the text.
    #[default]
    Discard,
    /// Collect it under a synthetic [`PREAMBLE_TITLE`] heading.
    Synthesize,
}

impl std::str::FromStr for PreamblePolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "discard" => Ok(Self::Discard),
            "synthesize" => Ok(Self::Synthesize),
            _ => Err(()),
        }
    }
}

/// Tunable parameters of the heading classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionSettings {
    /// Number of leading pages fed to the body-size estimator.
    pub sample_pages: usize,
    /// Points added to the body size to form the heading threshold.
    pub heading_margin: f32,
    /// Treatment of text before the first heading.
    pub preamble: PreamblePolicy,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            sample_pages: DEFAULT_SAMPLE_PAGES,
            heading_margin: DEFAULT_HEADING_MARGIN,
            preamble: PreamblePolicy::Discard,
        }
    }
}
