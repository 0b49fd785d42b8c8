//! Font-size driven heading segmentation.
//!
//! Runs are consumed in document order. A run at or above the heading threshold opens a new
//! top-level section; every other run is appended to the open section's buffer. A section's
//! buffer is joined with single spaces exactly once, when the next heading arrives or the
//! document ends, so the emitted records only ever carry finished content strings.

use crate::store::{HeadingRecord, Sections, unique_key};

use super::types::{PREAMBLE_TITLE, PreamblePolicy, TextRun};

#[derive(Debug, Clone, PartialEq, Eq)]
enum SegmenterState {
    NoHeadingYet,
    InSection(String),
}

/// Incremental builder of one document's heading map.
#[derive(Debug)]
pub struct Segmenter {
    source: String,
    heading_threshold: f32,
    preamble: PreamblePolicy,
    sections: Sections,
    state: SegmenterState,
    buffer: Vec<String>,
    discarded_preamble: usize,
}

impl Segmenter {
    /// Start segmenting a document named `source`.
    pub fn new(source: impl Into<String>, heading_threshold: f32, preamble: PreamblePolicy) -> Self {
        Self {
            source: source.into(),
            heading_threshold,
            preamble,
            sections: Sections::new(),
            state: SegmenterState::NoHeadingYet,
            buffer: Vec::new(),
            discarded_preamble: 0,
        }
    }

    /// Feed the next run in reading order.
    pub fn push(&mut self, run: &TextRun) {
        if run.size >= self.heading_threshold {
            self.open_section(&run.text);
            tracing::trace!(title = %run.text, size = run.size, page = run.page, "Heading detected");
            return;
        }

        if self.state == SegmenterState::NoHeadingYet {
            match self.preamble {
                PreamblePolicy::Discard => {
                    self.discarded_preamble += 1;
                    return;
                }
                PreamblePolicy::Synthesize => self.open_section(PREAMBLE_TITLE),
            }
        }

        self.buffer.push(run.text.clone());
    }

    /// Close the last section and return the document's headings in discovery order.
    pub fn finish(mut self) -> Sections {
        self.close_section();
        if self.discarded_preamble > 0 {
            tracing::debug!(
                source = %self.source,
                runs = self.discarded_preamble,
                "Discarded text preceding the first heading"
            );
        }
        self.sections
    }

    fn open_section(&mut self, title: &str) {
        self.close_section();
        let key = unique_key(title, |candidate| self.sections.contains_key(candidate));
        self.sections
            .insert(key.clone(), HeadingRecord::new(title, self.source.clone()));
        self.state = SegmenterState::InSection(key);
    }

    fn close_section(&mut self) {
        let SegmenterState::InSection(key) = &self.state else {
            return;
        };
        let content = std::mem::take(&mut self.buffer).join(" ");
        if let Some(record) = self.sections.get_mut(key) {
            record.content = content;
        }
    }
}

/// Segment a complete run sequence into a top-level heading map.
pub fn segment_runs<'a, I>(
    runs: I,
    source: &str,
    heading_threshold: f32,
    preamble: PreamblePolicy,
) -> Sections
where
    I: IntoIterator<Item = &'a TextRun>,
{
    let mut segmenter = Segmenter::new(source, heading_threshold, preamble);
    for run in runs {
        segmenter.push(run);
    }
    segmenter.finish()
}
