//! Body font size estimation.
//!
//! A document gets one global heading threshold: the most frequent font size (rounded to one
//! decimal) among the visible spans of a leading page sample, plus a fixed margin. Sizes are
//! counted per span rather than per line, so an emphasized word inside a paragraph does not
//! lift the whole line's vote. Documents with a subtle typographic hierarchy will
//! under-segment with the default 5pt margin; the margin is configurable through
//! `SME_HEADING_MARGIN`.

use std::collections::HashMap;

use super::types::PageLayout;

/// Result of sampling a document's font sizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySizeEstimate {
    /// Most frequent rounded font size in the sample.
    pub body_font_size: f32,
    /// Minimum run size classified as a heading.
    pub heading_threshold: f32,
    /// Number of spans that contributed to the estimate.
    pub sampled_spans: usize,
}

/// Estimate the body font size from the spans of the first `sample_pages` pages.
///
/// Spans whose text is blank are ignored. Returns `None` when the sample holds no visible
/// span, signalling that the document has no text and must be skipped. Ties between equally
/// frequent sizes resolve to the size seen first.
pub fn estimate_body_size(
    pages: &[PageLayout],
    sample_pages: usize,
    heading_margin: f32,
) -> Option<BodySizeEstimate> {
    // Keyed by tenths of a point so that equal rounded sizes hash identically.
    let mut counts: HashMap<i64, (usize, usize)> = HashMap::new();
    let mut sampled_spans = 0;

    let spans = pages
        .iter()
        .take(sample_pages)
        .flat_map(|page| &page.lines)
        .flat_map(|line| &line.spans)
        .filter(|span| !span.text.trim().is_empty());

    for span in spans {
        let key = round_to_tenths(span.size);
        let first_seen = counts.len();
        let entry = counts.entry(key).or_insert((0, first_seen));
        entry.0 += 1;
        sampled_spans += 1;
    }

    let (body_key, _) = counts
        .into_iter()
        .max_by(|(_, (count_a, seen_a)), (_, (count_b, seen_b))| {
            count_a.cmp(count_b).then(seen_b.cmp(seen_a))
        })?;

    let body_font_size = body_key as f32 / 10.0;
    Some(BodySizeEstimate {
        body_font_size,
        heading_threshold: body_font_size + heading_margin,
        sampled_spans,
    })
}

/// Halves round to even, so `10.25` becomes `10.2`.
fn round_to_tenths(size: f32) -> i64 {
    (f64::from(size) * 10.0).round_ties_even() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::collector::collect_document_runs;
    use crate::extraction::types::{RawLine, RawSpan};

    fn line(spans: &[(&str, f32)]) -> RawLine {
        RawLine {
            spans: spans
                .iter()
                .map(|(text, size)| RawSpan {
                    text: text.to_string(),
                    size: *size,
                })
                .collect(),
        }
    }

    fn page(number: u32, sizes: &[f32]) -> PageLayout {
        PageLayout {
            number,
            lines: sizes.iter().map(|size| line(&[("x", *size)])).collect(),
        }
    }

    #[test]
    fn picks_most_frequent_rounded_size() {
        let pages = vec![
            page(1, &[18.0, 11.96, 12.04]),
            page(2, &[10.0, 12.0, 10.0]),
        ];

        let estimate = estimate_body_size(&pages, 50, 5.0).expect("estimate");
        assert_eq!(estimate.body_font_size, 12.0);
        assert_eq!(estimate.heading_threshold, 17.0);
        assert_eq!(estimate.sampled_spans, 6);
    }

    #[test]
    fn counts_spans_not_line_maxima() {
        let pages = vec![PageLayout {
            number: 1,
            lines: vec![
                line(&[("Press ", 10.0), ("RESET", 12.0), (" and wait.", 10.0)]),
                line(&[("Hold ", 10.0), ("POWER", 12.0), (" briefly.", 10.0)]),
                line(&[("   ", 30.0), ("Done.", 10.0)]),
            ],
        }];

        let estimate = estimate_body_size(&pages, 50, 5.0).expect("estimate");
        assert_eq!(estimate.body_font_size, 10.0);
        assert_eq!(estimate.heading_threshold, 15.0);
        assert_eq!(estimate.sampled_spans, 7);

        // Line runs still carry the line maximum for heading classification.
        let runs = collect_document_runs(&pages);
        assert_eq!(runs[0][0].size, 12.0);
        assert_eq!(runs[0][2].size, 30.0);
    }

    #[test]
    fn blank_spans_do_not_vote() {
        let pages = vec![PageLayout {
            number: 1,
            lines: vec![
                line(&[(" ", 24.0), ("\t", 24.0), ("body", 11.0)]),
                line(&[("", 24.0)]),
            ],
        }];

        let estimate = estimate_body_size(&pages, 50, 5.0).expect("estimate");
        assert_eq!(estimate.body_font_size, 11.0);
        assert_eq!(estimate.sampled_spans, 1);
    }

    #[test]
    fn halves_round_to_even() {
        assert_eq!(round_to_tenths(10.25), 102);
        assert_eq!(round_to_tenths(10.75), 108);
        let estimate = estimate_body_size(&[page(1, &[10.25])], 50, 5.0).expect("estimate");
        assert_eq!(estimate.body_font_size, 10.2);
    }

    #[test]
    fn only_samples_leading_pages() {
        let pages = vec![page(1, &[9.0]), page(2, &[14.0, 14.0]), page(3, &[14.0])];

        let estimate = estimate_body_size(&pages, 1, 5.0).expect("estimate");
        assert_eq!(estimate.body_font_size, 9.0);
        assert_eq!(estimate.sampled_spans, 1);
    }

    #[test]
    fn ties_resolve_to_first_seen_size() {
        let pages = vec![page(1, &[11.0, 10.0, 10.0, 11.0])];
        let estimate = estimate_body_size(&pages, 50, 5.0).expect("estimate");
        assert_eq!(estimate.body_font_size, 11.0);
    }

    #[test]
    fn margin_is_added_verbatim() {
        let estimate = estimate_body_size(&[page(1, &[10.5])], 50, 2.0).expect("estimate");
        assert_eq!(estimate.heading_threshold, 12.5);
    }

    #[test]
    fn empty_sample_signals_no_text() {
        assert!(estimate_body_size(&[], 50, 5.0).is_none());
        assert!(estimate_body_size(&[page(1, &[]), page(2, &[])], 50, 5.0).is_none());
    }
}
