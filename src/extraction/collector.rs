//! Turns page layouts into ordered text runs.

use super::types::{PageLayout, RawLine, TextRun};

/// Produce the text runs of one page in reading order.
///
/// Each line becomes one run: its spans are concatenated and trimmed, and its size is the
/// largest span size on the line. Lines with no visible text are dropped, so an empty page
/// yields an empty vector.
pub fn collect_page_runs(page: &PageLayout) -> Vec<TextRun> {
    page.lines
        .iter()
        .filter_map(line_text_and_size)
        .enumerate()
        .map(|(order, (text, size))| TextRun {
            text,
            size,
            page: page.number,
            order,
        })
        .collect()
}

/// Collect runs for every page, preserving page order.
pub fn collect_document_runs(pages: &[PageLayout]) -> Vec<Vec<TextRun>> {
    pages.iter().map(collect_page_runs).collect()
}

fn line_text_and_size(line: &RawLine) -> Option<(String, f32)> {
    let joined: String = line.spans.iter().map(|span| span.text.as_str()).collect();
    let text = joined.trim();
    if text.is_empty() {
        return None;
    }
    let size = line
        .spans
        .iter()
        .map(|span| span.size)
        .fold(0.0_f32, f32::max);
    Some((text.to_string(), size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::types::RawSpan;

    fn span(text: &str, size: f32) -> RawSpan {
        RawSpan {
            text: text.into(),
            size,
        }
    }

    #[test]
    fn joins_spans_and_keeps_largest_size() {
        let page = PageLayout {
            number: 3,
            lines: vec![RawLine {
                spans: vec![span("  1.2 ", 12.0), span("Overview  ", 18.0)],
            }],
        };

        let runs = collect_page_runs(&page);
        assert_eq!(
            runs,
            vec![TextRun {
                text: "1.2 Overview".into(),
                size: 18.0,
                page: 3,
                order: 0,
            }]
        );
    }

    #[test]
    fn drops_blank_lines_and_renumbers_order() {
        let page = PageLayout {
            number: 1,
            lines: vec![
                RawLine {
                    spans: vec![span("first", 10.0)],
                },
                RawLine {
                    spans: vec![span("   ", 30.0), span("\t", 30.0)],
                },
                RawLine { spans: Vec::new() },
                RawLine {
                    spans: vec![span("second", 10.0)],
                },
            ],
        };

        let runs = collect_page_runs(&page);
        let summary: Vec<_> = runs
            .iter()
            .map(|run| (run.text.as_str(), run.order))
            .collect();
        assert_eq!(summary, vec![("first", 0), ("second", 1)]);
    }

    #[test]
    fn empty_page_is_not_an_error() {
        let page = PageLayout {
            number: 7,
            lines: Vec::new(),
        };
        assert!(collect_page_runs(&page).is_empty());
    }
}
