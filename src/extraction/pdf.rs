//! PDF page layout reader backed by `lopdf`.
//!
//! Walks each page's content stream and rebuilds the page → line → span structure from text
//! operators. Only what the heading classifier needs is tracked: the font size set by `Tf`,
//! the vertical scale of the text matrix set by `Tm`, and the strings shown by `Tj`, `TJ`,
//! `'` and `"`. Text positioning operators end the current line.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object};
use std::path::Path;

use super::types::{ExtractionError, PageLayout, RawLine, RawSpan};

/// Kerning adjustment (thousandths of an em) in a `TJ` array that we read as a word gap.
const TJ_WORD_GAP: f32 = -200.0;
/// Font size assumed until the content stream sets one.
const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Source of page layouts for a document on disk.
pub trait LayoutReader: Send + Sync {
    /// Read every page of the document at `path`, in page order.
    fn read_layout(&self, path: &Path) -> Result<Vec<PageLayout>, ExtractionError>;
}

/// [`LayoutReader`] that parses PDF content streams.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfLayoutReader;

impl PdfLayoutReader {
    /// Construct a reader.
    pub const fn new() -> Self {
        Self
    }
}

impl LayoutReader for PdfLayoutReader {
    fn read_layout(&self, path: &Path) -> Result<Vec<PageLayout>, ExtractionError> {
        let document = Document::load(path).map_err(|error| ExtractionError::Unreadable {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })?;

        let pages = document.get_pages();
        tracing::debug!(path = %path.display(), pages = pages.len(), "Opened PDF");

        let layouts = pages
            .into_iter()
            .map(|(number, page_id)| {
                let operations = document
                    .get_page_content(page_id)
                    .and_then(|content| Content::decode(&content))
                    .map(|content| content.operations);
                match operations {
                    Ok(operations) => PageLayout {
                        number,
                        lines: lines_from_operations(&operations),
                    },
                    Err(error) => {
                        tracing::warn!(
                            path = %path.display(),
                            page = number,
                            error = %error,
                            "Failed to decode page content; treating page as empty"
                        );
                        PageLayout {
                            number,
                            lines: Vec::new(),
                        }
                    }
                }
            })
            .collect();

        Ok(layouts)
    }
}

/// Rebuild lines and spans from a decoded content stream.
pub(crate) fn lines_from_operations(operations: &[Operation]) -> Vec<RawLine> {
    let mut walker = LineWalker::default();
    for operation in operations {
        walker.apply(operation);
    }
    walker.finish()
}

struct LineWalker {
    lines: Vec<RawLine>,
    spans: Vec<RawSpan>,
    text: String,
    font_size: f32,
    matrix_scale: f32,
}

impl Default for LineWalker {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            spans: Vec::new(),
            text: String::new(),
            font_size: DEFAULT_FONT_SIZE,
            matrix_scale: 1.0,
        }
    }
}

impl LineWalker {
    fn apply(&mut self, operation: &Operation) {
        let operands = &operation.operands;
        match operation.operator.as_str() {
            "BT" => {
                self.end_line();
                self.matrix_scale = 1.0;
            }
            "ET" | "Td" | "TD" | "T*" => self.end_line(),
            "Tf" => {
                if let Some(size) = operands.get(1).and_then(|value| value.as_float().ok()) {
                    self.end_span();
                    self.font_size = size.abs();
                }
            }
            "Tm" => {
                self.end_line();
                let c = operands.get(2).and_then(|value| value.as_float().ok());
                let d = operands.get(3).and_then(|value| value.as_float().ok());
                if let (Some(c), Some(d)) = (c, d) {
                    let scale = c.hypot(d);
                    self.matrix_scale = if scale > 0.0 { scale } else { 1.0 };
                }
            }
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(bytes);
                }
            }
            "'" => {
                self.end_line();
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(bytes);
                }
            }
            "\"" => {
                self.end_line();
                if let Some(Object::String(bytes, _)) = operands.get(2) {
                    self.show(bytes);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    for item in items {
                        match item {
                            Object::String(bytes, _) => self.show(bytes),
                            other => {
                                if other.as_float().is_ok_and(|gap| gap <= TJ_WORD_GAP)
                                    && !self.text.ends_with(' ')
                                {
                                    self.text.push(' ');
                                }
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn show(&mut self, bytes: &[u8]) {
        self.text.push_str(&decode_pdf_string(bytes));
    }

    fn end_span(&mut self) {
        if self.text.is_empty() {
            return;
        }
        self.spans.push(RawSpan {
            text: std::mem::take(&mut self.text),
            size: self.font_size * self.matrix_scale,
        });
    }

    fn end_line(&mut self) {
        self.end_span();
        if !self.spans.is_empty() {
            self.lines.push(RawLine {
                spans: std::mem::take(&mut self.spans),
            });
        }
    }

    fn finish(mut self) -> Vec<RawLine> {
        self.end_line();
        self.lines
    }
}

/// Decode a PDF string operand.
///
/// UTF-16BE is used when the bytes carry a byte-order mark; otherwise UTF-8 is attempted and
/// Latin-1 is the fallback, which covers the common single-byte encodings well enough for
/// heading detection.
pub(crate) fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&byte| char::from(byte)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Stream, StringFormat, dictionary};

    fn literal(text: &str) -> Object {
        Object::String(text.as_bytes().to_vec(), StringFormat::Literal)
    }

    fn op(operator: &str, operands: Vec<Object>) -> Operation {
        Operation::new(operator, operands)
    }

    fn write_pdf(path: &Path, pages: Vec<Vec<Operation>>) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for operations in pages {
            let content = Content { operations };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().expect("encode")));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).expect("save pdf");
    }

    #[test]
    fn reads_lines_and_sizes_from_pdf() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("manual.pdf");
        write_pdf(
            &path,
            vec![
                vec![
                    op("BT", vec![]),
                    op("Tf", vec!["F1".into(), 18.into()]),
                    op("Td", vec![72.into(), 700.into()]),
                    op("Tj", vec![literal("Installation")]),
                    op("Tf", vec!["F1".into(), 12.into()]),
                    op("Td", vec![0.into(), (-20).into()]),
                    op("Tj", vec![literal("Unpack the device.")]),
                    op("ET", vec![]),
                ],
                vec![],
            ],
        );

        let pages = PdfLayoutReader::new().read_layout(&path).expect("layout");

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].number, 1);
        assert_eq!(
            pages[0].lines,
            vec![
                RawLine {
                    spans: vec![RawSpan {
                        text: "Installation".into(),
                        size: 18.0
                    }]
                },
                RawLine {
                    spans: vec![RawSpan {
                        text: "Unpack the device.".into(),
                        size: 12.0
                    }]
                },
            ]
        );
        assert_eq!(pages[1].number, 2);
        assert!(pages[1].lines.is_empty());
    }

    #[test]
    fn unreadable_file_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf at all").expect("write");

        let error = PdfLayoutReader::new().read_layout(&path).unwrap_err();
        assert!(matches!(error, ExtractionError::Unreadable { .. }));
    }

    #[test]
    fn text_matrix_scales_font_size() {
        let lines = lines_from_operations(&[
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 1.into()]),
            op(
                "Tm",
                vec![
                    20.into(),
                    0.into(),
                    0.into(),
                    20.into(),
                    72.into(),
                    700.into(),
                ],
            ),
            op("Tj", vec![literal("Scaled")]),
            op("ET", vec![]),
        ]);

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].spans[0].size, 20.0);
    }

    #[test]
    fn font_change_inside_line_starts_new_span() {
        let lines = lines_from_operations(&[
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 12.into()]),
            op("Tj", vec![literal("Step ")]),
            op("Tf", vec!["F1".into(), 24.into()]),
            op("Tj", vec![literal("4")]),
            op("ET", vec![]),
        ]);

        assert_eq!(lines.len(), 1);
        let sizes: Vec<_> = lines[0].spans.iter().map(|span| span.size).collect();
        assert_eq!(sizes, vec![12.0, 24.0]);
    }

    #[test]
    fn tj_arrays_insert_word_gaps() {
        let lines = lines_from_operations(&[
            op("BT", vec![]),
            op(
                "TJ",
                vec![Object::Array(vec![
                    literal("Quick"),
                    (-250).into(),
                    literal("Start"),
                    (-20).into(),
                    literal("!"),
                ])],
            ),
            op("ET", vec![]),
        ]);

        assert_eq!(lines[0].spans[0].text, "Quick Start!");
    }

    #[test]
    fn decodes_utf16_and_latin1_strings() {
        assert_eq!(decode_pdf_string(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0xE9]), "Hé");
        assert_eq!(decode_pdf_string(&[0x43, 0x61, 0x66, 0xE9]), "Café");
        assert_eq!(decode_pdf_string("Überblick".as_bytes()), "Überblick");
    }
}
