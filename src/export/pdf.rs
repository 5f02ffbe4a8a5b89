//! PDF report built directly with `lopdf`.
//!
//! Text is laid out top-down with the standard Helvetica fonts. Each query
//! section starts on a new page and long sections overflow onto more pages.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::path::Path;

use super::{ExportError, ResultWriter};
use crate::models::{Record, RunResult};

const REGULAR: &str = "F1";
const BOLD: &str = "F2";

/// Page geometry and font sizes, in PDF points
#[derive(Debug, Clone, Copy)]
pub struct PdfWriter {
    pub page_width: i64,
    pub page_height: i64,
    pub margin: i64,
    pub heading_size: i64,
    pub title_size: i64,
    pub body_size: i64,
}

impl Default for PdfWriter {
    /// A4 portrait
    fn default() -> Self {
        Self {
            page_width: 595,
            page_height: 842,
            margin: 50,
            heading_size: 14,
            title_size: 12,
            body_size: 10,
        }
    }
}

impl ResultWriter for PdfWriter {
    fn write(&self, result: &RunResult, path: &Path) -> Result<(), ExportError> {
        let pages = self.layout(result);
        let mut doc = self.build_document(pages)?;
        doc.compress();
        doc.save(path)?;
        Ok(())
    }
}

impl PdfWriter {
    fn layout(&self, result: &RunResult) -> Vec<Vec<Line>> {
        let mut layout = Layout::new(*self);

        for (index, (query, records)) in result.sections().enumerate() {
            if index > 0 {
                layout.new_page();
            }
            layout.paragraph(BOLD, self.heading_size, &format!("Query: {}", query));
            layout.gap(self.body_size);

            if records.is_empty() {
                layout.paragraph(REGULAR, self.body_size, "No results.");
            }
            for record in records {
                self.record(&mut layout, record);
            }
        }

        layout.finish()
    }

    fn record(&self, layout: &mut Layout, record: &Record) {
        layout.paragraph(BOLD, self.title_size, &format!("Title: {}", record.title));
        layout.paragraph(REGULAR, self.body_size, &format!("Authors: {}", record.authors));
        layout.paragraph(REGULAR, self.body_size, &format!("Abstract: {}", record.r#abstract));
        layout.paragraph(REGULAR, self.body_size, &format!("Link: {}", record.link_or_empty()));
        layout.paragraph(
            REGULAR,
            self.body_size,
            &format!("Citations: {}", record.citation_count),
        );
        layout.gap(self.body_size);
    }

    fn build_document(&self, pages: Vec<Vec<Line>>) -> Result<Document, ExportError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular = doc.add_object(font("Helvetica"));
        let bold = doc.add_object(font("Helvetica-Bold"));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                REGULAR => regular,
                BOLD => bold,
            },
        });

        let mut kids = Vec::with_capacity(pages.len());
        for lines in pages {
            let page_id = self.add_page(&mut doc, pages_id, &lines)?;
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        let media_box: Vec<Object> = vec![
            0.into(),
            0.into(),
            self.page_width.into(),
            self.page_height.into(),
        ];
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => media_box,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        Ok(doc)
    }

    fn add_page(
        &self,
        doc: &mut Document,
        pages_id: ObjectId,
        lines: &[Line],
    ) -> Result<ObjectId, ExportError> {
        let mut operations = Vec::with_capacity(lines.len() * 5);
        for line in lines {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec![line.font.into(), line.size.into()]));
            operations.push(Operation::new("Td", vec![self.margin.into(), line.y.into()]));
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(line.text.clone())],
            ));
            operations.push(Operation::new("ET", vec![]));
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        Ok(doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        }))
    }
}

fn font(base: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

/// One positioned line of text
#[derive(Debug, Clone, PartialEq)]
struct Line {
    font: &'static str,
    size: i64,
    y: i64,
    text: Vec<u8>,
}

/// Top-down text cursor over a growing list of pages
struct Layout {
    geometry: PdfWriter,
    pages: Vec<Vec<Line>>,
    cursor: i64,
}

impl Layout {
    fn new(geometry: PdfWriter) -> Self {
        Self {
            geometry,
            pages: vec![Vec::new()],
            cursor: geometry.page_height - geometry.margin,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.cursor = self.geometry.page_height - self.geometry.margin;
    }

    fn gap(&mut self, amount: i64) {
        self.cursor -= amount;
    }

    /// Wrap `text` to the usable width and emit one line per row
    fn paragraph(&mut self, font: &'static str, size: i64, text: &str) {
        let leading = size + size / 3;
        for row in wrap(text, self.max_chars(size)) {
            if self.cursor - leading < self.geometry.margin {
                self.new_page();
            }
            self.cursor -= leading;
            let line = Line {
                font,
                size,
                y: self.cursor,
                text: win_ansi(&row),
            };
            if let Some(page) = self.pages.last_mut() {
                page.push(line);
            }
        }
    }

    /// Characters per row, assuming an average glyph width of 0.55 em
    fn max_chars(&self, size: i64) -> usize {
        let usable = self.geometry.page_width - 2 * self.geometry.margin;
        ((usable * 20) / (size * 11)).max(1) as usize
    }

    fn finish(self) -> Vec<Vec<Line>> {
        self.pages
    }
}

/// Greedy word wrap; words longer than `width` are split
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut rows = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for chunk in chars.chunks(width) {
            let chunk_len = chunk.len();
            let needed = if current_len == 0 { chunk_len } else { current_len + 1 + chunk_len };
            if needed > width && current_len > 0 {
                rows.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(chunk);
            current_len += chunk_len;
        }
    }

    if current_len > 0 || rows.is_empty() {
        rows.push(current);
    }
    rows
}

/// Encode for the WinAnsi standard fonts; unsupported characters become `?`
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7e | 0xa0..=0xff => c as u32 as u8,
            _ if c.is_whitespace() => b' ',
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::sample_result;
    use crate::models::RecordBuilder;
    use tempfile::tempdir;

    fn page_count(path: &Path) -> usize {
        Document::load(path).unwrap().get_pages().len()
    }

    #[test]
    fn test_one_page_per_short_section() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("articles.pdf");

        PdfWriter::default().write(&sample_result(), &path).unwrap();

        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF-1.5"));
        assert_eq!(page_count(&path), 3);
    }

    #[test]
    fn test_long_section_overflows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("long.pdf");
        let records = (0..60)
            .map(|i| {
                RecordBuilder::new(format!("Paper {}", i))
                    .authors("A Author, B Author")
                    .abstract_text("word ".repeat(60))
                    .build()
            })
            .collect();
        let mut result = RunResult::new();
        result.push("long", records);

        PdfWriter::default().write(&result, &path).unwrap();

        assert!(page_count(&path) > 1);
    }

    #[test]
    fn test_empty_run_has_single_page() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.pdf");

        PdfWriter::default().write(&RunResult::new(), &path).unwrap();

        assert_eq!(page_count(&path), 1);
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("", 10), vec![""]);
        assert_eq!(wrap("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap("  spaced   out ", 20), vec!["spaced out"]);
    }

    #[test]
    fn test_win_ansi() {
        assert_eq!(win_ansi("Café (α)"), b"Caf\xe9 (?)".to_vec());
        assert_eq!(win_ansi("a\tb"), b"a b".to_vec());
    }

    #[test]
    fn test_sections_start_on_new_pages() {
        let writer = PdfWriter::default();
        let pages = writer.layout(&sample_result());

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[1][0].text, b"Query: nothing".to_vec());
        assert_eq!(pages[1][1].text, b"No results.".to_vec());
        assert!(pages.iter().flatten().all(|l| l.y >= writer.margin));
    }
}
