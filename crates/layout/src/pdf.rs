//! PDF rendering of intake documents via `printpdf`.
//!
//! Pages are US Letter with 0.75" margins. Text uses the built-in Helvetica family, so
//! glyph widths are estimated rather than measured; wrapping is conservative enough that
//! lines stay inside the margins for the Latin text this workspace generates.

use crate::{LayoutEngine, LayoutError, LayoutResult, OutputFormat};
use intake_types::{Block, Document, Inline, ParagraphStyle, Section, Table};
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};
use std::io::BufWriter;

const PAGE_WIDTH_MM: f32 = 215.9;
const PAGE_HEIGHT_MM: f32 = 279.4;
const MARGIN_MM: f32 = 19.05;
const MM_PER_INCH: f32 = 25.4;
const MM_PER_PT: f32 = 0.3528;

const TITLE_SIZE: f32 = 16.0;
const LETTERHEAD_SIZE: f32 = 18.0;
const HEADING_SIZE: f32 = 12.0;
const SUBHEADING_SIZE: f32 = 10.5;
const BODY_SIZE: f32 = 9.5;
const SMALL_SIZE: f32 = 8.0;
const TABLE_SIZE: f32 = 8.5;
const CELL_PADDING_MM: f32 = 1.5;

/// Renders documents as paginated PDF.
#[derive(Debug, Clone, Default)]
pub struct PdfLayout;

impl PdfLayout {
    pub fn new() -> Self {
        Self
    }
}

impl LayoutEngine for PdfLayout {
    fn format(&self) -> OutputFormat {
        OutputFormat::Pdf
    }

    fn render(&self, document: &Document) -> LayoutResult<Vec<u8>> {
        let (doc, page, layer) = PdfDocument::new(
            &document.title,
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "Layer 1",
        );
        let layer = doc.get_page(page).get_layer(layer);
        let fonts = Fonts {
            regular: add_font(&doc, BuiltinFont::Helvetica)?,
            bold: add_font(&doc, BuiltinFont::HelveticaBold)?,
            italic: add_font(&doc, BuiltinFont::HelveticaOblique)?,
        };

        let mut cursor = Cursor {
            doc: &doc,
            layer,
            fonts,
            y: PAGE_HEIGHT_MM - MARGIN_MM,
            pages: 1,
        };

        for (i, line) in document.letterhead.iter().enumerate() {
            if i == 0 {
                cursor.text_line(line, LETTERHEAD_SIZE, Weight::Bold, MARGIN_MM);
            } else {
                cursor.text_line(line, SMALL_SIZE, Weight::Regular, MARGIN_MM);
            }
        }
        cursor.gap(6.0);
        cursor.centered_line(&document.title, TITLE_SIZE, Weight::Bold);
        cursor.gap(4.0);

        for section in &document.sections {
            cursor.section(section);
        }

        tracing::debug!(pages = cursor.pages, "laid out PDF document");

        let mut buf = BufWriter::new(Vec::new());
        doc.save(&mut buf)
            .map_err(|e| LayoutError::PdfSave(e.to_string()))?;
        buf.into_inner()
            .map_err(|e| LayoutError::PdfSave(e.to_string()))
    }
}

fn add_font(doc: &PdfDocumentReference, font: BuiltinFont) -> LayoutResult<IndirectFontRef> {
    doc.add_builtin_font(font)
        .map_err(|e| LayoutError::PdfFont(e.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Weight {
    Regular,
    Bold,
    Italic,
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn get(&self, weight: Weight) -> &IndirectFontRef {
        match weight {
            Weight::Regular => &self.regular,
            Weight::Bold => &self.bold,
            Weight::Italic => &self.italic,
        }
    }
}

/// Write position on the current page.
struct Cursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    fonts: Fonts,
    y: f32,
    pages: usize,
}

impl Cursor<'_> {
    fn content_width() -> f32 {
        PAGE_WIDTH_MM - 2.0 * MARGIN_MM
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT_MM - MARGIN_MM;
        self.pages += 1;
    }

    /// Starts a new page if fewer than `height` millimetres remain.
    fn reserve(&mut self, height: f32) {
        if self.y - height < MARGIN_MM {
            self.new_page();
        }
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }

    fn draw(&self, text: &str, size: f32, weight: Weight, x: f32) {
        self.layer
            .use_text(pdf_safe(text), size, Mm(x), Mm(self.y), self.fonts.get(weight));
    }

    fn text_line(&mut self, text: &str, size: f32, weight: Weight, x: f32) {
        let height = line_height(size);
        self.reserve(height);
        self.y -= height;
        self.draw(text, size, weight, x);
    }

    fn centered_line(&mut self, text: &str, size: f32, weight: Weight) {
        let width = text_width(text, size, weight);
        let x = MARGIN_MM + ((Self::content_width() - width) / 2.0).max(0.0);
        self.text_line(text, size, weight, x);
    }

    fn section(&mut self, section: &Section) {
        if let Some(heading) = &section.heading {
            self.reserve(line_height(HEADING_SIZE) * 3.0);
            self.gap(3.0);
            self.text_line(heading, HEADING_SIZE, Weight::Bold, MARGIN_MM);
            self.gap(1.5);
        }
        for block in &section.blocks {
            self.block(block);
        }
        self.gap(2.0);
    }

    fn block(&mut self, block: &Block) {
        match block {
            Block::Subheading { text } => {
                self.gap(1.5);
                self.text_line(text, SUBHEADING_SIZE, Weight::Bold, MARGIN_MM);
            }
            Block::Paragraph { style, runs } => {
                let size = match style {
                    ParagraphStyle::Small | ParagraphStyle::Centered => SMALL_SIZE,
                    ParagraphStyle::Normal | ParagraphStyle::Alert => BODY_SIZE,
                };
                let indent = if *style == ParagraphStyle::Alert { 4.0 } else { 0.0 };
                let centered = *style == ParagraphStyle::Centered;
                self.runs(runs, size, MARGIN_MM + indent, Self::content_width() - indent, centered);
                self.gap(1.5);
            }
            Block::Bullets { items } => {
                for item in items {
                    let mut runs = Vec::with_capacity(item.len() + 1);
                    runs.push(Inline::text("- "));
                    runs.extend(item.iter().cloned());
                    self.runs(&runs, BODY_SIZE, MARGIN_MM + 3.0, Self::content_width() - 3.0, false);
                }
                self.gap(1.5);
            }
            Block::Table(table) => {
                self.table(table);
                self.gap(2.0);
            }
            Block::Rule => {
                self.gap(4.0);
                self.text_line(&"_".repeat(50), BODY_SIZE, Weight::Regular, MARGIN_MM);
            }
            Block::PageBreak => self.new_page(),
        }
    }

    fn runs(&mut self, runs: &[Inline], size: f32, x: f32, width: f32, centered: bool) {
        for line in wrap_runs(runs, size, width) {
            let height = line_height(size);
            self.reserve(height);
            self.y -= height;

            let line_width: f32 = line.iter().map(|(t, w)| text_width(t, size, *w)).sum();
            let mut cursor_x = if centered {
                x + ((width - line_width) / 2.0).max(0.0)
            } else {
                x
            };
            for (text, weight) in &line {
                self.draw(text, size, *weight, cursor_x);
                cursor_x += text_width(text, size, *weight);
            }
        }
    }

    fn table(&mut self, table: &Table) {
        let widths: Vec<f32> = table.column_widths.iter().map(|w| w * MM_PER_INCH).collect();

        if let Some(header) = &table.header {
            let weights = vec![Weight::Bold; header.len()];
            self.table_row(header, &widths, &weights);
        }
        for row in &table.rows {
            let weights: Vec<Weight> = (0..row.len())
                .map(|i| {
                    if table.label_columns.contains(&i) {
                        Weight::Bold
                    } else {
                        Weight::Regular
                    }
                })
                .collect();
            self.table_row(row, &widths, &weights);
        }
    }

    fn table_row(&mut self, cells: &[String], widths: &[f32], weights: &[Weight]) {
        let wrapped: Vec<Vec<String>> = cells
            .iter()
            .zip(widths.iter().zip(weights.iter()))
            .map(|(cell, (width, weight))| {
                wrap_plain(cell, TABLE_SIZE, *weight, width - 2.0 * CELL_PADDING_MM)
            })
            .collect();
        let lines = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1);
        let height = lines as f32 * line_height(TABLE_SIZE) + CELL_PADDING_MM;

        self.reserve(height);
        let top = self.y;
        let mut x = MARGIN_MM;
        for ((cell_lines, width), weight) in wrapped.iter().zip(widths.iter()).zip(weights.iter()) {
            self.y = top;
            for line in cell_lines {
                self.y -= line_height(TABLE_SIZE);
                self.draw(line, TABLE_SIZE, *weight, x + CELL_PADDING_MM);
            }
            x += width;
        }
        self.y = top - height;
    }
}

fn line_height(size: f32) -> f32 {
    size * MM_PER_PT * 1.35
}

/// Approximate rendered width of `text` in millimetres.
fn text_width(text: &str, size: f32, weight: Weight) -> f32 {
    let em = match weight {
        Weight::Bold => 0.56,
        Weight::Regular | Weight::Italic => 0.52,
    };
    text.chars().count() as f32 * size * em * MM_PER_PT
}

/// Splits inline runs into lines that fit `width`, keeping per-word font weights.
fn wrap_runs(runs: &[Inline], size: f32, width: f32) -> Vec<Vec<(String, Weight)>> {
    let mut lines: Vec<Vec<(String, Weight)>> = Vec::new();
    let mut current: Vec<(String, Weight)> = Vec::new();
    let mut current_width = 0.0;

    for run in runs {
        let (text, weight) = match run {
            Inline::Text(s) => (s, Weight::Regular),
            Inline::Bold(s) => (s, Weight::Bold),
            Inline::Italic(s) => (s, Weight::Italic),
            Inline::LineBreak => {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
                continue;
            }
        };

        for (i, word) in text.split(' ').enumerate() {
            if i > 0 && !current.is_empty() {
                push_token(&mut current, " ", weight);
                current_width += text_width(" ", size, weight);
            }
            if word.is_empty() {
                continue;
            }
            let word_width = text_width(word, size, weight);
            if current_width + word_width > width && !current.is_empty() {
                while current.last().is_some_and(|(t, _)| t.trim().is_empty()) {
                    current.pop();
                }
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }
            push_token(&mut current, word, weight);
            current_width += word_width;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Appends text, merging with the previous segment when the weight matches.
fn push_token(line: &mut Vec<(String, Weight)>, text: &str, weight: Weight) {
    match line.last_mut() {
        Some((last, last_weight)) if *last_weight == weight => last.push_str(text),
        _ => line.push((text.to_owned(), weight)),
    }
}

fn wrap_plain(text: &str, size: f32, weight: Weight, width: f32) -> Vec<String> {
    let runs = match weight {
        Weight::Bold => vec![Inline::bold(text)],
        Weight::Italic => vec![Inline::italic(text)],
        Weight::Regular => vec![Inline::text(text)],
    };
    wrap_runs(&runs, size, width)
        .into_iter()
        .map(|segments| segments.into_iter().map(|(t, _)| t).collect())
        .collect()
}

/// Maps characters outside the built-in fonts' encoding to ASCII stand-ins.
fn pdf_safe(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '→' => out.push_str("->"),
            '•' => out.push('-'),
            '⚠' => out.push_str("(!)"),
            'µ' => out.push('u'),
            '°' => out.push_str(" deg"),
            '’' | '‘' => out.push('\''),
            '“' | '”' => out.push('"'),
            c if c.is_ascii() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_document() -> Document {
        let mut section = Section::new("notes", Some("NOTES"));
        for i in 0..120 {
            section.push(Block::paragraph(vec![
                Inline::bold(format!("Line {i}:")),
                Inline::text(" Alert, oriented x4, in no acute distress"),
            ]));
        }
        section.push(Block::Table(
            Table::new(&[1.5, 2.0, 1.5, 2.0])
                .labels(&[0, 2])
                .row(["Patient Name:", "Doe, Jane", "Date of Birth:", "01/02/1950 (76 years)"]),
        ));
        Document {
            title: "PATIENT ADMISSION ASSESSMENT".into(),
            letterhead: vec!["DOE MEDICAL CENTER".into()],
            sections: vec![section],
        }
    }

    #[test]
    fn test_render_produces_pdf_bytes() {
        let bytes = PdfLayout::new().render(&long_document()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_wrap_runs_respects_width_and_breaks() {
        let runs = vec![
            Inline::bold("Plan:"),
            Inline::LineBreak,
            Inline::text("one two three four five six seven eight nine ten"),
        ];
        let lines = wrap_runs(&runs, BODY_SIZE, 30.0);

        assert_eq!(lines[0], vec![("Plan:".to_owned(), Weight::Bold)]);
        assert!(lines.len() > 2);
        for line in &lines[1..] {
            let width: f32 = line.iter().map(|(t, w)| text_width(t, BODY_SIZE, *w)).sum();
            assert!(width <= 30.0 || line.len() == 1);
        }
    }

    #[test]
    fn test_wrap_runs_merges_same_weight() {
        let lines = wrap_runs(
            &[Inline::bold("General:"), Inline::text(" Alert and oriented")],
            BODY_SIZE,
            500.0,
        );
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 2);
        assert_eq!(lines[0][1].0, " Alert and oriented");
    }

    #[test]
    fn test_pdf_safe_replaces_symbols() {
        assert_eq!(pdf_safe("WBC: 7.1 K/µL → high"), "WBC: 7.1 K/uL -> high");
        assert_eq!(pdf_safe("Temp (°F)"), "Temp ( degF)");
    }
}
