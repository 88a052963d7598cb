//! Structured document descriptors.
//!
//! A [`Document`] is an ordered list of [`Section`]s, each holding typed [`Block`]s.
//! Nothing here carries markup or page geometry: a layout engine decides how headings,
//! inline emphasis and tables are drawn. Table column widths are expressed in inches so
//! that every engine shares the same proportions.

use serde::Serialize;

/// A complete document ready for layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Document title (for example "PATIENT ADMISSION ASSESSMENT")
    pub title: String,
    /// Letterhead lines shown above the title (institution name first)
    pub letterhead: Vec<String>,
    /// Sections in display order
    pub sections: Vec<Section>,
}

impl Document {
    /// Returns the section with the given key, if present.
    pub fn section(&self, key: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.key == key)
    }

    /// Returns the section keys in display order.
    pub fn section_keys(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.key.as_str()).collect()
    }

    /// Concatenates all text content, ignoring styling. Useful for searching output.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        for line in &self.letterhead {
            out.push_str(line);
            out.push('\n');
        }
        for section in &self.sections {
            section.append_plain_text(&mut out);
        }
        out
    }
}

/// One logical document section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    /// Stable machine key, e.g. `clinical_flags`
    pub key: String,
    /// Section heading; `None` for unheaded blocks such as the allergy alert or footer
    pub heading: Option<String>,
    pub blocks: Vec<Block>,
}

impl Section {
    pub fn new(key: impl Into<String>, heading: Option<&str>) -> Self {
        Self {
            key: key.into(),
            heading: heading.map(str::to_owned),
            blocks: Vec::new(),
        }
    }

    /// Appends a block and returns the section, for chained construction.
    pub fn with(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    fn append_plain_text(&self, out: &mut String) {
        if let Some(heading) = &self.heading {
            out.push_str(heading);
            out.push('\n');
        }
        for block in &self.blocks {
            block.append_plain_text(out);
        }
    }
}

/// Paragraph presentation hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphStyle {
    Normal,
    /// Secondary text such as the letterhead and footer
    Small,
    /// Highlighted call-out (allergies)
    Alert,
    /// Centred text
    Centered,
}

/// An inline run of text inside a paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Inline {
    Text(String),
    Bold(String),
    Italic(String),
    LineBreak,
}

impl Inline {
    pub fn text(s: impl Into<String>) -> Self {
        Inline::Text(s.into())
    }

    pub fn bold(s: impl Into<String>) -> Self {
        Inline::Bold(s.into())
    }

    pub fn italic(s: impl Into<String>) -> Self {
        Inline::Italic(s.into())
    }
}

/// A table with fixed column widths (inches).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub column_widths: Vec<f32>,
    /// Optional header row, drawn emphasised
    pub header: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
    /// Columns whose body cells act as labels (drawn bold), e.g. `[0, 2]` for key/value grids
    pub label_columns: Vec<usize>,
}

impl Table {
    pub fn new(column_widths: &[f32]) -> Self {
        Self {
            column_widths: column_widths.to_vec(),
            header: None,
            rows: Vec::new(),
            label_columns: Vec::new(),
        }
    }

    pub fn header<S: Into<String>>(mut self, cells: impl IntoIterator<Item = S>) -> Self {
        self.header = Some(cells.into_iter().map(Into::into).collect());
        self
    }

    pub fn labels(mut self, columns: &[usize]) -> Self {
        self.label_columns = columns.to_vec();
        self
    }

    pub fn row<S: Into<String>>(mut self, cells: impl IntoIterator<Item = S>) -> Self {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    pub fn column_count(&self) -> usize {
        self.column_widths.len()
    }
}

/// A block-level element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Subheading { text: String },
    Paragraph { style: ParagraphStyle, runs: Vec<Inline> },
    Bullets { items: Vec<Vec<Inline>> },
    Table(Table),
    /// A horizontal signature line
    Rule,
    PageBreak,
}

impl Block {
    pub fn subheading(text: impl Into<String>) -> Self {
        Block::Subheading { text: text.into() }
    }

    pub fn paragraph(runs: Vec<Inline>) -> Self {
        Block::Paragraph {
            style: ParagraphStyle::Normal,
            runs,
        }
    }

    pub fn styled(style: ParagraphStyle, runs: Vec<Inline>) -> Self {
        Block::Paragraph { style, runs }
    }

    /// A bullet list where each item is a bold label followed by plain text.
    pub fn labelled_bullets<L, V>(items: impl IntoIterator<Item = (L, V)>) -> Self
    where
        L: Into<String>,
        V: Into<String>,
    {
        Block::Bullets {
            items: items
                .into_iter()
                .map(|(label, value)| {
                    vec![
                        Inline::Bold(format!("{}:", label.into())),
                        Inline::Text(format!(" {}", value.into())),
                    ]
                })
                .collect(),
        }
    }

    fn append_plain_text(&self, out: &mut String) {
        match self {
            Block::Subheading { text } => {
                out.push_str(text);
                out.push('\n');
            }
            Block::Paragraph { runs, .. } => {
                append_runs(runs, out);
                out.push('\n');
            }
            Block::Bullets { items } => {
                for item in items {
                    out.push_str("- ");
                    append_runs(item, out);
                    out.push('\n');
                }
            }
            Block::Table(table) => {
                let rows = table.header.iter().chain(table.rows.iter());
                for row in rows {
                    out.push_str(&row.join(" | "));
                    out.push('\n');
                }
            }
            Block::Rule | Block::PageBreak => {}
        }
    }
}

fn append_runs(runs: &[Inline], out: &mut String) {
    for run in runs {
        match run {
            Inline::Text(s) | Inline::Bold(s) | Inline::Italic(s) => out.push_str(s),
            Inline::LineBreak => out.push('\n'),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_includes_tables_and_runs() {
        let doc = Document {
            title: "TITLE".into(),
            letterhead: vec!["ACME MEDICAL CENTER".into()],
            sections: vec![
                Section::new("vitals", Some("VITAL SIGNS"))
                    .with(Block::Table(Table::new(&[1.0, 1.0]).header(["BP", "HR"]).row(["140/80", "90"]))),
                Section::new("footer", None).with(Block::paragraph(vec![
                    Inline::bold("Document ID:"),
                    Inline::LineBreak,
                    Inline::text("ADM-1"),
                ])),
            ],
        };

        let text = doc.plain_text();
        assert!(text.contains("ACME MEDICAL CENTER"));
        assert!(text.contains("BP | HR"));
        assert!(text.contains("140/80 | 90"));
        assert!(text.contains("Document ID:\nADM-1"));
        assert_eq!(doc.section_keys(), vec!["vitals", "footer"]);
        assert!(doc.section("footer").unwrap().heading.is_none());
    }

    #[test]
    fn test_labelled_bullets_bold_label() {
        let block = Block::labelled_bullets([("Code Status", "DNR")]);
        match block {
            Block::Bullets { items } => {
                assert_eq!(items[0][0], Inline::Bold("Code Status:".into()));
                assert_eq!(items[0][1], Inline::Text(" DNR".into()));
            }
            other => panic!("unexpected block {other:?}"),
        }
    }
}
