//! Markdown rendering of intake documents.
//!
//! Text from the document is treated as prose: characters that would change the meaning
//! of the surrounding Markdown are escaped before emphasis markers are added.
//!
//! Escaping rules:
//! - `#` at the start of a run → `\#` (prevents headers)
//! - Triple backticks → `\`\`\`` (prevents code blocks)
//! - `*` → `\*` (prevents stray emphasis)
//! - `|` inside table cells → `\|`

use crate::{LayoutEngine, LayoutResult, OutputFormat};
use intake_types::{Block, Document, Inline, ParagraphStyle, Section, Table};

/// Page break marker understood by most Markdown-to-print pipelines.
const PAGE_BREAK: &str = "<div style=\"page-break-after: always\"></div>";

/// Renders documents as GitHub-flavoured Markdown.
#[derive(Debug, Clone, Default)]
pub struct MarkdownLayout;

impl MarkdownLayout {
    pub fn new() -> Self {
        Self
    }

    /// Renders a document to a Markdown string.
    pub fn render_string(&self, document: &Document) -> String {
        let mut out = String::new();

        for (i, line) in document.letterhead.iter().enumerate() {
            if i == 0 {
                out.push_str(&format!("**{}**  \n", escape_text(line)));
            } else {
                out.push_str(&format!("{}  \n", escape_text(line)));
            }
        }
        if !document.letterhead.is_empty() {
            out.push('\n');
        }

        out.push_str(&format!("# {}\n\n", escape_text(&document.title)));

        for section in &document.sections {
            self.render_section(section, &mut out);
        }

        format!("{}\n", out.trim_end())
    }

    fn render_section(&self, section: &Section, out: &mut String) {
        if let Some(heading) = &section.heading {
            out.push_str(&format!("## {}\n\n", escape_text(heading)));
        }
        for block in &section.blocks {
            self.render_block(block, out);
        }
    }

    fn render_block(&self, block: &Block, out: &mut String) {
        match block {
            Block::Subheading { text } => {
                out.push_str(&format!("### {}\n\n", escape_text(text)));
            }
            Block::Paragraph { style, runs } => {
                let body = render_runs(runs);
                match style {
                    ParagraphStyle::Alert => {
                        for line in body.lines() {
                            out.push_str("> ");
                            out.push_str(line);
                            out.push('\n');
                        }
                    }
                    ParagraphStyle::Small | ParagraphStyle::Centered => {
                        out.push_str(&format!("<sub>{}</sub>\n", body.replace("  \n", "<br/>")));
                    }
                    ParagraphStyle::Normal => {
                        out.push_str(&body);
                        out.push('\n');
                    }
                }
                out.push('\n');
            }
            Block::Bullets { items } => {
                for item in items {
                    out.push_str("- ");
                    out.push_str(&render_runs(item));
                    out.push('\n');
                }
                out.push('\n');
            }
            Block::Table(table) => {
                render_table(table, out);
                out.push('\n');
            }
            Block::Rule => out.push_str("---\n\n"),
            Block::PageBreak => {
                out.push_str(PAGE_BREAK);
                out.push_str("\n\n");
            }
        }
    }
}

impl LayoutEngine for MarkdownLayout {
    fn format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }

    fn render(&self, document: &Document) -> LayoutResult<Vec<u8>> {
        Ok(self.render_string(document).into_bytes())
    }
}

fn render_runs(runs: &[Inline]) -> String {
    let mut out = String::new();
    for run in runs {
        match run {
            Inline::Text(s) => out.push_str(&escape_text(s)),
            Inline::Bold(s) => out.push_str(&emphasise(s, "**")),
            Inline::Italic(s) => out.push_str(&emphasise(s, "*")),
            Inline::LineBreak => out.push_str("  \n"),
        }
    }
    out
}

/// Wraps the trimmed text in `marker`, keeping surrounding whitespace outside the markers
/// (`** x**` is not valid emphasis).
fn emphasise(s: &str, marker: &str) -> String {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return s.to_owned();
    }
    let leading = &s[..s.len() - s.trim_start().len()];
    let trailing = &s[s.trim_end().len()..];
    format!("{leading}{marker}{}{marker}{trailing}", escape_text(trimmed))
}

fn render_table(table: &Table, out: &mut String) {
    let columns = table.column_count().max(1);
    let header: Vec<String> = match &table.header {
        Some(cells) => cells.iter().map(|c| escape_cell(c)).collect(),
        None => vec![String::new(); columns],
    };
    push_row(&header, out);
    push_row(&vec!["---".to_owned(); columns], out);

    for row in &table.rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                if table.label_columns.contains(&i) && !cell.trim().is_empty() {
                    format!("**{}**", escape_cell(cell))
                } else {
                    escape_cell(cell)
                }
            })
            .collect();
        push_row(&cells, out);
    }
}

fn push_row(cells: &[String], out: &mut String) {
    out.push('|');
    for cell in cells {
        out.push(' ');
        out.push_str(cell);
        out.push_str(" |");
    }
    out.push('\n');
}

fn escape_cell(cell: &str) -> String {
    escape_text(cell).replace('|', r"\|")
}

/// Escapes Markdown syntax in prose.
fn escape_text(text: &str) -> String {
    let escaped = text.replace("```", r"\`\`\`").replace('*', r"\*");
    if escaped.trim_start().starts_with('#') {
        escaped.replacen('#', r"\#", 1)
    } else {
        escaped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> Document {
        Document {
            title: "PATIENT ADMISSION ASSESSMENT".into(),
            letterhead: vec!["HOLT MEDICAL CENTER".into(), "Phone: 555-0100".into()],
            sections: vec![
                Section::new("demographics", Some("PATIENT DEMOGRAPHICS")).with(Block::Table(
                    Table::new(&[1.5, 2.0])
                        .labels(&[0])
                        .row(["Patient Name:", "Holt, Ann | Marie"]),
                )),
                Section::new("allergies", None).with(Block::styled(
                    ParagraphStyle::Alert,
                    vec![
                        Inline::bold("ALLERGIES:"),
                        Inline::LineBreak,
                        Inline::text("Latex -> Contact dermatitis"),
                    ],
                )),
            ],
        }
    }

    #[test]
    fn test_render_headings_and_letterhead() {
        let md = MarkdownLayout::new().render_string(&sample_document());
        assert!(md.starts_with("**HOLT MEDICAL CENTER**  \n"));
        assert!(md.contains("# PATIENT ADMISSION ASSESSMENT\n"));
        assert!(md.contains("## PATIENT DEMOGRAPHICS\n"));
    }

    #[test]
    fn test_render_table_escapes_pipes_and_bolds_labels() {
        let md = MarkdownLayout::new().render_string(&sample_document());
        assert!(md.contains("| **Patient Name:** | Holt, Ann \\| Marie |"));
        assert!(md.contains("| --- | --- |"));
    }

    #[test]
    fn test_render_alert_as_blockquote() {
        let md = MarkdownLayout::new().render_string(&sample_document());
        assert!(md.contains("> **ALLERGIES:**  \n> Latex -> Contact dermatitis\n"));
    }

    #[test]
    fn test_escape_text_rules() {
        assert_eq!(escape_text("# not a header"), r"\# not a header");
        assert_eq!(escape_text("a ``` b"), r"a \`\`\` b");
        assert_eq!(escape_text("2*3"), r"2\*3");
    }

    #[test]
    fn test_emphasise_keeps_whitespace_outside_markers() {
        assert_eq!(emphasise(" Plan: ", "**"), " **Plan:** ");
        assert_eq!(emphasise("   ", "*"), "   ");
    }

    #[test]
    fn test_engine_returns_utf8_bytes() {
        let bytes = MarkdownLayout::new().render(&sample_document()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.ends_with('\n'));
    }
}
