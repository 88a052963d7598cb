//! # Intake Layout
//!
//! Layout engines for structured intake documents.
//!
//! The synthesis crate produces a [`Document`] made of typed sections; an engine in this
//! crate decides how that looks on the page:
//! - [`MarkdownLayout`] renders GitHub-flavoured Markdown (bold/italic runs, pipe tables)
//! - [`PdfLayout`] paginates onto US Letter pages with built-in Helvetica fonts
//!
//! Engines never change content or ordering, they only draw what they are given.

mod markdown;
mod pdf;

pub use markdown::MarkdownLayout;
pub use pdf::PdfLayout;

use intake_types::Document;
use std::str::FromStr;

/// Errors returned by layout engines.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("PDF font error: {0}")]
    PdfFont(String),
    #[error("PDF save error: {0}")]
    PdfSave(String),
    #[error("unknown output format: {0}")]
    UnknownFormat(String),
}

/// Type alias for Results that can fail with a [`LayoutError`].
pub type LayoutResult<T> = Result<T, LayoutError>;

/// A layout engine turns a document into the bytes of one artifact.
pub trait LayoutEngine {
    /// Output format produced by this engine.
    fn format(&self) -> OutputFormat;

    /// Lays out `document` and returns the encoded artifact.
    fn render(&self, document: &Document) -> LayoutResult<Vec<u8>>;
}

/// Supported artifact formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pdf,
    Markdown,
}

impl OutputFormat {
    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Markdown => "md",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "application/pdf",
            OutputFormat::Markdown => "text/markdown",
        }
    }

    /// Returns the engine for this format.
    pub fn engine(self) -> Box<dyn LayoutEngine> {
        match self {
            OutputFormat::Pdf => Box::new(PdfLayout::new()),
            OutputFormat::Markdown => Box::new(MarkdownLayout::new()),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            other => Err(LayoutError::UnknownFormat(other.to_owned())),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Pdf => write!(f, "pdf"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("PDF".parse::<OutputFormat>().unwrap(), OutputFormat::Pdf);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!(
            "markdown".parse::<OutputFormat>().unwrap(),
            OutputFormat::Markdown
        );
        assert!(matches!(
            "docx".parse::<OutputFormat>(),
            Err(LayoutError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_engine_matches_format() {
        for format in [OutputFormat::Pdf, OutputFormat::Markdown] {
            assert_eq!(format.engine().format(), format);
        }
        assert_eq!(OutputFormat::Markdown.extension(), "md");
        assert_eq!(OutputFormat::Pdf.media_type(), "application/pdf");
    }
}
