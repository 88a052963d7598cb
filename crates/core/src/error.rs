//! Errors raised while synthesising and writing intake documents.
//!
//! The taxonomy is narrow: malformed fixed data (sampling exhaustion, template slot
//! mismatches, catalog shape problems) and bad output paths. Record composition and
//! section selection are total and never fail at runtime.

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("cannot draw {requested} distinct entries from {pool}: only {available} available")]
    SamplingExhaustion {
        pool: String,
        requested: usize,
        available: usize,
    },
    #[error("template '{template}' has {found} placeholder(s) but {expected} value(s) supplied")]
    TemplateSlotMismatch {
        template: String,
        expected: usize,
        found: usize,
    },
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
    #[error("failed to parse catalog YAML: {0}")]
    CatalogParse(#[from] serde_yaml::Error),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to serialize record: {0}")]
    Serialization(serde_json::Error),
    #[error("artifact error: {0}")]
    Files(#[from] intake_files::FilesError),
    #[error("layout error: {0}")]
    Layout(#[from] intake_layout::LayoutError),
}

impl IntakeError {
    /// True when the output directory could not be created or written.
    pub fn is_invalid_output_path(&self) -> bool {
        matches!(
            self,
            IntakeError::Files(intake_files::FilesError::InvalidOutputPath(_))
        )
    }
}

pub type IntakeResult<T> = std::result::Result<T, IntakeError>;
