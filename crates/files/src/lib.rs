//! Intake Artifact Storage
//!
//! This crate owns everything that touches the filesystem when a generated document is
//! written out: resolving and creating the output directory, normalising filenames, and
//! recording what was written.
//!
//! ## Design Principles
//!
//! - The output directory is created on demand; failure to create it (or a path that is
//!   not a writable directory) is reported as [`FilesError::InvalidOutputPath`]
//! - Filenames are normalised before use: spaces become `_`, commas are dropped, and path
//!   separators are never allowed through
//! - Writes never replace an existing file; a name clash is [`FilesError::AlreadyExists`]
//! - Every write returns [`ArtifactMetadata`] with a SHA-256 digest of the bytes written
//!
//! ## Example Usage
//!
//! ```no_run
//! use intake_files::ArtifactWriter;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let writer = ArtifactWriter::new(Path::new("sample_docs"))?;
//! let name = intake_files::normalise_file_name("Smith, John_10162026.pdf")?;
//! let metadata = writer.write(&name, b"%PDF-1.3")?;
//! println!("{}", metadata.path.display());
//! # Ok(())
//! # }
//! ```

mod artifacts;

pub use artifacts::{normalise_file_name, ArtifactMetadata, ArtifactWriter};

/// Errors that can occur while writing artifacts
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Output directory cannot be created, is not a directory, or is not writable
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// A file with this name is already in the output directory; it is left untouched
    #[error("File already exists: {}", .0.display())]
    AlreadyExists(std::path::PathBuf),

    /// Filename is empty after normalisation or would escape the output directory
    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Results that can fail with a [`FilesError`].
pub type FilesResult<T> = Result<T, FilesError>;
