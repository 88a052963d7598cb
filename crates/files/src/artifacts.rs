//! Output directory and artifact writing.
//!
//! [`ArtifactWriter`] is bound to one output directory. Construction creates the
//! directory if it is absent and validates that the result is a writable directory, so
//! every later [`ArtifactWriter::write`] only has to deal with the file itself.

use crate::{FilesError, FilesResult};
use chrono::{DateTime, Utc};
use intake_types::NonEmptyText;
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Metadata for a written artifact
///
/// Returned after a successful write so callers can log or report exactly what landed on
/// disk without re-reading it.
#[derive(Debug, Clone, serde::Serialize, PartialEq, Eq)]
pub struct ArtifactMetadata {
    /// Full path of the written file
    pub path: PathBuf,

    /// Normalised filename (last path component)
    pub file_name: NonEmptyText,

    /// Size of the file in bytes
    pub size_bytes: u64,

    /// Hexadecimal SHA-256 digest of the file content
    pub sha256: String,

    /// UTC timestamp when the file was written
    pub written_at: DateTime<Utc>,
}

/// Writes generated documents into a single output directory
#[derive(Debug)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    /// Creates a writer for `output_dir`, creating the directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidOutputPath` if:
    /// - the directory (or one of its parents) cannot be created
    /// - the path exists but is not a directory
    /// - the directory is read-only
    pub fn new(output_dir: &Path) -> FilesResult<Self> {
        if output_dir.as_os_str().is_empty() {
            return Err(FilesError::InvalidOutputPath(
                "output directory cannot be empty".into(),
            ));
        }

        if output_dir.exists() && !output_dir.is_dir() {
            return Err(FilesError::InvalidOutputPath(format!(
                "Path is not a directory: {}",
                output_dir.display()
            )));
        }

        if !output_dir.exists() {
            fs::create_dir_all(output_dir).map_err(|e| {
                FilesError::InvalidOutputPath(format!(
                    "Cannot create directory {}: {}",
                    output_dir.display(),
                    e
                ))
            })?;
            tracing::debug!("created output directory {}", output_dir.display());
        }

        let metadata = fs::metadata(output_dir).map_err(|e| {
            FilesError::InvalidOutputPath(format!(
                "Cannot read metadata for {}: {}",
                output_dir.display(),
                e
            ))
        })?;

        if metadata.permissions().readonly() {
            return Err(FilesError::InvalidOutputPath(format!(
                "Directory is not writable: {}",
                output_dir.display()
            )));
        }

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Returns the output directory this writer is bound to
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Returns the path a file with this (already normalised) name would be written to
    #[must_use]
    pub fn path_for(&self, file_name: &NonEmptyText) -> PathBuf {
        self.output_dir.join(file_name.as_str())
    }

    /// Writes `bytes` to a new file `<output_dir>/<file_name>`.
    ///
    /// An existing file is never replaced.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::AlreadyExists` if the file is already present,
    /// `FilesError::InvalidOutputPath` when the directory refuses the write
    /// (permission denied) and `FilesError::Io` for any other I/O failure.
    pub fn write(&self, file_name: &NonEmptyText, bytes: &[u8]) -> FilesResult<ArtifactMetadata> {
        let path = self.path_for(file_name);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => FilesError::AlreadyExists(path.clone()),
                ErrorKind::PermissionDenied => FilesError::InvalidOutputPath(format!(
                    "Directory is not writable: {}",
                    self.output_dir.display()
                )),
                kind => FilesError::Io(std::io::Error::new(
                    kind,
                    format!("Failed to create {}: {}", path.display(), e),
                )),
            })?;
        file.write_all(bytes).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write file to {}: {}", path.display(), e),
            ))
        })?;

        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let sha256 = hex::encode(hasher.finalize());

        Ok(ArtifactMetadata {
            path,
            file_name: file_name.clone(),
            size_bytes: bytes.len() as u64,
            sha256,
            written_at: Utc::now(),
        })
    }
}

/// Normalises a candidate filename so it is safe to join onto the output directory.
///
/// Rules:
/// - spaces become `_`
/// - commas are removed
/// - path separators (`/`, `\`) become `_`
///
/// # Errors
///
/// Returns `FilesError::InvalidFileName` if the result is empty, `.` or `..`.
pub fn normalise_file_name(raw: &str) -> FilesResult<NonEmptyText> {
    let normalised: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',')
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect();

    if normalised == "." || normalised == ".." {
        return Err(FilesError::InvalidFileName(raw.to_owned()));
    }

    NonEmptyText::new(&normalised).map_err(|_| FilesError::InvalidFileName(raw.to_owned()))
}
