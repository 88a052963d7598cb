//! Output file name validation.
//!
//! File names come either from the caller (`--file-name`) or from record fields (patient
//! name, institution). Both paths go through the same normalisation before anything is
//! written: spaces and path separators become `_`, commas are dropped, and the output
//! format's extension is appended when missing.

use crate::constants::FILENAME_DATE_FORMAT;
use crate::error::{IntakeError, IntakeResult};
use chrono::NaiveDate;
use intake_files::normalise_file_name;
use intake_layout::OutputFormat;
use intake_types::NonEmptyText;

const MAX_FILE_NAME_LEN: usize = 200;

/// Resolves the final file name for a document.
///
/// # Arguments
///
/// * `requested` - Caller-supplied name; blank values fall back to `default_stem`.
/// * `default_stem` - Name derived from the record, without extension.
/// * `format` - Output format whose extension the name must carry.
///
/// # Errors
///
/// Returns `IntakeError::InvalidInput` if the name is too long, or
/// `IntakeError::Files` if it normalises to nothing usable.
pub fn resolve_file_name(
    requested: Option<&str>,
    default_stem: &str,
    format: OutputFormat,
) -> IntakeResult<NonEmptyText> {
    let base = requested
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(default_stem);

    let suffix = format!(".{}", format.extension());
    let name = if base.to_ascii_lowercase().ends_with(&suffix) {
        base.to_owned()
    } else {
        format!("{base}{suffix}")
    };

    if name.len() > MAX_FILE_NAME_LEN {
        return Err(IntakeError::InvalidInput(format!(
            "file name exceeds maximum length of {} characters",
            MAX_FILE_NAME_LEN
        )));
    }

    Ok(normalise_file_name(&name)?)
}

/// `Last_First_MMDDYYYY`, before normalisation.
pub fn admission_file_stem(last_name: &str, first_name: &str, date: NaiveDate) -> String {
    format!(
        "{last_name}_{first_name}_{}",
        date.format(FILENAME_DATE_FORMAT)
    )
}

/// `<first word of institution>-new-meds`, before normalisation.
pub fn orders_file_stem(institution: &str) -> String {
    let short = institution.split_whitespace().next().unwrap_or("orders");
    format!("{short}-new-meds")
}

/// Suffixes a default stem with its 1-based position in a batch.
///
/// The first document of a batch keeps the plain stem, so single runs are unaffected.
/// Later documents get `-<n>` so two records that derive the same stem (the same
/// pharmacy chain, or two patients sharing a name) never claim the same file.
pub fn sequenced_stem(stem: &str, index: usize) -> String {
    if index == 0 {
        stem.to_owned()
    } else {
        format!("{stem}-{}", index + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admission_default_name_is_normalised() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        let stem = admission_file_stem("Van Buren", "Mary Ann", date);
        let name = resolve_file_name(None, &stem, OutputFormat::Pdf).unwrap();
        assert_eq!(name.as_str(), "Van_Buren_Mary_Ann_03072026.pdf");
    }

    #[test]
    fn test_commas_are_removed() {
        let name = resolve_file_name(Some("Smith, John"), "unused", OutputFormat::Markdown).unwrap();
        assert_eq!(name.as_str(), "Smith_John.md");
    }

    #[test]
    fn test_existing_extension_is_kept() {
        let name = resolve_file_name(Some("report.PDF"), "unused", OutputFormat::Pdf).unwrap();
        assert_eq!(name.as_str(), "report.PDF");
    }

    #[test]
    fn test_blank_request_falls_back() {
        let name = resolve_file_name(Some("   "), "fallback", OutputFormat::Pdf).unwrap();
        assert_eq!(name.as_str(), "fallback.pdf");
    }

    #[test]
    fn test_overlong_name_rejected() {
        let long = "x".repeat(MAX_FILE_NAME_LEN + 1);
        assert!(matches!(
            resolve_file_name(Some(&long), "unused", OutputFormat::Pdf),
            Err(IntakeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_sequenced_stems_are_distinct() {
        let stems: Vec<String> = (0..10).map(|i| sequenced_stem("Safeway-new-meds", i)).collect();
        assert_eq!(stems[0], "Safeway-new-meds");
        assert_eq!(stems[4], "Safeway-new-meds-5");
        let unique: std::collections::HashSet<_> = stems.iter().collect();
        assert_eq!(unique.len(), stems.len());
    }

    #[test]
    fn test_orders_stem_uses_first_word() {
        assert_eq!(orders_file_stem("CVS Pharmacy #4529"), "CVS-new-meds");
        assert_eq!(
            orders_file_stem("Newport Beach Primary Care"),
            "Newport-new-meds"
        );
    }
}
