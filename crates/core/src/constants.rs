//! Constants used throughout the intake core crate.

/// Default directory for generated documents when no explicit directory is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "sample_docs";

/// Environment variable consulted by entry points for the output directory.
pub const OUTPUT_DIR_ENV: &str = "INTAKE_OUTPUT_DIR";

/// Built-in catalog of diagnosis bundles, medication pools, flag templates and other
/// fixed clinical data.
pub const BUILTIN_CATALOG_YAML: &str = include_str!("../data/catalog.yaml");

/// Placeholder marking an interpolation slot in catalog templates.
pub const TEMPLATE_SLOT: &str = "{}";

/// Display format for calendar dates.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Display format for clock times.
pub const TIME_FORMAT: &str = "%H:%M";

/// Timestamp suffix used in document identifiers.
pub const DOCUMENT_ID_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M";

/// Date stamp used in admission filenames (`LAST_FIRST_MMDDYYYY`).
pub const FILENAME_DATE_FORMAT: &str = "%m%d%Y";

/// Title of the admission document.
pub const ADMISSION_TITLE: &str = "PATIENT ADMISSION ASSESSMENT";

/// Title of the medication-order sheet.
pub const MEDICATION_ORDERS_TITLE: &str = "PATIENT MEDICATION ORDERS";

/// Patient age bounds (inclusive).
pub const MIN_PATIENT_AGE: u32 = 55;
pub const MAX_PATIENT_AGE: u32 = 90;

pub const KG_PER_LB: f64 = 0.453592;
pub const CM_PER_INCH: f64 = 2.54;
