//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into the service. Nothing
//! in the generation path reads environment variables, so a run is fully described by its
//! `CoreConfig` and seed.

use crate::constants::DEFAULT_OUTPUT_DIR;
use crate::error::{IntakeError, IntakeResult};
pub use crate::flags::FlagTierOdds;
pub use crate::profile::DiagnosisSelection;
use intake_layout::OutputFormat;
use intake_types::Probability;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Inclusion probabilities for optional admission sections.
///
/// The draws happen while the record is assembled; section selection afterwards only
/// inspects the record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SectionOdds {
    pub section_gg: Probability,
    pub physical_therapy: Probability,
    pub occupational_therapy: Probability,
    pub speech_therapy: Probability,
    pub equipment: Probability,
    pub immunizations: Probability,
    pub follow_ups: Probability,
    pub nutrition: Probability,
    /// Medication-order sheet: chance of a discontinued-medications block
    pub discontinued_orders: Probability,
}

impl Default for SectionOdds {
    fn default() -> Self {
        Self {
            section_gg: Probability::percent(50),
            physical_therapy: Probability::percent(50),
            occupational_therapy: Probability::percent(50),
            speech_therapy: Probability::percent(50),
            equipment: Probability::percent(50),
            immunizations: Probability::percent(60),
            follow_ups: Probability::percent(70),
            nutrition: Probability::percent(50),
            discontinued_orders: Probability::percent(40),
        }
    }
}

impl SectionOdds {
    /// Every optional section always present.
    pub fn all() -> Self {
        Self::uniform(Probability::ALWAYS)
    }

    /// Every optional section always omitted.
    pub fn none() -> Self {
        Self::uniform(Probability::NEVER)
    }

    fn uniform(p: Probability) -> Self {
        Self {
            section_gg: p,
            physical_therapy: p,
            occupational_therapy: p,
            speech_therapy: p,
            equipment: p,
            immunizations: p,
            follow_ups: p,
            nutrition: p,
            discontinued_orders: p,
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    output_dir: PathBuf,
    output_format: OutputFormat,
    seed: Option<u64>,
    diagnosis: DiagnosisSelection,
    section_odds: SectionOdds,
    flag_odds: FlagTierOdds,
}

impl CoreConfig {
    /// Create a new `CoreConfig` writing to `output_dir`, with default odds.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::InvalidInput` if `output_dir` is empty.
    pub fn new(output_dir: PathBuf) -> IntakeResult<Self> {
        if output_dir.as_os_str().is_empty() {
            return Err(IntakeError::InvalidInput(
                "output directory cannot be empty".into(),
            ));
        }

        Ok(Self {
            output_dir,
            output_format: OutputFormat::default(),
            seed: None,
            diagnosis: DiagnosisSelection::default(),
            section_odds: SectionOdds::default(),
            flag_odds: FlagTierOdds::default(),
        })
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_diagnosis(mut self, diagnosis: DiagnosisSelection) -> Self {
        self.diagnosis = diagnosis;
        self
    }

    pub fn with_section_odds(mut self, odds: SectionOdds) -> Self {
        self.section_odds = odds;
        self
    }

    pub fn with_flag_odds(mut self, odds: FlagTierOdds) -> Self {
        self.flag_odds = odds;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn diagnosis(&self) -> DiagnosisSelection {
        self.diagnosis
    }

    pub fn section_odds(&self) -> &SectionOdds {
        &self.section_odds
    }

    pub fn flag_odds(&self) -> &FlagTierOdds {
        &self.flag_odds
    }
}

/// Resolve the output directory without reading environment variables.
///
/// An explicit, non-blank override wins; otherwise the default `sample_docs` directory
/// relative to the working directory is used.
pub fn resolve_output_dir(override_dir: Option<PathBuf>) -> PathBuf {
    override_dir
        .filter(|dir| !dir.as_os_str().to_string_lossy().trim().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
}
