//! Clinical profile composition: diagnosis bundle, home medications, allergies and the
//! condition-gated lab panel.

use crate::catalog::Catalog;
use crate::error::{IntakeError, IntakeResult};
use crate::generators::{
    obesity_bmi_label, BasicMetabolicPanel, CardiacMarkers, CompleteBloodCount, LipidPanel,
};
use crate::rng::{pick, sample_distinct};
use crate::template::{fill_template, placeholder_count};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of diagnosis bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisKind {
    Cardiac,
    Respiratory,
    Neuro,
    Sepsis,
}

impl DiagnosisKind {
    pub const ALL: [DiagnosisKind; 4] = [
        DiagnosisKind::Cardiac,
        DiagnosisKind::Respiratory,
        DiagnosisKind::Neuro,
        DiagnosisKind::Sepsis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosisKind::Cardiac => "cardiac",
            DiagnosisKind::Respiratory => "respiratory",
            DiagnosisKind::Neuro => "neuro",
            DiagnosisKind::Sepsis => "sepsis",
        }
    }
}

impl fmt::Display for DiagnosisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiagnosisKind {
    type Err = IntakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiagnosisKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                IntakeError::InvalidInput(format!(
                    "unknown diagnosis '{s}' (expected cardiac, respiratory, neuro or sepsis)"
                ))
            })
    }
}

/// How the diagnosis bundle is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisSelection {
    /// Uniformly from the catalog
    #[default]
    Uniform,
    /// Always the given bundle
    Fixed(DiagnosisKind),
}

/// Primary diagnosis plus its correlated secondary conditions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnosis {
    pub kind: DiagnosisKind,
    pub primary: String,
    pub secondary: Vec<String>,
}

impl Diagnosis {
    pub fn is_cardiac(&self) -> bool {
        self.kind == DiagnosisKind::Cardiac
    }
}

/// Medication pool category. Declaration order is list precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MedicationCategory {
    Cardiac,
    Diabetes,
    Respiratory,
    Common,
}

impl fmt::Display for MedicationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MedicationCategory::Cardiac => "cardiac",
            MedicationCategory::Diabetes => "diabetes",
            MedicationCategory::Respiratory => "respiratory",
            MedicationCategory::Common => "common",
        })
    }
}

/// One home medication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Medication {
    pub category: MedicationCategory,
    pub name: String,
    pub dose: String,
    pub route: String,
    pub frequency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Allergy {
    pub allergen: String,
    pub reaction: String,
}

/// Admission labs. Cardiac markers and lipids are present only for cardiac bundles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabPanel {
    pub cbc: CompleteBloodCount,
    pub bmp: BasicMetabolicPanel,
    pub cardiac: Option<CardiacMarkers>,
    pub lipids: Option<LipidPanel>,
}

/// The clinical part of a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClinicalProfile {
    pub diagnosis: Diagnosis,
    pub medications: Vec<Medication>,
    pub allergies: Vec<Allergy>,
    pub labs: LabPanel,
}

/// Composes coherent clinical profiles from the catalog.
pub struct ProfileComposer<'a> {
    catalog: &'a Catalog,
}

impl<'a> ProfileComposer<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Composes a full clinical profile.
    ///
    /// The diagnosis is settled first; the lab panel is gated on it.
    ///
    /// # Errors
    ///
    /// Returns catalog errors (`SamplingExhaustion`, `TemplateSlotMismatch`,
    /// `InvalidCatalog`) only if the catalog was not validated.
    pub fn compose<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        selection: DiagnosisSelection,
    ) -> IntakeResult<ClinicalProfile> {
        let diagnosis = self.select_diagnosis(rng, selection)?;
        let medications = self.compose_medications(rng)?;
        let allergies = self.select_allergies(rng)?;
        let labs = compose_labs(rng, &diagnosis);
        Ok(ClinicalProfile {
            diagnosis,
            medications,
            allergies,
            labs,
        })
    }

    /// Picks one bundle as a unit and fills any slot in its secondary entries.
    pub fn select_diagnosis<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        selection: DiagnosisSelection,
    ) -> IntakeResult<Diagnosis> {
        let bundle = match selection {
            DiagnosisSelection::Uniform => {
                pick(rng, &self.catalog.diagnosis_bundles, "diagnosis bundles")?
            }
            DiagnosisSelection::Fixed(kind) => self.catalog.bundle(kind)?,
        };

        let mut secondary = Vec::with_capacity(bundle.secondary.len());
        for entry in &bundle.secondary {
            let mut values = Vec::new();
            for _ in 0..placeholder_count(entry) {
                values.push(obesity_bmi_label(rng));
            }
            secondary.push(fill_template(entry, entry, &values)?);
        }

        Ok(Diagnosis {
            kind: bundle.kind,
            primary: bundle.primary.clone(),
            secondary,
        })
    }

    /// Draws from each category pool in precedence order, concatenates, then truncates
    /// from the tail to a random target length. Short lists are not padded.
    pub fn compose_medications<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> IntakeResult<Vec<Medication>> {
        let mut medications = Vec::new();
        for pool in &self.catalog.medication_pools {
            let count = pool.draw.sample(rng);
            let pool_name = format!("{} medications", pool.category);
            for entry in sample_distinct(rng, &pool.entries, count, &pool_name)? {
                medications.push(Medication {
                    category: pool.category,
                    name: entry.name,
                    dose: entry.dose,
                    route: entry.route,
                    frequency: entry.frequency,
                });
            }
        }

        let target = self.catalog.medication_list_length.sample(rng);
        medications.truncate(target);
        if medications.len() < self.catalog.medication_list_length.min {
            tracing::warn!(
                count = medications.len(),
                target,
                "medication list shorter than minimum target; not padded"
            );
        }
        Ok(medications)
    }

    /// Draws distinct allergies.
    pub fn select_allergies<R: Rng + ?Sized>(&self, rng: &mut R) -> IntakeResult<Vec<Allergy>> {
        let pool = &self.catalog.allergies;
        let count = pool.count.sample(rng);
        sample_distinct(rng, &pool.entries, count, "allergies")
    }
}

/// CBC and BMP always; cardiac markers and lipids iff the bundle is cardiac.
pub fn compose_labs<R: Rng + ?Sized>(rng: &mut R, diagnosis: &Diagnosis) -> LabPanel {
    let cbc = CompleteBloodCount::generate(rng);
    let bmp = BasicMetabolicPanel::generate(rng);
    let (cardiac, lipids) = if diagnosis.is_cardiac() {
        (
            Some(CardiacMarkers::generate(rng)),
            Some(LipidPanel::generate(rng)),
        )
    } else {
        (None, None)
    };
    LabPanel {
        cbc,
        bmp,
        cardiac,
        lipids,
    }
}
