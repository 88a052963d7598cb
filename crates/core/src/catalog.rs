//! Declarative catalog of fixed clinical data.
//!
//! Diagnosis bundles, medication pools, flag templates and the smaller phrase pools are
//! kept in `data/catalog.yaml` rather than in code. The catalog is parsed and
//! self-checked once at startup; generation then trusts it.

use crate::constants::BUILTIN_CATALOG_YAML;
use crate::error::{IntakeError, IntakeResult};
use crate::flags::FlagTier;
use crate::profile::{Allergy, DiagnosisKind, MedicationCategory};
use crate::record::TherapyDiscipline;
use crate::rng::{CountRange, OffsetRange};
use crate::template::placeholder_count;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The full catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Catalog {
    pub diagnosis_bundles: Vec<DiagnosisBundle>,
    /// Medication pools in list precedence order
    pub medication_pools: Vec<MedicationPool>,
    /// Final home-medication list length
    pub medication_list_length: CountRange,
    pub allergies: Pool<Allergy>,
    pub flags: FlagPools,
    pub insurance: Vec<InsurancePlan>,
    pub therapy: Vec<TherapyTemplate>,
    pub equipment: Pool<String>,
    pub immunizations: Pool<ImmunizationTemplate>,
    pub follow_ups: Pool<FollowUpTemplate>,
    pub nutrition: NutritionOptions,
    /// Section GG self-care and mobility activities
    pub section_gg: Vec<String>,
    pub medication_orders: OrderCatalog,
    pub narrative: NarrativePools,
}

/// A primary diagnosis with its correlated secondary conditions.
///
/// Secondary entries may carry one `{}` slot, filled with a BMI-like figure.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiagnosisBundle {
    pub kind: DiagnosisKind,
    pub primary: String,
    pub secondary: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MedicationPool {
    pub category: MedicationCategory,
    pub draw: CountRange,
    pub entries: Vec<MedicationEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MedicationEntry {
    pub name: String,
    pub dose: String,
    pub route: String,
    pub frequency: String,
}

/// Entries drawn without replacement, `count` at a time.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Pool<T> {
    pub count: CountRange,
    pub entries: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlagPools {
    pub routine: Pool<FlagTemplate>,
    pub elevated: Pool<FlagTemplate>,
    pub critical: Pool<FlagTemplate>,
}

impl FlagPools {
    pub fn tier(&self, tier: FlagTier) -> &Pool<FlagTemplate> {
        match tier {
            FlagTier::Routine => &self.routine,
            FlagTier::Elevated => &self.elevated,
            FlagTier::Critical => &self.critical,
        }
    }
}

/// A care flag with a detail template and one day-offset range per `{}` slot.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlagTemplate {
    pub name: String,
    pub detail: String,
    pub dates: Vec<OffsetRange>,
}

/// Primary and optional secondary insurance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InsurancePlan {
    pub primary: String,
    #[serde(default)]
    pub secondary: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TherapyTemplate {
    pub discipline: TherapyDiscipline,
    pub frequencies: Vec<String>,
    pub goals: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImmunizationTemplate {
    pub vaccine: String,
    pub given: OffsetRange,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FollowUpTemplate {
    pub specialty: String,
    pub scheduled: OffsetRange,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NutritionOptions {
    pub diets: Vec<String>,
    pub fluid_restrictions: Vec<String>,
    pub supplements: Vec<String>,
}

/// Pools for the medication-order sheet.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderCatalog {
    pub current: CurrentOrderPool,
    pub new: Pool<NewOrderEntry>,
    pub discontinued: Pool<DiscontinuedEntry>,
    pub physician_offices: Vec<String>,
    pub pharmacies: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CurrentOrderPool {
    pub count: CountRange,
    pub refills: CountRange,
    pub entries: Vec<OrderEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderEntry {
    pub name: String,
    pub strength: String,
    pub form: String,
    pub instructions: String,
    pub indication: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewOrderEntry {
    pub name: String,
    pub strength: String,
    pub form: String,
    pub instructions: String,
    pub indication: String,
    pub refills: CountRange,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiscontinuedEntry {
    pub name: String,
    pub strength: String,
    pub form: String,
    pub reason: String,
}

/// Phrase pools for study findings, the standing plan and transfer guidance.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NarrativePools {
    /// ECG findings; an optional `{}` slot takes the recorded heart rate
    pub ecg_findings: Vec<String>,
    pub chest_xray: Vec<String>,
    /// Standing plan items listed under every assessment
    pub plan_items: Vec<String>,
    pub mobility: Vec<MobilityProfile>,
    /// Precaution listed first on every transfer guideline
    pub standing_precaution: String,
    pub precautions: Pool<String>,
    pub weight_bearing: Vec<String>,
}

/// A baseline mobility and the transfer method it implies.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MobilityProfile {
    pub status: String,
    pub transfer: String,
}

/// What the self-check looked at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub diagnosis_bundles: usize,
    pub medications: usize,
    pub allergies: usize,
    pub flag_templates: usize,
    /// Total `{}` slots across flag templates
    pub flag_date_slots: usize,
    pub order_medications: usize,
}

impl Catalog {
    /// Parses and validates the catalog compiled into the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in catalog fails to parse or validate.
    pub fn builtin() -> IntakeResult<Self> {
        Self::from_yaml(BUILTIN_CATALOG_YAML)
    }

    /// Parses a catalog from YAML and validates it.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::CatalogParse` for malformed YAML, or any error reported by
    /// [`Catalog::validate`].
    pub fn from_yaml(yaml: &str) -> IntakeResult<Self> {
        let catalog: Catalog = serde_yaml::from_str(yaml)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Checks the catalog is usable for generation.
    ///
    /// - every diagnosis kind has exactly one bundle
    /// - every template's `{}` count matches its declared slots
    /// - no pool is asked to draw more distinct entries than it holds
    /// - medication pools appear in category precedence order
    /// - allergens, flag names and mobility statuses are unique within their pools
    /// - ECG findings carry at most one `{}` slot, for the heart rate
    ///
    /// # Errors
    ///
    /// Returns `TemplateSlotMismatch`, `SamplingExhaustion` or `InvalidCatalog` for the
    /// first problem found.
    pub fn validate(&self) -> IntakeResult<CatalogSummary> {
        self.validate_bundles()?;
        self.validate_medications()?;

        check_pool("allergies", self.allergies.count, self.allergies.entries.len())?;
        check_unique(
            "allergies",
            self.allergies.entries.iter().map(|a| a.allergen.as_str()),
        )?;

        let mut flag_templates = 0;
        let mut flag_date_slots = 0;
        for tier in FlagTier::BY_PRIORITY {
            let pool = self.flags.tier(tier);
            let pool_name = format!("{tier} flags");
            check_pool(&pool_name, pool.count, pool.entries.len())?;
            check_unique(&pool_name, pool.entries.iter().map(|f| f.name.as_str()))?;
            for template in &pool.entries {
                let found = placeholder_count(&template.detail);
                if found != template.dates.len() {
                    return Err(IntakeError::TemplateSlotMismatch {
                        template: template.name.clone(),
                        expected: template.dates.len(),
                        found,
                    });
                }
                for range in &template.dates {
                    check_offsets(&template.name, *range)?;
                }
                flag_templates += 1;
                flag_date_slots += found;
            }
        }

        non_empty("insurance", self.insurance.len())?;
        non_empty("therapy", self.therapy.len())?;
        check_unique(
            "therapy",
            self.therapy.iter().map(|t| t.discipline.label()),
        )?;
        for therapy in &self.therapy {
            non_empty(therapy.discipline.label(), therapy.frequencies.len())?;
            non_empty(therapy.discipline.label(), therapy.goals.len())?;
        }
        check_pool("equipment", self.equipment.count, self.equipment.entries.len())?;
        check_pool(
            "immunizations",
            self.immunizations.count,
            self.immunizations.entries.len(),
        )?;
        for immunization in &self.immunizations.entries {
            check_offsets(&immunization.vaccine, immunization.given)?;
        }
        check_pool("follow-ups", self.follow_ups.count, self.follow_ups.entries.len())?;
        for follow_up in &self.follow_ups.entries {
            check_offsets(&follow_up.specialty, follow_up.scheduled)?;
        }
        non_empty("diets", self.nutrition.diets.len())?;
        non_empty("fluid restrictions", self.nutrition.fluid_restrictions.len())?;
        non_empty("supplements", self.nutrition.supplements.len())?;
        non_empty("section GG activities", self.section_gg.len())?;

        let orders = &self.medication_orders;
        check_pool(
            "current orders",
            orders.current.count,
            orders.current.entries.len(),
        )?;
        check_range("current order refills", orders.current.refills)?;
        check_pool("new orders", orders.new.count, orders.new.entries.len())?;
        for entry in &orders.new.entries {
            check_range(&entry.name, entry.refills)?;
        }
        check_pool(
            "discontinued orders",
            orders.discontinued.count,
            orders.discontinued.entries.len(),
        )?;
        non_empty("physician offices", orders.physician_offices.len())?;
        non_empty("pharmacies", orders.pharmacies.len())?;

        self.validate_narrative()?;

        Ok(CatalogSummary {
            diagnosis_bundles: self.diagnosis_bundles.len(),
            medications: self.medication_pools.iter().map(|p| p.entries.len()).sum(),
            allergies: self.allergies.entries.len(),
            flag_templates,
            flag_date_slots,
            order_medications: orders.current.entries.len()
                + orders.new.entries.len()
                + orders.discontinued.entries.len(),
        })
    }

    /// Returns the bundle for a diagnosis kind.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::InvalidCatalog` if no bundle has that kind.
    pub fn bundle(&self, kind: DiagnosisKind) -> IntakeResult<&DiagnosisBundle> {
        self.diagnosis_bundles
            .iter()
            .find(|b| b.kind == kind)
            .ok_or_else(|| IntakeError::InvalidCatalog(format!("no {kind} diagnosis bundle")))
    }

    fn validate_bundles(&self) -> IntakeResult<()> {
        for kind in DiagnosisKind::ALL {
            let matching = self
                .diagnosis_bundles
                .iter()
                .filter(|b| b.kind == kind)
                .count();
            if matching != 1 {
                return Err(IntakeError::InvalidCatalog(format!(
                    "expected exactly one {kind} diagnosis bundle, found {matching}"
                )));
            }
        }
        for bundle in &self.diagnosis_bundles {
            let primary_slots = placeholder_count(&bundle.primary);
            if primary_slots != 0 {
                return Err(IntakeError::TemplateSlotMismatch {
                    template: bundle.primary.clone(),
                    expected: 0,
                    found: primary_slots,
                });
            }
            non_empty(&format!("{} secondary diagnoses", bundle.kind), bundle.secondary.len())?;
            for entry in &bundle.secondary {
                let found = placeholder_count(entry);
                if found > 1 {
                    return Err(IntakeError::TemplateSlotMismatch {
                        template: entry.clone(),
                        expected: 1,
                        found,
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_narrative(&self) -> IntakeResult<()> {
        let narrative = &self.narrative;
        non_empty("ECG findings", narrative.ecg_findings.len())?;
        for finding in &narrative.ecg_findings {
            let found = placeholder_count(finding);
            if found > 1 {
                return Err(IntakeError::TemplateSlotMismatch {
                    template: finding.clone(),
                    expected: 1,
                    found,
                });
            }
        }
        non_empty("chest X-ray findings", narrative.chest_xray.len())?;
        non_empty("plan items", narrative.plan_items.len())?;
        non_empty("mobility profiles", narrative.mobility.len())?;
        check_unique(
            "mobility profiles",
            narrative.mobility.iter().map(|m| m.status.as_str()),
        )?;
        if narrative.standing_precaution.trim().is_empty() {
            return Err(IntakeError::InvalidCatalog(
                "standing precaution must not be empty".into(),
            ));
        }
        check_pool(
            "transfer precautions",
            narrative.precautions.count,
            narrative.precautions.entries.len(),
        )?;
        non_empty("weight bearing", narrative.weight_bearing.len())?;
        Ok(())
    }

    fn validate_medications(&self) -> IntakeResult<()> {
        non_empty("medication pools", self.medication_pools.len())?;
        for pair in self.medication_pools.windows(2) {
            if pair[0].category >= pair[1].category {
                return Err(IntakeError::InvalidCatalog(format!(
                    "medication pool {} must come before {}",
                    pair[1].category, pair[0].category
                )));
            }
        }
        for pool in &self.medication_pools {
            check_pool(
                &format!("{} medications", pool.category),
                pool.draw,
                pool.entries.len(),
            )?;
        }
        check_range("medication list length", self.medication_list_length)?;
        if self.medication_list_length.min == 0 {
            return Err(IntakeError::InvalidCatalog(
                "medication list length must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn check_range(name: &str, range: CountRange) -> IntakeResult<()> {
    if range.min > range.max {
        return Err(IntakeError::InvalidCatalog(format!(
            "{name}: min {} exceeds max {}",
            range.min, range.max
        )));
    }
    Ok(())
}

fn check_offsets(name: &str, range: OffsetRange) -> IntakeResult<()> {
    if range.min > range.max {
        return Err(IntakeError::InvalidCatalog(format!(
            "{name}: day offset min {} exceeds max {}",
            range.min, range.max
        )));
    }
    Ok(())
}

fn check_pool(name: &str, count: CountRange, available: usize) -> IntakeResult<()> {
    check_range(name, count)?;
    if count.max > available {
        return Err(IntakeError::SamplingExhaustion {
            pool: name.to_owned(),
            requested: count.max,
            available,
        });
    }
    Ok(())
}

fn non_empty(name: &str, len: usize) -> IntakeResult<()> {
    if len == 0 {
        return Err(IntakeError::InvalidCatalog(format!("{name} must not be empty")));
    }
    Ok(())
}

fn check_unique<'a>(name: &str, values: impl Iterator<Item = &'a str>) -> IntakeResult<()> {
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value) {
            return Err(IntakeError::InvalidCatalog(format!(
                "{name}: duplicate entry '{value}'"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = Catalog::builtin().unwrap();
        let summary = catalog.validate().unwrap();
        assert_eq!(summary.diagnosis_bundles, 4);
        assert_eq!(summary.allergies, 8);
        assert!(summary.flag_templates >= 10);
    }

    #[test]
    fn test_builtin_pools_match_documented_counts() {
        let catalog = Catalog::builtin().unwrap();
        let draws: Vec<(MedicationCategory, usize, usize)> = catalog
            .medication_pools
            .iter()
            .map(|p| (p.category, p.draw.min, p.draw.max))
            .collect();
        assert_eq!(
            draws,
            vec![
                (MedicationCategory::Cardiac, 1, 2),
                (MedicationCategory::Diabetes, 0, 2),
                (MedicationCategory::Respiratory, 0, 1),
                (MedicationCategory::Common, 1, 3),
            ]
        );
        assert_eq!(catalog.medication_list_length, CountRange::new(4, 7));
        assert_eq!(catalog.allergies.count, CountRange::new(2, 4));
        assert_eq!(catalog.flags.routine.count, CountRange::new(2, 4));
        assert_eq!(catalog.flags.elevated.count, CountRange::new(1, 2));
        assert_eq!(catalog.flags.critical.count, CountRange::new(1, 1));
    }

    #[test]
    fn test_builtin_has_two_slot_templates() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog
            .flags
            .elevated
            .entries
            .iter()
            .any(|f| f.dates.len() == 2));
    }

    #[test]
    fn test_flag_slot_mismatch_detected() {
        let mut catalog = Catalog::builtin().unwrap();
        catalog.flags.routine.entries[0].detail = "Checked {} and {}".into();
        catalog.flags.routine.entries[0].dates = vec![OffsetRange { min: -1, max: 0 }];
        let name = catalog.flags.routine.entries[0].name.clone();
        match catalog.validate().unwrap_err() {
            IntakeError::TemplateSlotMismatch {
                template,
                expected,
                found,
            } => {
                assert_eq!(template, name);
                assert_eq!(expected, 1);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_undersized_pool_detected() {
        let mut catalog = Catalog::builtin().unwrap();
        catalog.allergies.entries.truncate(3);
        assert!(matches!(
            catalog.validate(),
            Err(IntakeError::SamplingExhaustion {
                requested: 4,
                available: 3,
                ..
            })
        ));
    }

    #[test]
    fn test_missing_bundle_detected() {
        let mut catalog = Catalog::builtin().unwrap();
        catalog
            .diagnosis_bundles
            .retain(|b| b.kind != DiagnosisKind::Sepsis);
        assert!(matches!(
            catalog.validate(),
            Err(IntakeError::InvalidCatalog(_))
        ));
    }

    #[test]
    fn test_pool_order_enforced() {
        let mut catalog = Catalog::builtin().unwrap();
        catalog.medication_pools.swap(0, 3);
        assert!(matches!(
            catalog.validate(),
            Err(IntakeError::InvalidCatalog(_))
        ));
    }

    #[test]
    fn test_duplicate_allergen_detected() {
        let mut catalog = Catalog::builtin().unwrap();
        let first = catalog.allergies.entries[0].clone();
        catalog.allergies.entries[1] = first;
        assert!(matches!(
            catalog.validate(),
            Err(IntakeError::InvalidCatalog(_))
        ));
    }

    #[test]
    fn test_unknown_nested_keys_are_rejected() {
        let extra_allergy_key = BUILTIN_CATALOG_YAML.replacen(
            "reaction: Contact dermatitis }",
            "reaction: Contact dermatitis, severity: mild }",
            1,
        );
        assert_ne!(extra_allergy_key, BUILTIN_CATALOG_YAML);
        assert!(matches!(
            Catalog::from_yaml(&extra_allergy_key),
            Err(IntakeError::CatalogParse(_))
        ));

        // `secondary` is optional, so a misspelling would otherwise read as "no plan".
        let misspelled_optional = BUILTIN_CATALOG_YAML.replacen(
            "secondary: AARP Supplemental",
            "secondry: AARP Supplemental",
            1,
        );
        assert_ne!(misspelled_optional, BUILTIN_CATALOG_YAML);
        assert!(matches!(
            Catalog::from_yaml(&misspelled_optional),
            Err(IntakeError::CatalogParse(_))
        ));

        let misspelled_range = BUILTIN_CATALOG_YAML.replacen(
            "dates: [{ min: -1, max: 0 }]",
            "dates: [{ min: -1, max: 0, mid: 0 }]",
            1,
        );
        assert_ne!(misspelled_range, BUILTIN_CATALOG_YAML);
        assert!(matches!(
            Catalog::from_yaml(&misspelled_range),
            Err(IntakeError::CatalogParse(_))
        ));
    }

    #[test]
    fn test_narrative_pools_are_checked() {
        let mut catalog = Catalog::builtin().unwrap();
        catalog.narrative.ecg_findings[0] = "Rate {} then {} bpm".into();
        assert!(matches!(
            catalog.validate(),
            Err(IntakeError::TemplateSlotMismatch { found: 2, .. })
        ));

        let mut catalog = Catalog::builtin().unwrap();
        catalog.narrative.plan_items.clear();
        assert!(matches!(
            catalog.validate(),
            Err(IntakeError::InvalidCatalog(_))
        ));

        let mut catalog = Catalog::builtin().unwrap();
        let first = catalog.narrative.mobility[0].clone();
        catalog.narrative.mobility.push(first);
        assert!(matches!(
            catalog.validate(),
            Err(IntakeError::InvalidCatalog(_))
        ));

        let mut catalog = Catalog::builtin().unwrap();
        catalog.narrative.precautions.entries.truncate(1);
        assert!(matches!(
            catalog.validate(),
            Err(IntakeError::SamplingExhaustion { .. })
        ));
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        assert!(matches!(
            Catalog::from_yaml("diagnosis_bundles: [unterminated"),
            Err(IntakeError::CatalogParse(_))
        ));
    }
}
