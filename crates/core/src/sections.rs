//! Section selection for admission documents.
//!
//! Selection is a pure predicate over the record: every probabilistic decision was taken
//! during assembly. The output is always a subsequence of [`SectionKind::ALL`], so
//! omitting optional sections never reorders the rest.

use crate::record::PatientRecord;
use serde::Serialize;

/// Admission document sections in fixed display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Demographics,
    AdmissionInfo,
    Diagnoses,
    AllergiesAlert,
    Vitals,
    Medications,
    Labs,
    DiagnosticStudies,
    PhysicalExam,
    AssessmentPlan,
    EmergencyContacts,
    CodeStatus,
    SocialHistory,
    FunctionalStatus,
    SectionGg,
    TherapyServices,
    ClinicalFlags,
    EquipmentNeeds,
    TransferGuidelines,
    Immunizations,
    FollowUpAppointments,
    Nutrition,
    Signature,
    Footer,
}

impl SectionKind {
    pub const ALL: [SectionKind; 24] = [
        SectionKind::Demographics,
        SectionKind::AdmissionInfo,
        SectionKind::Diagnoses,
        SectionKind::AllergiesAlert,
        SectionKind::Vitals,
        SectionKind::Medications,
        SectionKind::Labs,
        SectionKind::DiagnosticStudies,
        SectionKind::PhysicalExam,
        SectionKind::AssessmentPlan,
        SectionKind::EmergencyContacts,
        SectionKind::CodeStatus,
        SectionKind::SocialHistory,
        SectionKind::FunctionalStatus,
        SectionKind::SectionGg,
        SectionKind::TherapyServices,
        SectionKind::ClinicalFlags,
        SectionKind::EquipmentNeeds,
        SectionKind::TransferGuidelines,
        SectionKind::Immunizations,
        SectionKind::FollowUpAppointments,
        SectionKind::Nutrition,
        SectionKind::Signature,
        SectionKind::Footer,
    ];

    /// Stable machine key, used as the section key in rendered documents.
    pub fn key(&self) -> &'static str {
        match self {
            SectionKind::Demographics => "demographics",
            SectionKind::AdmissionInfo => "admission_info",
            SectionKind::Diagnoses => "diagnoses",
            SectionKind::AllergiesAlert => "allergies",
            SectionKind::Vitals => "vitals",
            SectionKind::Medications => "medications",
            SectionKind::Labs => "labs",
            SectionKind::DiagnosticStudies => "diagnostic_studies",
            SectionKind::PhysicalExam => "physical_exam",
            SectionKind::AssessmentPlan => "assessment_plan",
            SectionKind::EmergencyContacts => "emergency_contacts",
            SectionKind::CodeStatus => "code_status",
            SectionKind::SocialHistory => "social_history",
            SectionKind::FunctionalStatus => "functional_status",
            SectionKind::SectionGg => "section_gg",
            SectionKind::TherapyServices => "therapy_services",
            SectionKind::ClinicalFlags => "clinical_flags",
            SectionKind::EquipmentNeeds => "equipment_needs",
            SectionKind::TransferGuidelines => "transfer_guidelines",
            SectionKind::Immunizations => "immunizations",
            SectionKind::FollowUpAppointments => "follow_up_appointments",
            SectionKind::Nutrition => "nutrition",
            SectionKind::Signature => "signature",
            SectionKind::Footer => "footer",
        }
    }

    /// Printed heading; `None` for the allergy call-out, signature and footer.
    pub fn heading(&self) -> Option<&'static str> {
        Some(match self {
            SectionKind::Demographics => "PATIENT DEMOGRAPHICS",
            SectionKind::AdmissionInfo => "ADMISSION INFORMATION",
            SectionKind::Diagnoses => "ADMITTING DIAGNOSES",
            SectionKind::Vitals => "VITAL SIGNS ON ADMISSION",
            SectionKind::Medications => "HOME MEDICATIONS (Patient Report)",
            SectionKind::Labs => "ADMISSION LABORATORY RESULTS",
            SectionKind::DiagnosticStudies => "DIAGNOSTIC STUDIES",
            SectionKind::PhysicalExam => "ADMISSION PHYSICAL EXAMINATION",
            SectionKind::AssessmentPlan => "ASSESSMENT AND INITIAL PLAN",
            SectionKind::EmergencyContacts => "EMERGENCY CONTACTS",
            SectionKind::CodeStatus => "CODE STATUS & ADVANCE DIRECTIVES",
            SectionKind::SocialHistory => "SOCIAL HISTORY",
            SectionKind::FunctionalStatus => "FUNCTIONAL STATUS",
            SectionKind::SectionGg => "SECTION GG: FUNCTIONAL ABILITIES AND GOALS",
            SectionKind::TherapyServices => "THERAPY SERVICES",
            SectionKind::ClinicalFlags => "CLINICAL FLAGS & CARE ALERTS",
            SectionKind::EquipmentNeeds => "DURABLE MEDICAL EQUIPMENT NEEDS",
            SectionKind::TransferGuidelines => "TRANSFER & MOBILITY GUIDELINES",
            SectionKind::Immunizations => "IMMUNIZATION HISTORY",
            SectionKind::FollowUpAppointments => "FOLLOW-UP APPOINTMENTS",
            SectionKind::Nutrition => "NUTRITION ORDERS",
            SectionKind::AllergiesAlert | SectionKind::Signature | SectionKind::Footer => {
                return None
            }
        })
    }

    /// Whether the record has content for this section.
    pub fn is_present(&self, record: &PatientRecord) -> bool {
        match self {
            SectionKind::SectionGg => record.section_gg.is_some(),
            SectionKind::TherapyServices => !record.therapy.is_empty(),
            SectionKind::ClinicalFlags => !record.flags.is_empty(),
            SectionKind::EquipmentNeeds => !record.equipment.is_empty(),
            SectionKind::Immunizations => !record.immunizations.is_empty(),
            SectionKind::FollowUpAppointments => !record.follow_ups.is_empty(),
            SectionKind::Nutrition => record.nutrition.is_some(),
            _ => true,
        }
    }
}

/// The sections to render for `record`, in display order.
pub fn select_sections(record: &PatientRecord) -> Vec<SectionKind> {
    let selected: Vec<SectionKind> = SectionKind::ALL
        .into_iter()
        .filter(|kind| kind.is_present(record))
        .collect();
    tracing::debug!(
        document_id = %record.metadata.document_id,
        sections = selected.len(),
        "selected admission sections"
    );
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::RecordAssembler;
    use crate::catalog::Catalog;
    use crate::config::{CoreConfig, SectionOdds};
    use crate::identity::FakeIdentityProvider;
    use crate::rng::make_rng;
    use chrono::NaiveDate;
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn record(odds: SectionOdds, seed: u64) -> PatientRecord {
        let catalog = Catalog::builtin().unwrap();
        let cfg = CoreConfig::new(PathBuf::from("out"))
            .unwrap()
            .with_section_odds(odds);
        let identity = FakeIdentityProvider;
        let now = NaiveDate::from_ymd_opt(2026, 1, 2)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        RecordAssembler::new(&catalog, &identity, &cfg)
            .assemble(&mut make_rng(seed, "sections"), now, None)
            .unwrap()
    }

    fn position(kind: SectionKind) -> usize {
        SectionKind::ALL.iter().position(|k| *k == kind).unwrap()
    }

    #[test]
    fn test_keys_are_unique() {
        let keys: HashSet<_> = SectionKind::ALL.iter().map(|k| k.key()).collect();
        assert_eq!(keys.len(), SectionKind::ALL.len());
    }

    #[test]
    fn test_all_optional_sections_present() {
        let selected = select_sections(&record(SectionOdds::all(), 1));
        assert_eq!(selected, SectionKind::ALL.to_vec());
    }

    #[test]
    fn test_omission_preserves_order() {
        for seed in 0..100 {
            let selected = select_sections(&record(SectionOdds::default(), seed));
            let positions: Vec<_> = selected.iter().map(|k| position(*k)).collect();
            let mut sorted = positions.clone();
            sorted.sort();
            assert_eq!(positions, sorted);
            assert_eq!(selected.first(), Some(&SectionKind::Demographics));
            assert_eq!(selected.last(), Some(&SectionKind::Footer));
            assert!(selected.contains(&SectionKind::TransferGuidelines));
        }
    }

    #[test]
    fn test_selection_is_pure() {
        let r = record(SectionOdds::default(), 42);
        assert_eq!(select_sections(&r), select_sections(&r));
    }

    #[test]
    fn test_none_odds_leave_required_sections() {
        let selected = select_sections(&record(SectionOdds::none(), 5));
        for kind in [
            SectionKind::SectionGg,
            SectionKind::TherapyServices,
            SectionKind::EquipmentNeeds,
            SectionKind::Immunizations,
            SectionKind::FollowUpAppointments,
            SectionKind::Nutrition,
        ] {
            assert!(!selected.contains(&kind));
        }
        // Routine flags are always drawn with default flag odds.
        assert!(selected.contains(&SectionKind::ClinicalFlags));
    }
}
