//! The patient record: every field an admission document shows.
//!
//! A record is built in one pass by the [`RecordAssembler`](crate::assembler::RecordAssembler),
//! fully populated before rendering and never mutated afterwards. Optional sections are
//! represented by `Option` or possibly-empty collections; whether a section appears is
//! decided by looking at these fields alone.

use crate::catalog::InsurancePlan;
use crate::dates::RelativeDate;
use crate::flags::ClinicalFlags;
use crate::generators::{
    Anthropometrics, MedicalRecordNumber, Npi, SocialSecurityNumber, Vitals,
};
use crate::identity::PostalAddress;
use crate::profile::{Allergy, Diagnosis, LabPanel, Medication};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }

    /// Lowercase form for narrative text.
    pub fn noun(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientIdentity {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    /// 55-90 inclusive, exact on the admission date
    pub age: u32,
    pub ssn: SocialSecurityNumber,
    pub mrn: MedicalRecordNumber,
    pub address: PostalAddress,
    pub marital_status: String,
}

impl PatientIdentity {
    /// `Last, First Middle`.
    pub fn full_name(&self) -> String {
        format!("{}, {} {}", self.last_name, self.first_name, self.middle_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Physician {
    /// `Dr. First Last, MD`
    pub name: String,
    pub npi: Npi,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Encounter {
    pub admitted_at: NaiveDateTime,
    pub admission_date: RelativeDate,
    pub admission_type: String,
    pub admission_source: String,
    pub chief_complaint: String,
    pub room: String,
    pub attending: Physician,
    pub referring: Physician,
    pub insurance: InsurancePlan,
}

/// The admitting institution, shown as the letterhead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Institution {
    /// `<SURNAME> MEDICAL CENTER`
    pub name: String,
    pub address: PostalAddress,
    pub phone: String,
    pub fax: String,
}

impl Institution {
    pub fn letterhead(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.address.letterhead_line(),
            format!("Phone: {} | Fax: {}", self.phone, self.fax),
        ]
    }
}

/// A home medication with the patient-reported time of the last dose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomeMedication {
    #[serde(flatten)]
    pub medication: Medication,
    pub last_taken: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticStudies {
    pub ecg: String,
    pub chest_xray: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhysicalExam {
    pub general: String,
    pub heent: String,
    pub cardiovascular: String,
    pub respiratory: String,
    pub abdomen: String,
    pub extremities: String,
    pub neurological: String,
}

impl PhysicalExam {
    /// `(system, finding)` pairs in documentation order.
    pub fn findings(&self) -> [(&'static str, &str); 7] {
        [
            ("General", self.general.as_str()),
            ("HEENT", self.heent.as_str()),
            ("Cardiovascular", self.cardiovascular.as_str()),
            ("Respiratory", self.respiratory.as_str()),
            ("Abdomen", self.abdomen.as_str()),
            ("Extremities", self.extremities.as_str()),
            ("Neurological", self.neurological.as_str()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssessmentPlan {
    pub summary: String,
    pub plan: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmergencyContact {
    pub name: String,
    pub relation: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CodeStatusKind {
    FullCode,
    Dnr,
    DnrDni,
}

impl CodeStatusKind {
    pub const ALL: [CodeStatusKind; 3] = [
        CodeStatusKind::FullCode,
        CodeStatusKind::Dnr,
        CodeStatusKind::DnrDni,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CodeStatusKind::FullCode => "Full Code",
            CodeStatusKind::Dnr => "DNR",
            CodeStatusKind::DnrDni => "DNR/DNI",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeStatus {
    pub status: CodeStatusKind,
    /// Primary emergency contact, `Name (Relation)`
    pub healthcare_proxy: String,
    pub advance_directive: String,
    /// On file unless the patient is full code
    pub polst: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocialHistory {
    pub living_situation: String,
    pub occupation: String,
    pub tobacco: String,
    pub alcohol: String,
    pub recreational_drugs: String,
    pub support_system: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionalStatus {
    pub baseline_adls: String,
    pub mobility: String,
    pub cognition: String,
    pub exercise_tolerance: String,
}

/// CMS Section GG performance codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum GgScore {
    Dependent = 1,
    SubstantialAssistance = 2,
    PartialAssistance = 3,
    Supervision = 4,
    Setup = 5,
    Independent = 6,
}

impl GgScore {
    pub const ALL: [GgScore; 6] = [
        GgScore::Dependent,
        GgScore::SubstantialAssistance,
        GgScore::PartialAssistance,
        GgScore::Supervision,
        GgScore::Setup,
        GgScore::Independent,
    ];

    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> String {
        let text = match self {
            GgScore::Dependent => "Dependent",
            GgScore::SubstantialAssistance => "Substantial/maximal assistance",
            GgScore::PartialAssistance => "Partial/moderate assistance",
            GgScore::Supervision => "Supervision or touching assistance",
            GgScore::Setup => "Setup or clean-up assistance",
            GgScore::Independent => "Independent",
        };
        format!("{:02} {text}", self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GgItem {
    pub activity: String,
    pub admission: GgScore,
    /// Never below the admission score
    pub discharge_goal: GgScore,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionGgAssessment {
    pub assessed: RelativeDate,
    pub items: Vec<GgItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TherapyDiscipline {
    PhysicalTherapy,
    OccupationalTherapy,
    SpeechLanguagePathology,
}

impl TherapyDiscipline {
    pub fn label(&self) -> &'static str {
        match self {
            TherapyDiscipline::PhysicalTherapy => "Physical Therapy",
            TherapyDiscipline::OccupationalTherapy => "Occupational Therapy",
            TherapyDiscipline::SpeechLanguagePathology => "Speech-Language Pathology",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TherapyService {
    pub discipline: TherapyDiscipline,
    pub frequency: String,
    pub goal: String,
}

/// Always documented; the content follows the functional status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferGuidelines {
    pub transfer_method: String,
    pub weight_bearing: String,
    pub precautions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Immunization {
    pub vaccine: String,
    pub given: RelativeDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowUpAppointment {
    pub specialty: String,
    pub provider: String,
    pub scheduled: RelativeDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NutritionOrders {
    pub diet: String,
    pub fluid_restriction: String,
    pub supplement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signature {
    pub signed: RelativeDate,
    /// `HH:MM`
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentMetadata {
    /// `ADM-<mrn digits>-<YYYYMMDDHHMM>`
    pub document_id: String,
    /// Normalised file name, extension included
    pub file_name: String,
    pub output_path: PathBuf,
}

/// A complete admission record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientRecord {
    pub identity: PatientIdentity,
    pub encounter: Encounter,
    pub institution: Institution,
    pub diagnosis: Diagnosis,
    pub medications: Vec<HomeMedication>,
    pub allergies: Vec<Allergy>,
    pub vitals: Vitals,
    pub anthropometrics: Anthropometrics,
    pub labs: LabPanel,
    pub studies: DiagnosticStudies,
    pub exam: PhysicalExam,
    pub assessment: AssessmentPlan,
    pub contacts: [EmergencyContact; 2],
    pub code_status: CodeStatus,
    pub social: SocialHistory,
    pub functional: FunctionalStatus,
    pub section_gg: Option<SectionGgAssessment>,
    pub therapy: Vec<TherapyService>,
    pub flags: ClinicalFlags,
    pub equipment: Vec<String>,
    pub transfer: TransferGuidelines,
    pub immunizations: Vec<Immunization>,
    pub follow_ups: Vec<FollowUpAppointment>,
    pub nutrition: Option<NutritionOrders>,
    pub signature: Signature,
    pub metadata: DocumentMetadata,
}

impl PatientRecord {
    /// Home medications without the last-taken column.
    pub fn medication_list(&self) -> impl Iterator<Item = &Medication> {
        self.medications.iter().map(|m| &m.medication)
    }
}
