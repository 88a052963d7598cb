//! Narrative clinical text: complaints, study findings, exam, history.
//!
//! Short phrase lists combined at random. Study findings, the standing plan and the
//! mobility/transfer pairs come from the catalog's `narrative` pools; the remaining
//! one-line phrases stay inline. Where a finding quotes a vital sign (the ECG rate) the
//! recorded value is interpolated so the document agrees with itself.

use crate::catalog::NarrativePools;
use crate::error::{IntakeError, IntakeResult};
use crate::generators::Vitals;
use crate::profile::Diagnosis;
use crate::record::{
    AssessmentPlan, CodeStatus, CodeStatusKind, DiagnosticStudies, FunctionalStatus, Gender,
    PhysicalExam, SocialHistory, TransferGuidelines,
};
use crate::rng::{pick, pick_str, sample_distinct};
use crate::template::{fill_template, placeholder_count};
use rand::seq::SliceRandom;
use rand::Rng;

pub(crate) const ADMISSION_TYPES: &[&str] = &[
    "Direct Admission",
    "Emergency Department",
    "Transfer from another facility",
    "Elective Admission",
];

pub(crate) const ADMISSION_SOURCES: &[&str] =
    &["Emergency Department", "Direct Admission", "Transfer"];

pub(crate) const CHIEF_COMPLAINTS: &[&str] = &[
    "Chest pain, shortness of breath",
    "Difficulty breathing, fever",
    "Altered mental status",
    "Severe weakness, fever",
    "Abdominal pain, nausea",
    "Fall with injury",
];

pub(crate) const MARITAL_STATUSES: &[&str] = &["Married", "Single", "Widowed", "Divorced"];

pub(crate) const PRIMARY_RELATIONS: &[&str] = &["Spouse", "Daughter", "Son", "Sister", "Brother"];

pub(crate) const SECONDARY_RELATIONS: &[&str] =
    &["Son", "Daughter", "Sister", "Brother", "Niece", "Nephew"];

/// ECG and chest X-ray findings.
pub fn diagnostic_studies<R: Rng + ?Sized>(
    rng: &mut R,
    pools: &NarrativePools,
    vitals: &Vitals,
) -> IntakeResult<DiagnosticStudies> {
    let template = pick(rng, &pools.ecg_findings, "ECG findings")?;
    let rate = vitals.heart_rate.to_string();
    let values: &[String] = if placeholder_count(template) == 0 {
        &[]
    } else {
        std::slice::from_ref(&rate)
    };

    Ok(DiagnosticStudies {
        ecg: fill_template("ECG findings", template, values)?,
        chest_xray: pick(rng, &pools.chest_xray, "chest X-ray findings")?.clone(),
    })
}

pub fn physical_exam<R: Rng + ?Sized>(rng: &mut R) -> PhysicalExam {
    PhysicalExam {
        general: format!(
            "Alert, oriented x4, {}",
            pick_str(
                rng,
                &["in moderate distress", "in no acute distress", "in mild distress", "appears ill"]
            )
        ),
        heent: format!(
            "Normocephalic, atraumatic, PERRLA, mucous membranes {}",
            pick_str(rng, &["moist", "dry"])
        ),
        cardiovascular: format!(
            "{}, {}, peripheral pulses 2+ bilaterally",
            pick_str(rng, &["Tachycardic", "Regular rate and rhythm", "Irregular rhythm"]),
            pick_str(rng, &["no murmurs", "systolic murmur heard", "S3 gallop present"])
        ),
        respiratory: format!(
            "{}, respiratory effort {}",
            pick_str(
                rng,
                &[
                    "Clear to auscultation bilaterally",
                    "Decreased breath sounds bilaterally",
                    "Crackles at bases bilaterally",
                    "Scattered wheezes",
                ]
            ),
            pick_str(rng, &["normal", "labored", "increased"])
        ),
        abdomen: format!(
            "Soft, {}, non-distended, normoactive bowel sounds",
            pick_str(rng, &["non-tender", "tender in RLQ", "diffusely tender"])
        ),
        extremities: format!(
            "{}, no cyanosis, warm and well-perfused",
            pick_str(
                rng,
                &["No edema", "1+ bilateral edema", "2+ bilateral lower extremity edema"]
            )
        ),
        neurological: format!(
            "Grossly intact, moving all extremities, {}",
            pick_str(
                rng,
                &["no focal deficits", "left-sided weakness noted", "right-sided weakness noted"]
            )
        ),
    }
}

/// Summary sentence naming age, gender, complaint and up to three comorbidities.
pub fn assessment_plan(
    age: u32,
    gender: Gender,
    chief_complaint: &str,
    diagnosis: &Diagnosis,
    plan_items: &[String],
) -> AssessmentPlan {
    let comorbidities: Vec<String> = diagnosis
        .secondary
        .iter()
        .take(3)
        .map(|s| s.to_lowercase())
        .collect();
    let summary = format!(
        "{age}-year-old {} presenting with {}. Patient has multiple comorbidities including {}. \
         Will admit for close monitoring and medical management.",
        gender.noun(),
        chief_complaint.to_lowercase(),
        comorbidities.join(", ")
    );
    AssessmentPlan {
        summary,
        plan: plan_items.to_vec(),
    }
}

/// Code status with the POLST on file for anyone who is not full code.
pub fn code_status<R: Rng + ?Sized>(rng: &mut R, healthcare_proxy: String) -> CodeStatus {
    let status = *CodeStatusKind::ALL
        .choose(rng)
        .unwrap_or(&CodeStatusKind::FullCode);
    let advance_directive = if rng.gen_bool(0.5) {
        "On file"
    } else {
        "Verbal discussion completed"
    };
    let polst = match status {
        CodeStatusKind::FullCode => "Not applicable at this time",
        CodeStatusKind::Dnr | CodeStatusKind::DnrDni => "On file",
    };
    CodeStatus {
        status,
        healthcare_proxy,
        advance_directive: advance_directive.to_owned(),
        polst: polst.to_owned(),
    }
}

pub fn social_history<R: Rng + ?Sized>(rng: &mut R) -> SocialHistory {
    let living_situation = pick_str(
        rng,
        &[
            "Lives alone in single-story home",
            "Lives with spouse in two-story home",
            "Lives with family members",
            "Lives in assisted living facility",
            "Lives with daughter",
        ],
    );
    let occupation = pick_str(
        rng,
        &[
            "Retired teacher",
            "Retired electrician",
            "Retired nurse",
            "Retired accountant",
            "Retired factory worker",
            "Retired construction worker",
        ],
    );
    let tobacco = match rng.gen_range(0..3) {
        0 => format!(
            "Former smoker, {} pack-year history, quit {} years ago",
            rng.gen_range(15..=40),
            rng.gen_range(1..=15)
        ),
        1 => "Current smoker, 1 pack per day".to_owned(),
        _ => "Never smoker".to_owned(),
    };
    let alcohol = pick_str(
        rng,
        &[
            "Social drinker, 2-3 drinks per week",
            "Denies alcohol use",
            "Occasional drinker, less than 1 drink per week",
        ],
    );
    let support_system = pick_str(
        rng,
        &[
            "Family nearby and involved",
            "Limited support system",
            "Strong family support",
            "Lives independently with minimal support",
        ],
    );
    SocialHistory {
        living_situation,
        occupation,
        tobacco,
        alcohol,
        recreational_drugs: "Denies".to_owned(),
        support_system,
    }
}

pub fn functional_status<R: Rng + ?Sized>(
    rng: &mut R,
    pools: &NarrativePools,
) -> IntakeResult<FunctionalStatus> {
    let mobility = pick(rng, &pools.mobility, "mobility profiles")?.status.clone();
    Ok(FunctionalStatus {
        baseline_adls: pick_str(
            rng,
            &[
                "Independent with all activities of daily living",
                "Requires assistance with bathing and dressing",
                "Independent with minimal assistance",
            ],
        ),
        mobility,
        cognition: pick_str(
            rng,
            &[
                "Alert and oriented, manages own medications and finances",
                "Mild cognitive impairment",
                "Early dementia, requires assistance with complex tasks",
            ],
        ),
        exercise_tolerance: pick_str(
            rng,
            &[
                "Good baseline",
                "Decreased over past months",
                "Limited due to shortness of breath",
                "Sedentary lifestyle",
            ],
        ),
    })
}

/// Transfer method follows the documented mobility.
///
/// # Errors
///
/// Returns `IntakeError::InvalidCatalog` if the mobility has no catalog entry, or
/// `SamplingExhaustion` if the precaution pool is too small.
pub fn transfer_guidelines<R: Rng + ?Sized>(
    rng: &mut R,
    pools: &NarrativePools,
    functional: &FunctionalStatus,
) -> IntakeResult<TransferGuidelines> {
    let profile = pools
        .mobility
        .iter()
        .find(|m| m.status == functional.mobility)
        .ok_or_else(|| {
            IntakeError::InvalidCatalog(format!(
                "no transfer method for mobility '{}'",
                functional.mobility
            ))
        })?;

    let count = pools.precautions.count.sample(rng);
    let mut precautions = vec![pools.standing_precaution.clone()];
    precautions.extend(sample_distinct(
        rng,
        &pools.precautions.entries,
        count,
        "transfer precautions",
    )?);

    Ok(TransferGuidelines {
        transfer_method: profile.transfer.clone(),
        weight_bearing: pick(rng, &pools.weight_bearing, "weight bearing")?.clone(),
        precautions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::generators::Vitals;
    use crate::profile::DiagnosisKind;
    use crate::rng::make_rng;

    fn pools() -> NarrativePools {
        Catalog::builtin().unwrap().narrative
    }

    #[test]
    fn test_ecg_quotes_recorded_heart_rate() {
        let pools = pools();
        for seed in 0..50 {
            let mut rng = make_rng(seed, "ecg");
            let vitals = Vitals::generate(&mut rng);
            let studies = diagnostic_studies(&mut rng, &pools, &vitals).unwrap();
            assert!(!studies.ecg.contains("{}"));
            if studies.ecg.contains("bpm") {
                assert!(studies.ecg.contains(&vitals.heart_rate.to_string()));
            }
            assert!(pools.chest_xray.contains(&studies.chest_xray));
        }
    }

    #[test]
    fn test_polst_rule() {
        for seed in 0..100 {
            let mut rng = make_rng(seed, "code");
            let code = code_status(&mut rng, "Ann Lee (Spouse)".into());
            match code.status {
                CodeStatusKind::FullCode => assert_eq!(code.polst, "Not applicable at this time"),
                _ => assert_eq!(code.polst, "On file"),
            }
        }
    }

    #[test]
    fn test_assessment_names_three_comorbidities() {
        let diagnosis = Diagnosis {
            kind: DiagnosisKind::Neuro,
            primary: "Stroke".into(),
            secondary: vec!["A".into(), "B".into(), "C".into(), "D".into()],
        };
        let pools = pools();
        let plan = assessment_plan(
            72,
            Gender::Female,
            "Fall with injury",
            &diagnosis,
            &pools.plan_items,
        );
        assert!(plan
            .summary
            .starts_with("72-year-old female presenting with fall with injury."));
        assert!(plan.summary.contains("including a, b, c."));
        assert_eq!(plan.plan, pools.plan_items);
    }

    #[test]
    fn test_transfer_follows_mobility() {
        let pools = pools();
        let mut rng = make_rng(2, "transfer");
        let mut functional = functional_status(&mut rng, &pools).unwrap();
        functional.mobility = "Wheelchair dependent".into();
        let transfer = transfer_guidelines(&mut rng, &pools, &functional).unwrap();
        assert!(transfer.transfer_method.contains("mechanical lift"));
        assert_eq!(transfer.precautions[0], "Fall precautions");
        assert!((2..=3).contains(&transfer.precautions.len()));
    }

    #[test]
    fn test_every_mobility_has_a_transfer_method() {
        let pools = pools();
        for seed in 0..40 {
            let mut rng = make_rng(seed, "mobility");
            let functional = functional_status(&mut rng, &pools).unwrap();
            let transfer = transfer_guidelines(&mut rng, &pools, &functional).unwrap();
            let expected = pools
                .mobility
                .iter()
                .find(|m| m.status == functional.mobility)
                .unwrap();
            assert_eq!(transfer.transfer_method, expected.transfer);
        }
    }

    #[test]
    fn test_unknown_mobility_is_catalog_error() {
        let pools = pools();
        let mut rng = make_rng(3, "transfer");
        let mut functional = functional_status(&mut rng, &pools).unwrap();
        functional.mobility = "Hovercraft".into();
        assert!(matches!(
            transfer_guidelines(&mut rng, &pools, &functional),
            Err(IntakeError::InvalidCatalog(_))
        ));
    }
}
