//! Admission document rendering.
//!
//! Turns a record and its selected sections into layout-neutral [`Section`] descriptors.
//! Nothing here decides inclusion; [`select_sections`] has already done that.

use crate::constants::{ADMISSION_TITLE, TIME_FORMAT};
use crate::dates::format_date;
use crate::flags::FlagTier;
use crate::generators::round_to;
use crate::record::PatientRecord;
use crate::sections::{select_sections, SectionKind};
use intake_types::{Block, Document, Inline, ParagraphStyle, Section, Table};

/// Renders the full admission document.
pub fn render_admission(record: &PatientRecord) -> Document {
    let sections = select_sections(record)
        .into_iter()
        .map(|kind| render_section(record, kind))
        .collect();
    Document {
        title: ADMISSION_TITLE.to_owned(),
        letterhead: record.institution.letterhead(),
        sections,
    }
}

/// Renders one section.
pub fn render_section(record: &PatientRecord, kind: SectionKind) -> Section {
    let section = Section::new(kind.key(), kind.heading());
    match kind {
        SectionKind::Demographics => demographics(record, section),
        SectionKind::AdmissionInfo => admission_info(record, section),
        SectionKind::Diagnoses => diagnoses(record, section),
        SectionKind::AllergiesAlert => allergies(record, section),
        SectionKind::Vitals => vitals(record, section),
        SectionKind::Medications => medications(record, section),
        SectionKind::Labs => labs(record, section),
        SectionKind::DiagnosticStudies => diagnostic_studies(record, section),
        SectionKind::PhysicalExam => physical_exam(record, section),
        SectionKind::AssessmentPlan => assessment_plan(record, section),
        SectionKind::EmergencyContacts => emergency_contacts(record, section),
        SectionKind::CodeStatus => code_status(record, section),
        SectionKind::SocialHistory => social_history(record, section),
        SectionKind::FunctionalStatus => functional_status(record, section),
        SectionKind::SectionGg => section_gg(record, section),
        SectionKind::TherapyServices => therapy_services(record, section),
        SectionKind::ClinicalFlags => clinical_flags(record, section),
        SectionKind::EquipmentNeeds => equipment_needs(record, section),
        SectionKind::TransferGuidelines => transfer_guidelines(record, section),
        SectionKind::Immunizations => immunizations(record, section),
        SectionKind::FollowUpAppointments => follow_ups(record, section),
        SectionKind::Nutrition => nutrition(record, section),
        SectionKind::Signature => signature(record, section),
        SectionKind::Footer => footer(record, section),
    }
}

/// Four-column label/value grid.
fn grid() -> Table {
    Table::new(&[1.5, 2.0, 1.5, 2.0]).labels(&[0, 2])
}

fn demographics(record: &PatientRecord, section: Section) -> Section {
    let id = &record.identity;
    let enc = &record.encounter;
    let secondary = enc.insurance.secondary.as_deref().unwrap_or("None");
    section.with(Block::Table(
        grid()
            .row([
                "Patient Name:".to_owned(),
                id.full_name(),
                "Date of Birth:".to_owned(),
                format!("{} ({} years)", format_date(id.date_of_birth), id.age),
            ])
            .row([
                "Medical Record #:".to_owned(),
                id.mrn.to_string(),
                "Gender:".to_owned(),
                id.gender.label().to_owned(),
            ])
            .row([
                "Admission Date:".to_owned(),
                enc.admission_date.to_string(),
                "Admission Time:".to_owned(),
                enc.admitted_at.format(TIME_FORMAT).to_string(),
            ])
            .row([
                "Primary Insurance:",
                enc.insurance.primary.as_str(),
                "Secondary Insurance:",
                secondary,
            ])
            .row([
                "Social Security #:".to_owned(),
                id.ssn.to_string(),
                "Marital Status:".to_owned(),
                id.marital_status.clone(),
            ])
            .row([
                "Address:".to_owned(),
                id.address.to_string(),
                String::new(),
                String::new(),
            ]),
    ))
}

fn admission_info(record: &PatientRecord, section: Section) -> Section {
    let enc = &record.encounter;
    section.with(Block::Table(
        grid()
            .row([
                "Admission Type:",
                enc.admission_type.as_str(),
                "Attending Physician:",
                enc.attending.name.as_str(),
            ])
            .row([
                "Admission Source:",
                enc.admission_source.as_str(),
                "Referring Physician:",
                enc.referring.name.as_str(),
            ])
            .row([
                "Chief Complaint:",
                enc.chief_complaint.as_str(),
                "Room Assignment:",
                enc.room.as_str(),
            ]),
    ))
}

fn bullets<S: AsRef<str>>(items: &[S]) -> Block {
    Block::Bullets {
        items: items
            .iter()
            .map(|s| vec![Inline::text(s.as_ref())])
            .collect(),
    }
}

fn diagnoses(record: &PatientRecord, section: Section) -> Section {
    section
        .with(Block::subheading("Primary Diagnosis:"))
        .with(bullets(&[record.diagnosis.primary.as_str()]))
        .with(Block::subheading("Secondary Diagnoses:"))
        .with(bullets(&record.diagnosis.secondary))
}

fn allergies(record: &PatientRecord, section: Section) -> Section {
    let mut runs = vec![Inline::bold("ALLERGIES:")];
    for allergy in &record.allergies {
        runs.push(Inline::LineBreak);
        runs.push(Inline::text(format!(
            "- {} -> {}",
            allergy.allergen, allergy.reaction
        )));
    }
    section.with(Block::styled(ParagraphStyle::Alert, runs))
}

fn vitals(record: &PatientRecord, section: Section) -> Section {
    let v = &record.vitals;
    let body = &record.anthropometrics;
    section
        .with(Block::Table(
            Table::new(&[1.2, 1.0, 1.2, 1.0, 1.2, 1.4])
                .header(["BP", "HR", "Temp (F)", "RR", "SpO2", "Pain Level"])
                .row([
                    v.blood_pressure(),
                    v.heart_rate.to_string(),
                    format!("{:.1}", v.temperature_f),
                    v.respiratory_rate.to_string(),
                    format!("{}% {}", v.spo2, v.oxygen_delivery.label()),
                    format!("{}/10", v.pain),
                ]),
        ))
        .with(Block::styled(
            ParagraphStyle::Small,
            vec![Inline::italic(format!(
                "Weight: {} lbs ({:.1} kg) | Height: {} ({:.1} cm) | BMI: {:.1}",
                body.weight_lb,
                body.weight_kg,
                body.height_feet_inches(),
                body.height_cm,
                round_to(body.bmi(), 1)
            ))],
        ))
}

fn medications(record: &PatientRecord, section: Section) -> Section {
    let mut table = Table::new(&[1.5, 1.0, 0.8, 1.2, 1.8])
        .header(["Medication", "Dose", "Route", "Frequency", "Last Taken"]);
    for home in &record.medications {
        let m = &home.medication;
        table = table.row([
            m.name.as_str(),
            m.dose.as_str(),
            m.route.as_str(),
            m.frequency.as_str(),
            home.last_taken.as_str(),
        ]);
    }
    // Labs start the second page.
    section.with(Block::Table(table)).with(Block::PageBreak)
}

fn labs(record: &PatientRecord, mut section: Section) -> Section {
    let cbc = &record.labs.cbc;
    let bmp = &record.labs.bmp;
    section.push(Block::subheading("Complete Blood Count:"));
    section.push(Block::paragraph(vec![Inline::text(format!(
        "WBC: {:.1} K/uL | Hgb: {:.1} g/dL | Hct: {:.1}% | Platelets: {} K/uL",
        cbc.wbc, cbc.hemoglobin, cbc.hematocrit, cbc.platelets
    ))]));
    section.push(Block::subheading("Basic Metabolic Panel:"));
    section.push(Block::paragraph(vec![
        Inline::text(format!(
            "Na: {} mEq/L | K: {:.1} mEq/L | Cl: {} mEq/L | CO2: {} mEq/L",
            bmp.sodium, bmp.potassium, bmp.chloride, bmp.co2
        )),
        Inline::LineBreak,
        Inline::text(format!(
            "BUN: {} mg/dL | Creatinine: {:.1} mg/dL | Glucose: {} mg/dL | eGFR: {} mL/min",
            bmp.bun, bmp.creatinine, bmp.glucose, bmp.egfr
        )),
    ]));

    if let Some(cardiac) = &record.labs.cardiac {
        section.push(Block::subheading("Cardiac Markers:"));
        section.push(Block::paragraph(vec![Inline::text(format!(
            "Troponin I: {:.2} ng/mL (elevated) | CK-MB: {:.1} ng/mL | BNP: {} pg/mL",
            cardiac.troponin_i, cardiac.ck_mb, cardiac.bnp
        ))]));
    }
    if let Some(lipids) = &record.labs.lipids {
        section.push(Block::subheading("Lipid Panel:"));
        section.push(Block::paragraph(vec![Inline::text(format!(
            "Total Cholesterol: {} mg/dL | LDL: {} mg/dL | HDL: {} mg/dL | Triglycerides: {} mg/dL",
            lipids.total_cholesterol, lipids.ldl, lipids.hdl, lipids.triglycerides
        ))]));
    }
    section
}

fn diagnostic_studies(record: &PatientRecord, section: Section) -> Section {
    section
        .with(Block::subheading("ECG Findings:"))
        .with(Block::paragraph(vec![Inline::text(&record.studies.ecg)]))
        .with(Block::subheading("Chest X-Ray:"))
        .with(Block::paragraph(vec![Inline::text(
            &record.studies.chest_xray,
        )]))
}

fn physical_exam(record: &PatientRecord, mut section: Section) -> Section {
    for (system, finding) in record.exam.findings() {
        section.push(Block::paragraph(vec![
            Inline::bold(format!("{system}:")),
            Inline::text(format!(" {finding}")),
        ]));
    }
    section
}

fn assessment_plan(record: &PatientRecord, section: Section) -> Section {
    section
        .with(Block::paragraph(vec![Inline::text(
            &record.assessment.summary,
        )]))
        .with(Block::paragraph(vec![Inline::bold("Plan:")]))
        .with(bullets(&record.assessment.plan))
}

fn emergency_contacts(record: &PatientRecord, section: Section) -> Section {
    let [first, second] = &record.contacts;
    section.with(Block::Table(
        Table::new(&[3.5, 3.5])
            .header(["Primary Contact:", "Secondary Contact:"])
            .row([
                format!("{} ({})", first.name, first.relation),
                format!("{} ({})", second.name, second.relation),
            ])
            .row([
                format!("Phone: {}", first.phone),
                format!("Phone: {}", second.phone),
            ])
            .row([
                format!("Email: {}", first.email),
                format!("Email: {}", second.email),
            ])
            .row([
                format!("Relationship: {}", first.relation),
                format!("Relationship: {}", second.relation),
            ]),
    ))
}

fn code_status(record: &PatientRecord, section: Section) -> Section {
    let code = &record.code_status;
    section.with(Block::labelled_bullets([
        ("Code Status", code.status.label()),
        ("Healthcare Proxy", code.healthcare_proxy.as_str()),
        ("Advance Directive", code.advance_directive.as_str()),
        ("POLST", code.polst.as_str()),
    ]))
}

fn social_history(record: &PatientRecord, section: Section) -> Section {
    let s = &record.social;
    section.with(Block::labelled_bullets([
        ("Living Situation", s.living_situation.as_str()),
        ("Occupation", s.occupation.as_str()),
        ("Tobacco", s.tobacco.as_str()),
        ("Alcohol", s.alcohol.as_str()),
        ("Recreational Drugs", s.recreational_drugs.as_str()),
        ("Support System", s.support_system.as_str()),
    ]))
}

fn functional_status(record: &PatientRecord, section: Section) -> Section {
    let f = &record.functional;
    section.with(Block::labelled_bullets([
        ("Baseline ADLs", f.baseline_adls.as_str()),
        ("Mobility", f.mobility.as_str()),
        ("Cognition", f.cognition.as_str()),
        ("Exercise Tolerance", f.exercise_tolerance.as_str()),
    ]))
}

fn section_gg(record: &PatientRecord, section: Section) -> Section {
    let Some(gg) = &record.section_gg else {
        return section;
    };
    let mut table =
        Table::new(&[2.4, 2.3, 2.3]).header(["Activity", "Admission Performance", "Discharge Goal"]);
    for item in &gg.items {
        table = table.row([
            item.activity.clone(),
            item.admission.label(),
            item.discharge_goal.label(),
        ]);
    }
    section
        .with(Block::paragraph(vec![
            Inline::bold("Assessed:"),
            Inline::text(format!(" {}", gg.assessed)),
        ]))
        .with(Block::Table(table))
}

fn therapy_services(record: &PatientRecord, section: Section) -> Section {
    let mut table = Table::new(&[2.0, 1.2, 3.8]).header(["Discipline", "Frequency", "Focus"]);
    for service in &record.therapy {
        table = table.row([
            service.discipline.label(),
            service.frequency.as_str(),
            service.goal.as_str(),
        ]);
    }
    section.with(Block::Table(table))
}

/// Critical flags first, then elevated, then routine.
fn clinical_flags(record: &PatientRecord, mut section: Section) -> Section {
    for tier in FlagTier::BY_PRIORITY {
        let flags = record.flags.tier(tier);
        if flags.is_empty() {
            continue;
        }
        let items = flags
            .iter()
            .map(|flag| {
                vec![
                    Inline::bold(format!("[{}] {}:", tier.heading(), flag.name)),
                    Inline::text(format!(" {}", flag.detail)),
                ]
            })
            .collect();
        let block = Block::Bullets { items };
        if tier == FlagTier::Critical {
            section.push(Block::styled(
                ParagraphStyle::Alert,
                vec![Inline::bold("CRITICAL CARE ALERTS")],
            ));
        }
        section.push(block);
    }
    section
}

fn equipment_needs(record: &PatientRecord, section: Section) -> Section {
    section.with(bullets(&record.equipment))
}

fn transfer_guidelines(record: &PatientRecord, section: Section) -> Section {
    let t = &record.transfer;
    section.with(Block::labelled_bullets([
        ("Transfer Method", t.transfer_method.clone()),
        ("Weight Bearing", t.weight_bearing.clone()),
        ("Precautions", t.precautions.join("; ")),
    ]))
}

fn immunizations(record: &PatientRecord, section: Section) -> Section {
    let mut table = Table::new(&[3.5, 3.5]).header(["Vaccine", "Date Given"]);
    for immunization in &record.immunizations {
        table = table.row([immunization.vaccine.clone(), immunization.given.to_string()]);
    }
    section.with(Block::Table(table))
}

fn follow_ups(record: &PatientRecord, section: Section) -> Section {
    let mut table = Table::new(&[2.0, 2.5, 2.5]).header(["Specialty", "Provider", "Date"]);
    for appointment in &record.follow_ups {
        table = table.row([
            appointment.specialty.clone(),
            appointment.provider.clone(),
            appointment.scheduled.to_string(),
        ]);
    }
    section.with(Block::Table(table))
}

fn nutrition(record: &PatientRecord, section: Section) -> Section {
    let Some(orders) = &record.nutrition else {
        return section;
    };
    section.with(Block::labelled_bullets([
        ("Diet", orders.diet.as_str()),
        ("Fluid Restriction", orders.fluid_restriction.as_str()),
        ("Supplement", orders.supplement.as_str()),
    ]))
}

fn signature(record: &PatientRecord, section: Section) -> Section {
    let attending = &record.encounter.attending;
    section.with(Block::Rule).with(Block::paragraph(vec![
        Inline::bold(format!("{}, FACC", attending.name)),
        Inline::LineBreak,
        Inline::text("Attending Physician"),
        Inline::LineBreak,
        Inline::text(format!(
            "Date: {} | Time: {}",
            record.signature.signed, record.signature.time
        )),
        Inline::LineBreak,
        Inline::text(format!("NPI: {}", attending.npi)),
    ]))
}

fn footer(record: &PatientRecord, section: Section) -> Section {
    section.with(Block::styled(
        ParagraphStyle::Centered,
        vec![
            Inline::text("This document contains confidential patient information protected under HIPAA."),
            Inline::LineBreak,
            Inline::text(format!(
                "For questions regarding this admission, please contact the admitting physician or case management at {}.",
                record.institution.phone
            )),
            Inline::LineBreak,
            Inline::text(format!("Document ID: {}", record.metadata.document_id)),
        ],
    ))
}
