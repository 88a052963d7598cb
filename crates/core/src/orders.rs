//! Medication-order sheets.
//!
//! A second, shorter document type issued by a physician office or pharmacy: current
//! maintenance medications with refills, new orders, and optionally medications that were
//! stopped. It shares the identity provider, catalog and layout pipeline with admissions.

use crate::catalog::Catalog;
use crate::config::CoreConfig;
use crate::constants::{DOCUMENT_ID_TIMESTAMP_FORMAT, MEDICATION_ORDERS_TITLE, TIME_FORMAT};
use crate::dates::RelativeDate;
use crate::error::IntakeResult;
use crate::generators::Npi;
use crate::identity::IdentityProvider;
use crate::record::{DocumentMetadata, Physician, Signature};
use crate::rng::{draw, pick, sample_distinct};
use crate::validation::{orders_file_stem, resolve_file_name, sequenced_stem};
use chrono::NaiveDateTime;
use intake_types::{Block, Document, Inline, ParagraphStyle, Section, Table};
use rand::{Rng, RngCore};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderedMedication {
    pub name: String,
    pub strength: String,
    pub form: String,
    pub instructions: String,
    pub indication: String,
    pub refills: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscontinuedMedication {
    pub name: String,
    pub strength: String,
    pub form: String,
    pub reason: String,
}

/// One medication-order sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicationOrderRecord {
    pub prescriber: Physician,
    /// Physician office or pharmacy issuing the sheet
    pub institution: String,
    pub prescribed: RelativeDate,
    pub current: Vec<OrderedMedication>,
    pub new_orders: Vec<OrderedMedication>,
    /// Empty when no medications were stopped
    pub discontinued: Vec<DiscontinuedMedication>,
    pub signature: Signature,
    pub metadata: DocumentMetadata,
}

/// Builds medication-order records.
pub struct OrderAssembler<'a> {
    catalog: &'a Catalog,
    identity: &'a dyn IdentityProvider,
    cfg: &'a CoreConfig,
    sequence: usize,
}

impl<'a> OrderAssembler<'a> {
    pub fn new(
        catalog: &'a Catalog,
        identity: &'a dyn IdentityProvider,
        cfg: &'a CoreConfig,
    ) -> Self {
        Self {
            catalog,
            identity,
            cfg,
            sequence: 0,
        }
    }

    /// Sets the sheet's position within a batch; default file names carry it.
    pub fn with_sequence(mut self, index: usize) -> Self {
        self.sequence = index;
        self
    }

    /// Assembles one order sheet.
    ///
    /// # Errors
    ///
    /// Returns an `IntakeError` if an order pool cannot satisfy its draw or the file name
    /// is unusable.
    pub fn assemble(
        &self,
        rng: &mut dyn RngCore,
        now: NaiveDateTime,
        file_name: Option<&str>,
    ) -> IntakeResult<MedicationOrderRecord> {
        let orders = &self.catalog.medication_orders;

        let prescriber = Physician {
            name: format!("Dr. {}, MD", self.identity.full_name(rng)),
            npi: Npi::generate(rng),
        };
        let institution = if rng.gen_bool(0.5) {
            pick(rng, &orders.physician_offices, "physician offices")?.clone()
        } else {
            pick(rng, &orders.pharmacies, "pharmacies")?.clone()
        };

        let count = orders.current.count.sample(rng);
        let mut current = Vec::with_capacity(count);
        for entry in sample_distinct(rng, &orders.current.entries, count, "current orders")? {
            current.push(OrderedMedication {
                refills: orders.current.refills.sample(rng),
                name: entry.name,
                strength: entry.strength,
                form: entry.form,
                instructions: entry.instructions,
                indication: entry.indication,
            });
        }

        let count = orders.new.count.sample(rng);
        let mut new_orders = Vec::with_capacity(count);
        for entry in sample_distinct(rng, &orders.new.entries, count, "new orders")? {
            new_orders.push(OrderedMedication {
                refills: entry.refills.sample(rng),
                name: entry.name,
                strength: entry.strength,
                form: entry.form,
                instructions: entry.instructions,
                indication: entry.indication,
            });
        }

        let discontinued = if draw(rng, self.cfg.section_odds().discontinued_orders) {
            let pool = &orders.discontinued;
            let count = pool.count.sample(rng);
            sample_distinct(rng, &pool.entries, count, "discontinued orders")?
                .into_iter()
                .map(|entry| DiscontinuedMedication {
                    name: entry.name,
                    strength: entry.strength,
                    form: entry.form,
                    reason: entry.reason,
                })
                .collect()
        } else {
            Vec::new()
        };

        let document_id = format!(
            "MED-{}-{}",
            rng.gen_range(100_000..=999_999u32),
            now.format(DOCUMENT_ID_TIMESTAMP_FORMAT)
        );
        let file_name = resolve_file_name(
            file_name,
            &sequenced_stem(&orders_file_stem(&institution), self.sequence),
            self.cfg.output_format(),
        )?;
        let metadata = DocumentMetadata {
            document_id,
            output_path: self.cfg.output_dir().join(file_name.as_str()),
            file_name: file_name.as_str().to_owned(),
        };

        tracing::debug!(
            document_id = %metadata.document_id,
            current = current.len(),
            new_orders = new_orders.len(),
            discontinued = discontinued.len(),
            "assembled medication orders"
        );

        Ok(MedicationOrderRecord {
            prescriber,
            institution,
            prescribed: RelativeDate::today(now),
            current,
            new_orders,
            discontinued,
            signature: Signature {
                signed: RelativeDate::today(now),
                time: now.format(TIME_FORMAT).to_string(),
            },
            metadata,
        })
    }
}

/// Sections of an order sheet, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSectionKind {
    CurrentMedications,
    NewOrders,
    Discontinued,
    Signature,
    Footer,
}

impl OrderSectionKind {
    pub const ALL: [OrderSectionKind; 5] = [
        OrderSectionKind::CurrentMedications,
        OrderSectionKind::NewOrders,
        OrderSectionKind::Discontinued,
        OrderSectionKind::Signature,
        OrderSectionKind::Footer,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            OrderSectionKind::CurrentMedications => "current_medications",
            OrderSectionKind::NewOrders => "new_orders",
            OrderSectionKind::Discontinued => "discontinued",
            OrderSectionKind::Signature => "signature",
            OrderSectionKind::Footer => "footer",
        }
    }

    pub fn heading(&self) -> Option<&'static str> {
        match self {
            OrderSectionKind::CurrentMedications => Some("CURRENT MEDICATIONS"),
            OrderSectionKind::NewOrders => Some("NEW MEDICATION ORDERS"),
            OrderSectionKind::Discontinued => Some("DISCONTINUED MEDICATIONS"),
            OrderSectionKind::Signature | OrderSectionKind::Footer => None,
        }
    }

    pub fn is_present(&self, record: &MedicationOrderRecord) -> bool {
        match self {
            OrderSectionKind::Discontinued => !record.discontinued.is_empty(),
            _ => true,
        }
    }
}

pub fn select_order_sections(record: &MedicationOrderRecord) -> Vec<OrderSectionKind> {
    OrderSectionKind::ALL
        .into_iter()
        .filter(|kind| kind.is_present(record))
        .collect()
}

/// Renders an order sheet.
pub fn render_orders(record: &MedicationOrderRecord) -> Document {
    let mut letterhead = vec![record.institution.clone()];
    letterhead.push(format!("Date Prescribed: {}", record.prescribed));

    let sections = select_order_sections(record)
        .into_iter()
        .map(|kind| {
            let section = Section::new(kind.key(), kind.heading());
            match kind {
                OrderSectionKind::CurrentMedications => {
                    section.with(Block::Table(order_table(&record.current)))
                }
                OrderSectionKind::NewOrders => {
                    section.with(Block::Table(order_table(&record.new_orders)))
                }
                OrderSectionKind::Discontinued => {
                    let mut table = Table::new(&[1.8, 1.0, 1.0, 3.2])
                        .header(["Medication", "Strength", "Form", "Reason"]);
                    for med in &record.discontinued {
                        table = table.row([
                            med.name.as_str(),
                            med.strength.as_str(),
                            med.form.as_str(),
                            med.reason.as_str(),
                        ]);
                    }
                    section.with(Block::Table(table))
                }
                OrderSectionKind::Signature => section.with(Block::Rule).with(Block::paragraph(vec![
                    Inline::bold(record.prescriber.name.as_str()),
                    Inline::LineBreak,
                    Inline::text(format!("NPI: {}", record.prescriber.npi)),
                    Inline::LineBreak,
                    Inline::text(format!(
                        "Date: {} | Time: {}",
                        record.signature.signed, record.signature.time
                    )),
                ])),
                OrderSectionKind::Footer => section.with(Block::styled(
                    ParagraphStyle::Centered,
                    vec![
                        Inline::text("Prescriptions are valid for one year from the date prescribed unless noted otherwise."),
                        Inline::LineBreak,
                        Inline::text(format!("Document ID: {}", record.metadata.document_id)),
                    ],
                )),
            }
        })
        .collect();

    Document {
        title: MEDICATION_ORDERS_TITLE.to_owned(),
        letterhead,
        sections,
    }
}

fn order_table(medications: &[OrderedMedication]) -> Table {
    let mut table = Table::new(&[1.4, 0.8, 0.8, 2.4, 1.2, 0.6])
        .header(["Medication", "Strength", "Form", "Instructions", "Indication", "Refills"]);
    for med in medications {
        table = table.row([
            med.name.clone(),
            med.strength.clone(),
            med.form.clone(),
            med.instructions.clone(),
            med.indication.clone(),
            med.refills.to_string(),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SectionOdds;
    use crate::identity::FakeIdentityProvider;
    use crate::rng::make_rng;
    use chrono::NaiveDate;
    use intake_layout::OutputFormat;
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap()
    }

    fn assemble(cfg: &CoreConfig, seed: u64) -> MedicationOrderRecord {
        let catalog = Catalog::builtin().unwrap();
        let identity = FakeIdentityProvider;
        OrderAssembler::new(&catalog, &identity, cfg)
            .assemble(&mut make_rng(seed, "orders"), now(), None)
            .unwrap()
    }

    fn cfg() -> CoreConfig {
        CoreConfig::new(PathBuf::from("out")).unwrap()
    }

    #[test]
    fn test_counts_and_refills_within_ranges() {
        let catalog = Catalog::builtin().unwrap();
        let cfg = cfg();
        for seed in 0..100 {
            let record = assemble(&cfg, seed);
            assert!((3..=6).contains(&record.current.len()));
            assert!((2..=4).contains(&record.new_orders.len()));
            assert!(record.discontinued.len() <= 2);
            for med in &record.current {
                assert!((3..=11).contains(&med.refills));
            }
            for med in &record.new_orders {
                let entry = catalog
                    .medication_orders
                    .new
                    .entries
                    .iter()
                    .find(|e| e.name == med.name)
                    .unwrap();
                assert!((entry.refills.min..=entry.refills.max).contains(&med.refills));
            }
        }
    }

    #[test]
    fn test_new_orders_are_distinct() {
        let cfg = cfg();
        for seed in 0..50 {
            let record = assemble(&cfg, seed);
            let names: HashSet<_> = record.new_orders.iter().map(|m| &m.name).collect();
            assert_eq!(names.len(), record.new_orders.len());
        }
    }

    #[test]
    fn test_institution_comes_from_catalog() {
        let catalog = Catalog::builtin().unwrap();
        let orders = &catalog.medication_orders;
        let cfg = cfg();
        for seed in 0..50 {
            let record = assemble(&cfg, seed);
            assert!(
                orders.physician_offices.contains(&record.institution)
                    || orders.pharmacies.contains(&record.institution)
            );
        }
    }

    #[test]
    fn test_document_id_and_default_file_name() {
        let cfg = cfg().with_output_format(OutputFormat::Markdown);
        let record = assemble(&cfg, 3);
        let id = &record.metadata.document_id;
        assert!(id.starts_with("MED-"));
        assert!(id.ends_with("-202610160905"));
        assert_eq!(id.len(), "MED-123456-202610160905".len());

        let first_word = record.institution.split_whitespace().next().unwrap();
        assert!(record
            .metadata
            .file_name
            .starts_with(&format!("{first_word}-new-meds")));
        assert!(record.metadata.file_name.ends_with(".md"));
    }

    #[test]
    fn test_discontinued_section_follows_odds() {
        let always = cfg().with_section_odds(SectionOdds::all());
        let never = cfg().with_section_odds(SectionOdds::none());
        for seed in 0..20 {
            let with = render_orders(&assemble(&always, seed));
            assert!(with.section("discontinued").is_some());

            let without = render_orders(&assemble(&never, seed));
            assert_eq!(
                without.section_keys(),
                vec!["current_medications", "new_orders", "signature", "footer"]
            );
        }
    }

    #[test]
    fn test_render_lists_every_medication() {
        let record = assemble(&cfg(), 11);
        let document = render_orders(&record);
        assert_eq!(document.title, MEDICATION_ORDERS_TITLE);
        assert_eq!(document.letterhead[0], record.institution);
        let text = document.plain_text();
        for med in record.current.iter().chain(&record.new_orders) {
            assert!(text.contains(&med.name));
        }
        assert!(text.contains(&format!("NPI: {}", record.prescriber.npi)));
    }
}
