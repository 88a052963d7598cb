//! # Intake Core
//!
//! Core logic for synthesising realistic clinical intake documents.
//!
//! This crate contains the pure generation pipeline:
//! - A validated [`Catalog`] of diagnosis bundles, medication pools and flag templates
//! - Field generators and narrative phrases driven by an explicit random source
//! - Record assembly ([`RecordAssembler`], [`OrderAssembler`]) into complete, internally
//!   consistent records
//! - Section selection and rendering into layout-neutral [`intake_types::Document`]s
//! - [`IntakeService`], which renders through the configured layout engine and writes the
//!   result into the output directory
//!
//! **No CLI concerns**: argument parsing and logging setup belong in `intake-cli`.
//!
//! All randomness flows through a `&mut dyn RngCore` parameter. With a seed configured,
//! each document gets its own generator derived from `(seed, document key)`, so output is
//! reproducible byte for byte apart from the write timestamp.

pub mod assembler;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod dates;
pub mod error;
pub mod flags;
pub mod generators;
pub mod identity;
pub(crate) mod narrative;
pub mod orders;
pub mod profile;
pub mod record;
pub mod render;
pub mod rng;
pub mod sections;
pub mod service;
pub mod template;
pub mod validation;

pub use assembler::RecordAssembler;
pub use catalog::{Catalog, CatalogSummary};
pub use config::{resolve_output_dir, CoreConfig, SectionOdds};
pub use error::{IntakeError, IntakeResult};
pub use flags::{FlagTier, FlagTierOdds};
pub use identity::{FakeIdentityProvider, IdentityProvider};
pub use orders::{render_orders, MedicationOrderRecord, OrderAssembler};
pub use profile::{DiagnosisKind, DiagnosisSelection};
pub use record::PatientRecord;
pub use render::render_admission;
pub use sections::{select_sections, SectionKind};
pub use service::{GeneratedDocument, IntakeService};

pub use intake_layout::OutputFormat;
pub use intake_types::{NonEmptyText, Probability};
