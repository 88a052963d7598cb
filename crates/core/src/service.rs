//! Document generation service.
//!
//! [`IntakeService`] ties the pieces together: it holds the resolved configuration and the
//! validated catalog, assembles records, renders them, and writes the bytes produced by the
//! configured layout engine into the output directory.

use crate::assembler::RecordAssembler;
use crate::catalog::Catalog;
use crate::config::CoreConfig;
use crate::error::{IntakeError, IntakeResult};
use crate::identity::{FakeIdentityProvider, IdentityProvider};
use crate::orders::{render_orders, MedicationOrderRecord, OrderAssembler};
use crate::record::PatientRecord;
use crate::render::render_admission;
use crate::rng::{entropy_rng, make_rng};
use chrono::NaiveDateTime;
use intake_files::{ArtifactMetadata, ArtifactWriter};
use intake_types::{Document, NonEmptyText};
use rand::RngCore;
use serde::Serialize;
use std::sync::Arc;

/// What was produced by one write.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedDocument {
    pub document_id: String,
    pub title: String,
    pub sections: usize,
    /// IANA media type of the written bytes
    pub media_type: &'static str,
    pub artifact: ArtifactMetadata,
}

/// Pure document operations - no CLI concerns
pub struct IntakeService {
    cfg: Arc<CoreConfig>,
    catalog: Catalog,
    identity: Box<dyn IdentityProvider>,
}

impl IntakeService {
    /// Creates a service backed by the built-in catalog and the `fake` identity provider.
    ///
    /// # Errors
    ///
    /// Returns an `IntakeError` if the built-in catalog fails its self-check.
    pub fn new(cfg: Arc<CoreConfig>) -> IntakeResult<Self> {
        Ok(Self {
            cfg,
            catalog: Catalog::builtin()?,
            identity: Box::new(FakeIdentityProvider),
        })
    }

    /// Replaces the identity provider, e.g. with a fixed-name provider in tests.
    pub fn with_identity_provider(mut self, identity: Box<dyn IdentityProvider>) -> Self {
        self.identity = identity;
        self
    }

    /// Replaces the catalog. The catalog is validated first.
    ///
    /// # Errors
    ///
    /// Returns an `IntakeError` if the catalog fails its self-check.
    pub fn with_catalog(mut self, catalog: Catalog) -> IntakeResult<Self> {
        catalog.validate()?;
        self.catalog = catalog;
        Ok(self)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    /// Random source for one document.
    ///
    /// Seeded runs derive a separate generator per `key`, so document `n` of a batch is
    /// the same no matter how many documents the batch holds.
    pub fn rng_for(&self, key: &str) -> Box<dyn RngCore> {
        match self.cfg.seed() {
            Some(seed) => Box::new(make_rng(seed, key)),
            None => Box::new(entropy_rng()),
        }
    }

    /// Assembles an admission record without writing anything.
    ///
    /// # Errors
    ///
    /// Returns an `IntakeError` if the catalog cannot satisfy a draw or the file name is
    /// unusable.
    pub fn admission_record(
        &self,
        rng: &mut dyn RngCore,
        now: NaiveDateTime,
        file_name: Option<&str>,
    ) -> IntakeResult<PatientRecord> {
        self.admission_in_batch(rng, now, file_name, 0)
    }

    /// Assembles a medication-order record without writing anything.
    ///
    /// # Errors
    ///
    /// See [`IntakeService::admission_record`].
    pub fn orders_record(
        &self,
        rng: &mut dyn RngCore,
        now: NaiveDateTime,
        file_name: Option<&str>,
    ) -> IntakeResult<MedicationOrderRecord> {
        self.orders_in_batch(rng, now, file_name, 0)
    }

    /// Generates and writes one admission document.
    ///
    /// # Arguments
    ///
    /// * `file_name` - Optional file name; defaults to `Last_First_MMDDYYYY.<ext>`.
    /// * `now` - The generation instant.
    /// * `index` - Position in the batch. It derives the seeded random source and keeps
    ///   default file names distinct within the batch.
    ///
    /// # Errors
    ///
    /// Returns an `IntakeError` if:
    /// - the record cannot be assembled,
    /// - the layout engine fails,
    /// - the output directory cannot be created or written.
    pub fn write_admission(
        &self,
        file_name: Option<&str>,
        now: NaiveDateTime,
        index: usize,
    ) -> IntakeResult<GeneratedDocument> {
        let mut rng = self.rng_for(&format!("admission-{index}"));
        let record = self.admission_in_batch(rng.as_mut(), now, file_name, index)?;
        let document = render_admission(&record);
        self.write_document(
            &document,
            &record.metadata.file_name,
            &record.metadata.document_id,
        )
    }

    /// Generates and writes one medication-order sheet.
    ///
    /// # Errors
    ///
    /// See [`IntakeService::write_admission`].
    pub fn write_orders(
        &self,
        file_name: Option<&str>,
        now: NaiveDateTime,
        index: usize,
    ) -> IntakeResult<GeneratedDocument> {
        let mut rng = self.rng_for(&format!("orders-{index}"));
        let record = self.orders_in_batch(rng.as_mut(), now, file_name, index)?;
        let document = render_orders(&record);
        self.write_document(
            &document,
            &record.metadata.file_name,
            &record.metadata.document_id,
        )
    }

    /// Assembles one admission record and returns it as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an `IntakeError` if assembly or serialisation fails.
    pub fn inspect(&self, now: NaiveDateTime) -> IntakeResult<String> {
        let mut rng = self.rng_for("admission-0");
        let record = self.admission_record(rng.as_mut(), now, None)?;
        serde_json::to_string_pretty(&record).map_err(IntakeError::Serialization)
    }

    fn admission_in_batch(
        &self,
        rng: &mut dyn RngCore,
        now: NaiveDateTime,
        file_name: Option<&str>,
        index: usize,
    ) -> IntakeResult<PatientRecord> {
        RecordAssembler::new(&self.catalog, self.identity.as_ref(), &self.cfg)
            .with_sequence(index)
            .assemble(rng, now, file_name)
    }

    fn orders_in_batch(
        &self,
        rng: &mut dyn RngCore,
        now: NaiveDateTime,
        file_name: Option<&str>,
        index: usize,
    ) -> IntakeResult<MedicationOrderRecord> {
        OrderAssembler::new(&self.catalog, self.identity.as_ref(), &self.cfg)
            .with_sequence(index)
            .assemble(rng, now, file_name)
    }

    fn write_document(
        &self,
        document: &Document,
        file_name: &str,
        document_id: &str,
    ) -> IntakeResult<GeneratedDocument> {
        let format = self.cfg.output_format();
        let bytes = format.engine().render(document)?;
        let writer = ArtifactWriter::new(self.cfg.output_dir())?;
        let name = NonEmptyText::new(file_name).map_err(|e| {
            IntakeError::InvalidInput(format!("invalid file name '{file_name}': {e}"))
        })?;
        let artifact = writer.write(&name, &bytes)?;

        tracing::info!(
            document_id,
            path = %artifact.path.display(),
            size_bytes = artifact.size_bytes,
            format = format.extension(),
            "wrote document"
        );

        Ok(GeneratedDocument {
            document_id: document_id.to_owned(),
            title: document.title.clone(),
            sections: document.sections.len(),
            media_type: format.media_type(),
            artifact,
        })
    }
}
