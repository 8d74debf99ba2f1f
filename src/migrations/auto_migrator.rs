use super::ports::{MigrationStore, SchemaSynchronizer};
use super::record::MigrationRecord;
use crate::constants::{METRIC_MIGRATIONS_APPLIED, METRIC_MIGRATIONS_FAILED, METRIC_MIGRATIONS_SKIPPED};
use crate::error::MigrationError;
use crate::schema::{Model, ModelDescriptor};
use serde::Serialize;
use tracing::{debug, error, info};

/// Outcome of a successful run, migration ids in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub applied: Vec<String>,
    pub skipped: Vec<String>,
}

impl MigrationReport {
    pub fn total(&self) -> usize {
        self.applied.len() + self.skipped.len()
    }
}

/// Synchronizes each registered model's schema once, recording completion so
/// later runs skip it.
pub struct AutoMigrator<'a, B> {
    backend: &'a B,
    models: Vec<ModelDescriptor>,
    verbose: bool,
}

impl<'a, B> AutoMigrator<'a, B>
where
    B: SchemaSynchronizer + MigrationStore,
{
    pub fn new(backend: &'a B, verbose: bool) -> Self {
        Self {
            backend,
            models: Vec::new(),
            verbose,
        }
    }

    /// Duplicates are allowed; the second occurrence is skipped during `run`.
    pub fn register(&mut self, descriptor: ModelDescriptor) {
        self.models.push(descriptor);
    }

    pub fn register_model<M: Model>(&mut self) {
        self.register(M::descriptor());
    }

    pub fn register_all<I>(&mut self, descriptors: I)
    where
        I: IntoIterator<Item = ModelDescriptor>,
    {
        self.models.extend(descriptors);
    }

    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    /// Runs every registered model in order, stopping at the first failure.
    ///
    /// Models migrated before a failure stay migrated and recorded; nothing
    /// is rolled back and nothing after the failing model is attempted.
    pub fn run(&self) -> Result<MigrationReport, MigrationError> {
        self.progress(format_args!("Starting auto migration process..."));
        self.progress(format_args!("Models to migrate: {}", self.models.len()));

        self.backend
            .sync_schema(&MigrationRecord::descriptor())
            .map_err(|source| self.fail(MigrationError::Bootstrap { source }))?;

        let mut report = MigrationReport::default();
        for model in &self.models {
            let id = model.migration_id();

            let exists = self.backend.record_exists(&id).map_err(|source| {
                self.fail(MigrationError::Lookup {
                    model: model.name.clone(),
                    id: id.clone(),
                    source,
                })
            })?;

            if exists {
                debug!(model = %model.name, migration_id = %id, "Model already migrated, skipping");
                metrics::counter!(METRIC_MIGRATIONS_SKIPPED).increment(1);
                report.skipped.push(id);
                continue;
            }

            self.progress(format_args!("Migrating model: {}", model.name));

            self.backend.sync_schema(model).map_err(|source| {
                self.fail(MigrationError::Sync {
                    model: model.name.clone(),
                    source,
                })
            })?;

            self.backend
                .insert_record(&MigrationRecord::new(id.clone()))
                .map_err(|source| {
                    self.fail(MigrationError::RecordPersist {
                        model: model.name.clone(),
                        id: id.clone(),
                        source,
                    })
                })?;

            metrics::counter!(METRIC_MIGRATIONS_APPLIED).increment(1);
            self.progress(format_args!("Successfully migrated model: {}", model.name));
            report.applied.push(id);
        }

        self.progress(format_args!(
            "Auto migration completed successfully ({} applied, {} skipped)",
            report.applied.len(),
            report.skipped.len()
        ));
        Ok(report)
    }

    fn progress(&self, message: std::fmt::Arguments<'_>) {
        if self.verbose {
            info!("{}", message);
        } else {
            debug!("{}", message);
        }
    }

    fn fail(&self, err: MigrationError) -> MigrationError {
        metrics::counter!(METRIC_MIGRATIONS_FAILED, "stage" => err.stage()).increment(1);
        error!(
            stage = err.stage(),
            model = err.model_name().unwrap_or("-"),
            "Migration error: {}",
            err
        );
        err
    }
}
