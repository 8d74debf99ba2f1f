use super::record::MigrationRecord;
use crate::error::StoreError;
use crate::schema::ModelDescriptor;

/// Brings a physical table in line with a descriptor.
///
/// Implementations must be idempotent: applying an already-matching
/// descriptor is a no-op. The migrator relies on this for the bootstrap
/// step and for re-syncing a model whose record failed to persist.
pub trait SchemaSynchronizer {
    fn sync_schema(&self, descriptor: &ModelDescriptor) -> Result<(), StoreError>;
}

/// Durable store of migration records.
pub trait MigrationStore {
    /// Presence alone decides whether a model is already migrated.
    fn record_exists(&self, id: &str) -> Result<bool, StoreError>;

    /// `Ok(None)` when no record exists; `Err` only when the store itself failed.
    fn find_record(&self, id: &str) -> Result<Option<MigrationRecord>, StoreError>;

    /// Must fail with `StoreError::DuplicateRecord` rather than overwrite an existing id.
    fn insert_record(&self, record: &MigrationRecord) -> Result<(), StoreError>;

    fn list_records(&self) -> Result<Vec<MigrationRecord>, StoreError>;
}
