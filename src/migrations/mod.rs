pub mod auto_migrator;
pub mod ports;
pub mod record;
pub mod sqlite;

pub use auto_migrator::{AutoMigrator, MigrationReport};
pub use ports::{MigrationStore, SchemaSynchronizer};
pub use record::MigrationRecord;
pub use sqlite::SqliteBackend;

use crate::error::MigrationError;
use crate::models::default_models;

/// Registers the content models and migrates them. Called once at startup,
/// before anything serves requests.
pub fn init_auto_migrations<B>(backend: &B, verbose: bool) -> Result<MigrationReport, MigrationError>
where
    B: SchemaSynchronizer + MigrationStore,
{
    let mut migrator = AutoMigrator::new(backend, verbose);
    migrator.register_all(default_models());
    migrator.run()
}
