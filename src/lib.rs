pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod migrations;
pub mod models;
pub mod schema;

pub use error::{CmsError, MigrationError, Result, StoreError};
pub use migrations::{init_auto_migrations, AutoMigrator, MigrationRecord, MigrationReport, SqliteBackend};
pub use schema::{Model, ModelDescriptor};
