pub mod descriptor;

pub use descriptor::{migration_id_for, quote_ident, ColumnDef, ColumnType, IndexDef, ModelDescriptor};

/// A type whose storage schema can be described for migration.
pub trait Model {
    fn descriptor() -> ModelDescriptor;
}
