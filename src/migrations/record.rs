use crate::constants::MIGRATION_RECORDS_TABLE;
use crate::schema::{ColumnDef, ColumnType, Model, ModelDescriptor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable marker that a descriptor's schema was synchronized at least once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

impl MigrationRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
        }
    }
}

impl Model for MigrationRecord {
    fn descriptor() -> ModelDescriptor {
        ModelDescriptor::new("MigrationRecord", MIGRATION_RECORDS_TABLE)
            .column(ColumnDef::new("id", ColumnType::Text).primary_key())
            .column(ColumnDef::new("created_at", ColumnType::Timestamp).not_null())
    }
}
