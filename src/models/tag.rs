use super::{id_column, with_soft_delete, with_timestamps};
use crate::constants::TAGS_TABLE;
use crate::schema::{ColumnDef, ColumnType, Model, ModelDescriptor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

string_enum! {
    TagStatus {
        Active => "active",
        Archived => "archived",
    } default Active
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: Option<i64>,
    pub name: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub status: TagStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Model for Tag {
    fn descriptor() -> ModelDescriptor {
        let descriptor = ModelDescriptor::new("Tag", TAGS_TABLE)
            .column(id_column())
            .column(ColumnDef::new("name", ColumnType::Varchar(255)).not_null())
            .column(ColumnDef::new("slug", ColumnType::Varchar(300)))
            .column(
                ColumnDef::new("status", ColumnType::Varchar(20))
                    .not_null()
                    .default_text(TagStatus::default().as_str()),
            )
            .unique_index("name")
            .unique_index("slug");
        with_soft_delete(with_timestamps(descriptor))
    }
}
