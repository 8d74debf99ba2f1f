use super::{id_column, with_soft_delete, with_timestamps};
use crate::constants::CATEGORIES_TABLE;
use crate::schema::{ColumnDef, ColumnType, Model, ModelDescriptor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

string_enum! {
    CategoryStatus {
        Draft => "draft",
        Published => "published",
        Archived => "archived",
    } default Draft
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub status: CategoryStatus,
    pub slug: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub featured_image: Option<String>,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Category {
    pub fn is_published(&self) -> bool {
        self.status == CategoryStatus::Published && self.published_at.is_some()
    }
}

impl Model for Category {
    fn descriptor() -> ModelDescriptor {
        let descriptor = ModelDescriptor::new("Category", CATEGORIES_TABLE)
            .column(id_column())
            .column(ColumnDef::new("name", ColumnType::Varchar(255)).not_null())
            .column(ColumnDef::new("description", ColumnType::Text))
            .column(
                ColumnDef::new("status", ColumnType::Varchar(20))
                    .not_null()
                    .default_text(CategoryStatus::default().as_str()),
            )
            .column(ColumnDef::new("slug", ColumnType::Varchar(300)))
            .column(ColumnDef::new("meta_title", ColumnType::Varchar(255)))
            .column(ColumnDef::new("meta_description", ColumnType::Varchar(500)))
            .column(ColumnDef::new("featured_image", ColumnType::Varchar(512)))
            .column(ColumnDef::new("parent_id", ColumnType::Integer))
            .column(ColumnDef::new("published_at", ColumnType::Timestamp))
            .unique_index("slug")
            .index("parent_id")
            .index("published_at");
        with_soft_delete(with_timestamps(descriptor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(status: CategoryStatus, published: bool) -> Category {
        let now = Utc::now();
        Category {
            id: None,
            name: "News".to_string(),
            description: None,
            status,
            slug: Some("news".to_string()),
            meta_title: None,
            meta_description: None,
            featured_image: None,
            parent_id: None,
            created_at: now,
            updated_at: now,
            published_at: published.then_some(now),
            deleted_at: None,
        }
    }

    #[test]
    fn test_is_published_requires_status_and_date() {
        assert!(category(CategoryStatus::Published, true).is_published());
        assert!(!category(CategoryStatus::Published, false).is_published());
        assert!(!category(CategoryStatus::Draft, true).is_published());
    }
}
