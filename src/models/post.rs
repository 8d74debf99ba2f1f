use super::{id_column, with_soft_delete, with_timestamps};
use crate::constants::{POSTS_TABLE, POST_TAGS_TABLE};
use crate::schema::{ColumnDef, ColumnType, Model, ModelDescriptor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const POST_TITLE_MAX_CHARS: usize = 255;

string_enum! {
    PostStatus {
        Draft => "draft",
        Published => "published",
        Archived => "archived",
        Rejected => "rejected",
    } default Draft
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PostValidationError {
    #[error("Validation failed: title is required")]
    TitleRequired,

    #[error("Validation failed: title exceeds {max} characters (got {len})")]
    TitleTooLong { len: usize, max: usize },

    #[error("Validation failed: content is required")]
    ContentRequired,

    #[error("Validation failed: author ID is required")]
    AuthorRequired,
}

/// URL slug for a title: lowercased, spaces replaced by `-`
pub fn generate_slug(title: &str) -> String {
    title.to_lowercase().replace(' ', "-")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Option<i64>,
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    #[serde(default)]
    pub status: PostStatus,
    pub author_id: i64,
    pub approved_by: Option<i64>,
    pub slug: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub featured_image: Option<String>,
    pub category_id: Option<i64>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published && self.published_at.is_some()
    }

    pub fn is_approved(&self) -> bool {
        self.approved_by.is_some() && self.approved_at.is_some()
    }

    /// Checks the fields a new post must carry before it is stored.
    pub fn validate_new(&self) -> Result<(), PostValidationError> {
        if self.title.trim().is_empty() {
            return Err(PostValidationError::TitleRequired);
        }
        let len = self.title.chars().count();
        if len > POST_TITLE_MAX_CHARS {
            return Err(PostValidationError::TitleTooLong {
                len,
                max: POST_TITLE_MAX_CHARS,
            });
        }
        if self.content.trim().is_empty() {
            return Err(PostValidationError::ContentRequired);
        }
        if self.author_id <= 0 {
            return Err(PostValidationError::AuthorRequired);
        }
        Ok(())
    }

    /// Validates a new post and fills in creation defaults: timestamps and,
    /// when missing, a slug derived from the title.
    pub fn prepare_new(&mut self, now: DateTime<Utc>) -> Result<(), PostValidationError> {
        self.validate_new()?;
        if self.slug.as_deref().map_or(true, str::is_empty) {
            self.slug = Some(generate_slug(&self.title));
        }
        self.created_at = now;
        self.updated_at = now;
        Ok(())
    }

    /// Marks the post published, keeping an existing `published_at`.
    pub fn publish(&mut self, now: DateTime<Utc>) {
        self.status = PostStatus::Published;
        if self.published_at.is_none() {
            self.published_at = Some(now);
        }
        self.updated_at = now;
    }
}

impl Model for Post {
    fn descriptor() -> ModelDescriptor {
        let descriptor = ModelDescriptor::new("Post", POSTS_TABLE)
            .column(id_column())
            .column(ColumnDef::new("title", ColumnType::Varchar(255)).not_null())
            .column(ColumnDef::new("content", ColumnType::Text).not_null())
            .column(ColumnDef::new("excerpt", ColumnType::Varchar(500)))
            .column(
                ColumnDef::new("status", ColumnType::Varchar(20))
                    .not_null()
                    .default_text(PostStatus::default().as_str()),
            )
            .column(ColumnDef::new("author_id", ColumnType::Integer).not_null())
            .column(ColumnDef::new("approved_by", ColumnType::Integer))
            .column(ColumnDef::new("slug", ColumnType::Varchar(300)))
            .column(ColumnDef::new("meta_title", ColumnType::Varchar(255)))
            .column(ColumnDef::new("meta_description", ColumnType::Varchar(500)))
            .column(ColumnDef::new("featured_image", ColumnType::Varchar(512)))
            .column(ColumnDef::new("category_id", ColumnType::Integer))
            .column(ColumnDef::new("view_count", ColumnType::Integer).default_int(0))
            .column(ColumnDef::new("published_at", ColumnType::Timestamp))
            .column(ColumnDef::new("approved_at", ColumnType::Timestamp))
            .unique_index("slug")
            .index("published_at")
            .index("approved_at");
        with_soft_delete(with_timestamps(descriptor))
    }
}

/// Join row between posts and tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostTag {
    pub post_id: i64,
    pub tag_id: i64,
}

impl Model for PostTag {
    fn descriptor() -> ModelDescriptor {
        ModelDescriptor::new("PostTag", POST_TAGS_TABLE)
            .column(ColumnDef::new("post_id", ColumnType::Integer).not_null())
            .column(ColumnDef::new("tag_id", ColumnType::Integer).not_null())
            .composite_unique_index("idx_post_tags_post_tag", &["post_id", "tag_id"])
            .index("tag_id")
    }
}
