//! Content models and their storage descriptors.
//!
//! Each model carries the columns, defaults and indexes the schema
//! synchronizer creates for it, plus the small status vocabularies the
//! handlers rely on.

pub use category::{Category, CategoryStatus};
pub use post::{generate_slug, Post, PostStatus, PostTag, PostValidationError};
pub use tag::{Tag, TagStatus};
pub use user::{User, UserRole, UserStatus};

use crate::schema::{ColumnDef, ColumnType, Model, ModelDescriptor};

/// Declares a lowercase string-backed status enum with `Default`, `as_str` and `FromStr`.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? } default $default:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("unknown {}: {}", stringify!($name), other)),
                }
            }
        }
    };
}

pub mod category;
pub mod post;
pub mod tag;
pub mod user;

/// `id INTEGER PRIMARY KEY AUTOINCREMENT`
pub(crate) fn id_column() -> ColumnDef {
    ColumnDef::new("id", ColumnType::Integer).primary_key()
}

/// `created_at` / `updated_at`, both required
pub(crate) fn with_timestamps(descriptor: ModelDescriptor) -> ModelDescriptor {
    descriptor
        .column(ColumnDef::new("created_at", ColumnType::Timestamp).not_null())
        .column(ColumnDef::new("updated_at", ColumnType::Timestamp).not_null())
}

/// Nullable indexed `deleted_at` for soft deletes
pub(crate) fn with_soft_delete(descriptor: ModelDescriptor) -> ModelDescriptor {
    descriptor
        .column(ColumnDef::new("deleted_at", ColumnType::Timestamp))
        .index("deleted_at")
}

/// Descriptors migrated at process startup, in dependency order.
pub fn default_models() -> Vec<ModelDescriptor> {
    vec![
        User::descriptor(),
        Category::descriptor(),
        Tag::descriptor(),
        Post::descriptor(),
        PostTag::descriptor(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_models_are_valid_and_distinct() {
        let models = default_models();
        let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["User", "Category", "Tag", "Post", "PostTag"]);

        let ids: HashSet<String> = models.iter().map(|m| m.migration_id()).collect();
        assert_eq!(ids.len(), models.len());

        for model in &models {
            model.validate().unwrap();
        }
    }
}
