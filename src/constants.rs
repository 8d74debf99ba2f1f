/// Table and naming constants shared by the schema and migration layers

// Migration bookkeeping
pub const MIGRATION_RECORDS_TABLE: &str = "migration_records";
pub const MIGRATION_ID_PREFIX: &str = "auto_";

// Content tables
pub const USERS_TABLE: &str = "users";
pub const POSTS_TABLE: &str = "posts";
pub const CATEGORIES_TABLE: &str = "categories";
pub const TAGS_TABLE: &str = "tags";
pub const POST_TAGS_TABLE: &str = "post_tags";

// Defaults used when no config file or env override is present
pub const DEFAULT_CONFIG_FILE: &str = "cms.toml";
pub const DEFAULT_DATABASE_PATH: &str = "data/cms.db";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_LOG_FILE: &str = "cms.log";

// Metric names
pub const METRIC_MIGRATIONS_APPLIED: &str = "cms_migrations_applied_total";
pub const METRIC_MIGRATIONS_SKIPPED: &str = "cms_migrations_skipped_total";
pub const METRIC_MIGRATIONS_FAILED: &str = "cms_migrations_failed_total";

/// Build the gorm-style index name for a single column, e.g. `idx_posts_slug`
pub fn index_name(table: &str, column: &str) -> String {
    format!("idx_{}_{}", table, column)
}
