use super::ports::{MigrationStore, SchemaSynchronizer};
use super::record::MigrationRecord;
use crate::constants::MIGRATION_RECORDS_TABLE;
use crate::error::StoreError;
use crate::schema::{quote_ident, ModelDescriptor};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// SQLite-backed schema synchronizer and migration record store.
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        info!("Opening SQLite database at {}", db_path.display());
        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Column names currently present on `table`; empty when the table does not exist.
    pub fn existing_columns(&self, table: &str) -> Result<HashSet<String>, StoreError> {
        table_columns(&self.conn, table)
    }

    pub fn table_exists(&self, table: &str) -> Result<bool, StoreError> {
        let found: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![table],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

fn table_columns(conn: &Connection, table: &str) -> Result<HashSet<String>, StoreError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
    let columns = stmt
        .query_map(params![], |row| row.get::<_, String>(1))?
        .collect::<Result<HashSet<_>, _>>()?;
    Ok(columns)
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Accepts RFC 3339 as written by `insert_record`, and SQLite's own
/// `CURRENT_TIMESTAMP` form (`YYYY-MM-DD HH:MM:SS[.fff]`, UTC).
fn parse_timestamp(id: &str, raw: &str) -> Result<DateTime<Utc>, StoreError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .map(|naive| naive.and_utc())
        .map_err(|e| StoreError::Corrupt(format!("record '{}' has bad created_at '{}': {}", id, raw, e)))
}

impl SchemaSynchronizer for SqliteBackend {
    fn sync_schema(&self, descriptor: &ModelDescriptor) -> Result<(), StoreError> {
        descriptor.validate()?;

        let tx = self.conn.unchecked_transaction()?;

        let create_sql = descriptor.create_table_sql();
        debug!("Executing SQL: {}", create_sql);
        tx.execute_batch(&create_sql)?;

        let existing = table_columns(&tx, &descriptor.table)?;
        for column in descriptor.columns.iter().filter(|c| !existing.contains(&c.name)) {
            if column.primary_key {
                return Err(StoreError::SchemaConflict {
                    table: descriptor.table.clone(),
                    message: format!("cannot add primary key column '{}' to an existing table", column.name),
                });
            }
            if !column.nullable && column.default.is_none() {
                return Err(StoreError::SchemaConflict {
                    table: descriptor.table.clone(),
                    message: format!("cannot add NOT NULL column '{}' without a default", column.name),
                });
            }
            let alter_sql = format!(
                "ALTER TABLE {} ADD COLUMN {}",
                quote_ident(&descriptor.table),
                column.to_sql()
            );
            debug!("Executing SQL: {}", alter_sql);
            tx.execute_batch(&alter_sql)?;
            info!("Added column {}.{}", descriptor.table, column.name);
        }

        for index in &descriptor.indexes {
            let index_sql = index.to_sql(&descriptor.table);
            debug!("Executing SQL: {}", index_sql);
            tx.execute_batch(&index_sql)?;
        }

        tx.commit()?;
        Ok(())
    }
}

impl MigrationStore for SqliteBackend {
    fn record_exists(&self, id: &str) -> Result<bool, StoreError> {
        let found: Option<String> = self
            .conn
            .query_row(
                &format!("SELECT id FROM {} WHERE id = ?1", MIGRATION_RECORDS_TABLE),
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn find_record(&self, id: &str) -> Result<Option<MigrationRecord>, StoreError> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                &format!("SELECT id, created_at FROM {} WHERE id = ?1", MIGRATION_RECORDS_TABLE),
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((id, created_at)) => {
                let created_at = parse_timestamp(&id, &created_at)?;
                Ok(Some(MigrationRecord { id, created_at }))
            }
            None => Ok(None),
        }
    }

    fn insert_record(&self, record: &MigrationRecord) -> Result<(), StoreError> {
        let result = self.conn.execute(
            &format!("INSERT INTO {} (id, created_at) VALUES (?1, ?2)", MIGRATION_RECORDS_TABLE),
            params![record.id, format_timestamp(&record.created_at)],
        );
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _)) if err.code == ErrorCode::ConstraintViolation => {
                Err(StoreError::DuplicateRecord(record.id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn list_records(&self) -> Result<Vec<MigrationRecord>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, created_at FROM {} ORDER BY created_at, id",
            MIGRATION_RECORDS_TABLE
        ))?;
        let rows = stmt
            .query_map(params![], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, raw)| parse_timestamp(&id, &raw).map(|created_at| MigrationRecord { id, created_at }))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::AutoMigrator;
    use crate::schema::{ColumnDef, ColumnType, Model};

    fn widgets() -> ModelDescriptor {
        ModelDescriptor::new("Widget", "widgets")
            .column(ColumnDef::new("id", ColumnType::Integer).primary_key())
            .column(ColumnDef::new("name", ColumnType::Varchar(255)).not_null())
            .unique_index("name")
    }

    fn index_names(backend: &SqliteBackend, table: &str) -> HashSet<String> {
        let mut stmt = backend
            .connection()
            .prepare(&format!("PRAGMA index_list({})", table))
            .unwrap();
        stmt.query_map(params![], |row| row.get::<_, String>(1))
            .unwrap()
            .collect::<Result<HashSet<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_sync_creates_table_and_indexes() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        backend.sync_schema(&widgets()).unwrap();

        assert!(backend.table_exists("widgets").unwrap());
        let cols = backend.existing_columns("widgets").unwrap();
        assert!(cols.contains("id") && cols.contains("name"));
        assert!(index_names(&backend, "widgets").contains("idx_widgets_name"));
    }

    #[test]
    fn test_sync_is_idempotent() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        backend.sync_schema(&widgets()).unwrap();
        backend.sync_schema(&widgets()).unwrap();
        assert_eq!(backend.existing_columns("widgets").unwrap().len(), 2);
    }

    #[test]
    fn test_sync_adds_missing_columns() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        backend.sync_schema(&widgets()).unwrap();
        backend
            .connection()
            .execute("INSERT INTO widgets (name) VALUES ('first')", params![])
            .unwrap();

        let extended = widgets()
            .column(ColumnDef::new("color", ColumnType::Varchar(20)).not_null().default_text("red"))
            .column(ColumnDef::new("notes", ColumnType::Text))
            .index("color");
        backend.sync_schema(&extended).unwrap();

        let color: String = backend
            .connection()
            .query_row("SELECT color FROM widgets WHERE name = 'first'", params![], |r| r.get(0))
            .unwrap();
        assert_eq!(color, "red");
        assert!(backend.existing_columns("widgets").unwrap().contains("notes"));
        assert!(index_names(&backend, "widgets").contains("idx_widgets_color"));
    }

    #[test]
    fn test_sync_rejects_required_column_without_default() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        backend.sync_schema(&widgets()).unwrap();

        let conflicting = widgets().column(ColumnDef::new("sku", ColumnType::Text).not_null());
        let err = backend.sync_schema(&conflicting).unwrap_err();
        assert!(matches!(err, StoreError::SchemaConflict { .. }));
        assert!(!backend.existing_columns("widgets").unwrap().contains("sku"));
    }

    #[test]
    fn test_sync_rejects_invalid_descriptor() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        let bad = ModelDescriptor::new("Bad", "bad table").column(ColumnDef::new("id", ColumnType::Integer));
        assert!(matches!(backend.sync_schema(&bad), Err(StoreError::InvalidDescriptor(_))));
    }

    #[test]
    fn test_record_roundtrip_and_duplicate_insert_fails() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        backend.sync_schema(&MigrationRecord::descriptor()).unwrap();

        assert!(backend.find_record("auto_widget").unwrap().is_none());

        let record = MigrationRecord::new("auto_widget");
        backend.insert_record(&record).unwrap();

        let found = backend.find_record("auto_widget").unwrap().unwrap();
        assert_eq!(found.id, "auto_widget");
        assert_eq!(
            found.created_at.timestamp_micros(),
            record.created_at.timestamp_micros()
        );

        let err = backend.insert_record(&MigrationRecord::new("auto_widget")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateRecord(ref id) if id == "auto_widget"));
        assert_eq!(backend.list_records().unwrap().len(), 1);
    }

    #[test]
    fn test_find_without_records_table_is_an_error() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        assert!(matches!(backend.find_record("auto_x"), Err(StoreError::Sqlite(_))));
    }

    #[test]
    fn test_sqlite_current_timestamp_record_is_skipped() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        backend.sync_schema(&MigrationRecord::descriptor()).unwrap();
        backend
            .connection()
            .execute(
                "INSERT INTO migration_records (id, created_at) VALUES ('auto_page', CURRENT_TIMESTAMP)",
                params![],
            )
            .unwrap();

        let found = backend.find_record("auto_page").unwrap().unwrap();
        assert!(found.created_at <= Utc::now());

        let mut migrator = AutoMigrator::new(&backend, false);
        migrator.register(
            ModelDescriptor::new("Page", "pages").column(ColumnDef::new("id", ColumnType::Integer).primary_key()),
        );
        let report = migrator.run().unwrap();
        assert_eq!(report.skipped, vec!["auto_page"]);
        assert!(!backend.table_exists("pages").unwrap());
    }

    #[test]
    fn test_unparseable_timestamp_still_counts_as_migrated() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        backend.sync_schema(&MigrationRecord::descriptor()).unwrap();
        backend
            .connection()
            .execute(
                "INSERT INTO migration_records (id, created_at) VALUES ('auto_x', 'yesterday')",
                params![],
            )
            .unwrap();

        assert!(backend.record_exists("auto_x").unwrap());
        assert!(!backend.record_exists("auto_y").unwrap());
        assert!(matches!(backend.find_record("auto_x"), Err(StoreError::Corrupt(_))));
        assert!(matches!(backend.list_records(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let rfc = parse_timestamp("a", "2026-10-17T07:20:49.123456Z").unwrap();
        let plain = parse_timestamp("a", "2026-10-17 07:20:49").unwrap();
        let fractional = parse_timestamp("a", "2026-10-17 07:20:49.5").unwrap();
        assert_eq!(rfc.timestamp(), plain.timestamp());
        assert_eq!(fractional.timestamp_millis(), plain.timestamp_millis() + 500);
        assert!(parse_timestamp("a", "17/10/2026").is_err());
    }

    #[test]
    fn test_sync_handles_keyword_identifiers() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        let menu = ModelDescriptor::new("Menu", "menus")
            .column(ColumnDef::new("id", ColumnType::Integer).primary_key())
            .column(ColumnDef::new("order", ColumnType::Integer).not_null().default_int(0))
            .index("order");

        let mut migrator = AutoMigrator::new(&backend, false);
        migrator.register(menu.clone());
        migrator.run().unwrap();

        // Adding another keyword column goes through ALTER TABLE
        let extended = menu.column(ColumnDef::new("group", ColumnType::Text)).index("group");
        backend.sync_schema(&extended).unwrap();

        let cols = backend.existing_columns("menus").unwrap();
        assert!(cols.contains("order") && cols.contains("group"));
        let indexes = index_names(&backend, "menus");
        assert!(indexes.contains("idx_menus_order") && indexes.contains("idx_menus_group"));
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("cms.db");
        let backend = SqliteBackend::open(&path).unwrap();
        backend.sync_schema(&MigrationRecord::descriptor()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_open_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();
        let result = SqliteBackend::open(blocker.join("cms.db"));
        assert!(matches!(result, Err(StoreError::Io(_))));
    }
}
