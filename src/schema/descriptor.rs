use crate::constants::{index_name, MIGRATION_ID_PREFIX};
use crate::error::StoreError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

/// Storage type of a column, rendered as SQLite DDL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Text,
    Varchar(u32),
    Timestamp,
    Boolean,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Integer => write!(f, "INTEGER"),
            ColumnType::Text => write!(f, "TEXT"),
            ColumnType::Varchar(size) => write!(f, "VARCHAR({})", size),
            ColumnType::Timestamp => write!(f, "DATETIME"),
            ColumnType::Boolean => write!(f, "BOOLEAN"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    /// Raw SQL default expression, e.g. `'draft'` or `0`
    pub default: Option<String>,
    pub primary_key: bool,
}

impl ColumnDef {
    /// A nullable column with no default
    pub fn new(name: &str, column_type: ColumnType) -> Self {
        Self {
            name: name.to_string(),
            column_type,
            nullable: true,
            default: None,
            primary_key: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Quotes `value` as a SQL string literal
    pub fn default_text(mut self, value: &str) -> Self {
        self.default = Some(format!("'{}'", value.replace('\'', "''")));
        self
    }

    pub fn default_int(mut self, value: i64) -> Self {
        self.default = Some(value.to_string());
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    /// Column definition as it appears inside CREATE TABLE / ADD COLUMN
    pub fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", quote_ident(&self.name), self.column_type);
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
            if self.column_type == ColumnType::Integer {
                sql.push_str(" AUTOINCREMENT");
            }
        } else if !self.nullable {
            sql.push_str(" NOT NULL");
        }
        if let Some(default) = &self.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(default);
        }
        sql
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

impl IndexDef {
    pub fn to_sql(&self, table: &str) -> String {
        format!(
            "CREATE {}INDEX IF NOT EXISTS {} ON {} ({})",
            if self.unique { "UNIQUE " } else { "" },
            quote_ident(&self.name),
            quote_ident(table),
            self.columns.iter().map(|c| quote_ident(c)).collect::<Vec<_>>().join(", ")
        )
    }
}

/// Storage schema of one entity: name, table, columns and indexes.
///
/// The migration tracker only derives an identity from `name`; the schema
/// synchronizer is what interprets the columns and indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub name: String,
    pub table: String,
    pub columns: Vec<ColumnDef>,
    pub indexes: Vec<IndexDef>,
}

impl ModelDescriptor {
    pub fn new(name: &str, table: &str) -> Self {
        Self {
            name: name.to_string(),
            table: table.to_string(),
            columns: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Plain index on a single column, named `idx_<table>_<column>`
    pub fn index(mut self, column: &str) -> Self {
        self.indexes.push(IndexDef {
            name: index_name(&self.table, column),
            columns: vec![column.to_string()],
            unique: false,
        });
        self
    }

    /// Unique index on a single column, named `idx_<table>_<column>`
    pub fn unique_index(mut self, column: &str) -> Self {
        self.indexes.push(IndexDef {
            name: index_name(&self.table, column),
            columns: vec![column.to_string()],
            unique: true,
        });
        self
    }

    /// Unique index spanning several columns
    pub fn composite_unique_index(mut self, name: &str, columns: &[&str]) -> Self {
        self.indexes.push(IndexDef {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            unique: true,
        });
        self
    }

    /// Stable migration identity: a pure function of the entity name.
    pub fn migration_id(&self) -> String {
        migration_id_for(&self.name)
    }

    pub fn find_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Checks every identifier that will be interpolated into DDL.
    pub fn validate(&self) -> Result<(), StoreError> {
        check_identifier("model name", &self.name)?;
        check_identifier("table name", &self.table)?;

        if self.columns.is_empty() {
            return Err(StoreError::InvalidDescriptor(format!(
                "model {} has no columns",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            check_identifier("column name", &column.name)?;
            if !seen.insert(column.name.as_str()) {
                return Err(StoreError::InvalidDescriptor(format!(
                    "model {} declares column '{}' twice",
                    self.name, column.name
                )));
            }
        }
        if self.columns.iter().filter(|c| c.primary_key).count() > 1 {
            return Err(StoreError::InvalidDescriptor(format!(
                "model {} declares more than one primary key",
                self.name
            )));
        }

        for index in &self.indexes {
            check_identifier("index name", &index.name)?;
            if index.columns.is_empty() {
                return Err(StoreError::InvalidDescriptor(format!(
                    "index {} on model {} has no columns",
                    index.name, self.name
                )));
            }
            for column in &index.columns {
                if !seen.contains(column.as_str()) {
                    return Err(StoreError::InvalidDescriptor(format!(
                        "index {} references unknown column '{}' on model {}",
                        index.name, column, self.name
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn create_table_sql(&self) -> String {
        let columns: Vec<String> = self.columns.iter().map(ColumnDef::to_sql).collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_ident(&self.table),
            columns.join(", ")
        )
    }
}

/// Double-quotes an identifier so keywords like `order` are usable as names.
/// Validated identifiers never contain a quote character.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name)
}

/// Migration identity for an entity name, e.g. `Post` -> `auto_post`
pub fn migration_id_for(model_name: &str) -> String {
    format!("{}{}", MIGRATION_ID_PREFIX, model_name.to_lowercase())
}

fn check_identifier(kind: &str, value: &str) -> Result<(), StoreError> {
    if IDENTIFIER.is_match(value) {
        Ok(())
    } else {
        Err(StoreError::InvalidDescriptor(format!(
            "invalid {}: '{}'",
            kind, value
        )))
    }
}
