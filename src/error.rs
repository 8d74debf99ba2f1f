use thiserror::Error;

/// Failures raised by the storage collaborators (schema synchronizer and record store).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Migration record already exists: {0}")]
    DuplicateRecord(String),

    #[error("Schema conflict on table '{table}': {message}")]
    SchemaConflict { table: String, message: String },

    #[error("Invalid model descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Corrupt migration record: {0}")]
    Corrupt(String),
}

/// A migration run failure. Each variant halts the run at the point it occurred.
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("failed to prepare migration records table: {source}")]
    Bootstrap {
        #[source]
        source: StoreError,
    },

    #[error("failed to check migration record '{id}' for model {model}: {source}")]
    Lookup {
        model: String,
        id: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to auto migrate model {model}: {source}")]
    Sync {
        model: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to create migration record '{id}' for model {model}: {source}")]
    RecordPersist {
        model: String,
        id: String,
        #[source]
        source: StoreError,
    },
}

impl MigrationError {
    /// Name of the descriptor the run stopped at, if the failure was per-model.
    pub fn model_name(&self) -> Option<&str> {
        match self {
            MigrationError::Bootstrap { .. } => None,
            MigrationError::Lookup { model, .. }
            | MigrationError::Sync { model, .. }
            | MigrationError::RecordPersist { model, .. } => Some(model),
        }
    }

    /// Short stage label used for logs and metrics.
    pub fn stage(&self) -> &'static str {
        match self {
            MigrationError::Bootstrap { .. } => "bootstrap",
            MigrationError::Lookup { .. } => "lookup",
            MigrationError::Sync { .. } => "sync",
            MigrationError::RecordPersist { .. } => "record",
        }
    }
}

#[derive(Error, Debug)]
pub enum CmsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),
}

pub type Result<T> = std::result::Result<T, CmsError>;
