use crate::constants::{DEFAULT_CONFIG_FILE, DEFAULT_DATABASE_PATH, DEFAULT_LOG_DIR, DEFAULT_LOG_FILE};
use crate::error::{CmsError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub migrations: MigrationsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MigrationsConfig {
    pub verbose: bool,
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self { verbose: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: PathBuf,
    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_LOG_DIR),
            file_name: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

impl Config {
    /// Loads `.env`, then the config file (`CMS_CONFIG` or `cms.toml`), then env overrides.
    /// A missing config file falls back to defaults.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let config_path = std::env::var("CMS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let mut config = if Path::new(&config_path).exists() {
            Self::load_from(&config_path)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn load_from<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            CmsError::Config(format!("Failed to read config file '{}': {}", config_path.display(), e))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Applies `CMS_DATABASE_PATH`, `CMS_MIGRATIONS_VERBOSE` and `CMS_LOG_DIR` from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("CMS_DATABASE_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(raw) = lookup("CMS_MIGRATIONS_VERBOSE") {
            self.migrations.verbose = parse_bool(&raw).ok_or_else(|| {
                CmsError::Config(format!("CMS_MIGRATIONS_VERBOSE must be a boolean, got '{}'", raw))
            })?;
        }
        if let Some(dir) = lookup("CMS_LOG_DIR") {
            self.logging.dir = PathBuf::from(dir);
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.database.path, PathBuf::from("data/cms.db"));
        assert!(config.migrations.verbose);
        assert_eq!(config.logging.file_name, "cms.log");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cms.toml");
        fs::write(&path, "[database]\npath = \"/var/lib/cms/cms.db\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.database.path, PathBuf::from("/var/lib/cms/cms.db"));
        assert!(config.migrations.verbose);
        assert_eq!(config.logging.dir, PathBuf::from("logs"));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cms.toml");
        fs::write(&path, "[migrations]\nverbose = \"sometimes\"\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(CmsError::Toml(_))));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempdir().unwrap();
        let result = Config::load_from(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(CmsError::Config(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("CMS_DATABASE_PATH", "/tmp/other.db"),
            ("CMS_MIGRATIONS_VERBOSE", "off"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.database.path, PathBuf::from("/tmp/other.db"));
        assert!(!config.migrations.verbose);
        assert_eq!(config.logging.dir, PathBuf::from("logs"));

        let result = config.apply_overrides(|key| {
            (key == "CMS_MIGRATIONS_VERBOSE").then(|| "maybe".to_string())
        });
        assert!(matches!(result, Err(CmsError::Config(_))));
    }
}
