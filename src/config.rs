//! Run settings
//!
//! Source and target directories, reader options and database parameters.
//! Values are layered: defaults, then a settings file (JSON or YAML), then
//! environment variables, then command-line flags.

use crate::error::{Error, Result};
use crate::source::{ReadOptions, DEFAULT_CHUNK_SIZE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Upper bound on concurrent dataset loads
pub const DEFAULT_MAX_WORKERS: usize = 4;

// ============================================================================
// Database Settings
// ============================================================================

/// Supported load targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseKind {
    /// PostgreSQL, attached through DuckDB
    #[default]
    Postgres,
    /// Local DuckDB file (or in-memory)
    Duckdb,
}

impl std::fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseKind::Postgres => write!(f, "postgres"),
            DatabaseKind::Duckdb => write!(f, "duckdb"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Target engine
    pub engine: DatabaseKind,
    /// Server host (postgres)
    pub host: String,
    /// Server port (postgres, default 5432)
    pub port: Option<u16>,
    /// Database name (postgres)
    pub name: Option<String>,
    /// User name (postgres)
    pub user: String,
    /// Password (postgres)
    pub password: String,
    /// Database file (duckdb); in-memory when absent
    pub path: Option<PathBuf>,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            engine: DatabaseKind::default(),
            host: "localhost".to_string(),
            port: None,
            name: None,
            user: "postgres".to_string(),
            password: String::new(),
            path: None,
        }
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Complete settings for a conversion or load run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding `schemas.json` and one sub-directory per dataset
    pub src_base_dir: PathBuf,
    /// Directory converted files are written under
    pub tgt_base_dir: PathBuf,
    /// Rows per chunk when loading
    pub chunk_size: usize,
    /// Field delimiter of the part-files
    pub delimiter: char,
    /// Upper bound on concurrent dataset loads
    pub max_workers: usize,
    /// Load target
    pub database: DatabaseSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            src_base_dir: PathBuf::from("data/src"),
            tgt_base_dir: PathBuf::from("data/tgt"),
            chunk_size: DEFAULT_CHUNK_SIZE,
            delimiter: ',',
            max_workers: DEFAULT_MAX_WORKERS,
            database: DatabaseSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON or YAML file (chosen by extension)
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read settings file {}: {e}", path.display()))
        })?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        if is_yaml {
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Ok(serde_json::from_str(&content)?)
        }
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    ///
    /// Recognised keys: `SRC_BASE_DIR`, `TGT_BASE_DIR`, `DB_HOST`,
    /// `DB_PORT`, `DB_NAME`, `DB_USER`, `DB_PASS`.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("SRC_BASE_DIR") {
            self.src_base_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("TGT_BASE_DIR") {
            self.tgt_base_dir = PathBuf::from(dir);
        }
        if let Some(host) = lookup("DB_HOST") {
            self.database.host = host;
        }
        if let Some(port) = lookup("DB_PORT") {
            let port = port.trim().parse::<u16>().map_err(|e| Error::InvalidConfigValue {
                field: "DB_PORT".to_string(),
                message: e.to_string(),
            })?;
            self.database.port = Some(port);
        }
        if let Some(name) = lookup("DB_NAME") {
            self.database.name = Some(name);
        }
        if let Some(user) = lookup("DB_USER") {
            self.database.user = user;
        }
        if let Some(password) = lookup("DB_PASS") {
            self.database.password = password;
        }
        Ok(())
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfigValue {
                field: "chunk_size".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.max_workers == 0 {
            return Err(Error::InvalidConfigValue {
                field: "max_workers".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if !self.delimiter.is_ascii() {
            return Err(Error::InvalidConfigValue {
                field: "delimiter".to_string(),
                message: format!("'{}' is not a single-byte character", self.delimiter),
            });
        }
        Ok(())
    }

    /// Validate the database section for a load run
    pub fn validate_database(&self) -> Result<()> {
        if self.database.engine == DatabaseKind::Postgres && self.database.name.is_none() {
            return Err(Error::missing_field("database.name"));
        }
        Ok(())
    }

    /// Reader options derived from these settings
    pub fn read_options(&self) -> ReadOptions {
        ReadOptions::default()
            .with_delimiter(self.delimiter as u8)
            .with_chunk_size(self.chunk_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.chunk_size, 10_000);
        assert_eq!(settings.max_workers, 4);
        assert_eq!(settings.delimiter, ',');
        assert_eq!(settings.database.engine, DatabaseKind::Postgres);
        settings.validate().unwrap();
    }

    #[test]
    fn test_from_json_file_partial() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"src_base_dir": "/data/retail_db", "database": {"name": "retail_db", "port": 5452}}"#,
        )
        .unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.src_base_dir, PathBuf::from("/data/retail_db"));
        assert_eq!(settings.tgt_base_dir, PathBuf::from("data/tgt"));
        assert_eq!(settings.database.name.as_deref(), Some("retail_db"));
        assert_eq!(settings.database.port, Some(5452));
        assert_eq!(settings.database.host, "localhost");
    }

    #[test]
    fn test_from_yaml_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        fs::write(
            &path,
            "tgt_base_dir: /data/retail_db_json\nchunk_size: 500\ndatabase:\n  engine: duckdb\n  path: /data/retail.duckdb\n",
        )
        .unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.chunk_size, 500);
        assert_eq!(settings.database.engine, DatabaseKind::Duckdb);
        assert_eq!(
            settings.database.path,
            Some(PathBuf::from("/data/retail.duckdb"))
        );
    }

    #[test]
    fn test_from_file_missing() {
        let err = Settings::from_file(Path::new("/nonexistent/settings.json")).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings
            .apply_env_from(lookup(&[
                ("SRC_BASE_DIR", "/in"),
                ("TGT_BASE_DIR", "/out"),
                ("DB_HOST", "db.internal"),
                ("DB_PORT", "5452"),
                ("DB_NAME", "retail_db"),
                ("DB_USER", "retail_user"),
                ("DB_PASS", "secret"),
            ]))
            .unwrap();

        assert_eq!(settings.src_base_dir, PathBuf::from("/in"));
        assert_eq!(settings.tgt_base_dir, PathBuf::from("/out"));
        assert_eq!(settings.database.host, "db.internal");
        assert_eq!(settings.database.port, Some(5452));
        assert_eq!(settings.database.name.as_deref(), Some("retail_db"));
        assert_eq!(settings.database.user, "retail_user");
        assert_eq!(settings.database.password, "secret");
    }

    #[test]
    fn test_env_bad_port() {
        let mut settings = Settings::default();
        let err = settings
            .apply_env_from(lookup(&[("DB_PORT", "not-a-port")]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { ref field, .. } if field == "DB_PORT"));
    }

    #[test]
    fn test_validate_rejects_zero_chunk() {
        let settings = Settings {
            chunk_size: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let settings = Settings {
            max_workers: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_database_requires_name() {
        let settings = Settings::default();
        assert!(matches!(
            settings.validate_database(),
            Err(Error::MissingConfigField { .. })
        ));

        let mut duck = Settings::default();
        duck.database.engine = DatabaseKind::Duckdb;
        duck.validate_database().unwrap();
    }

    #[test]
    fn test_read_options() {
        let settings = Settings {
            delimiter: '|',
            chunk_size: 250,
            ..Settings::default()
        };
        let options = settings.read_options();
        assert_eq!(options.delimiter, b'|');
        assert_eq!(options.chunk_size, 250);
    }
}
