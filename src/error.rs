//! Error types for dataset-porter
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for dataset-porter
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Schema Registry Errors
    // ============================================================================
    #[error("Dataset '{dataset}' not found in schema registry")]
    SchemaNotFound { dataset: String },

    #[error("Invalid schema for dataset '{dataset}': {message}")]
    InvalidSchema { dataset: String, message: String },

    // ============================================================================
    // Source Errors
    // ============================================================================
    #[error("No files found for {dataset}")]
    NoFilesFound { dataset: String },

    #[error("Schema mismatch in '{path}': expected {expected} columns, found {found}")]
    SchemaMismatch {
        path: String,
        expected: usize,
        found: usize,
    },

    #[error("CSV parsing error in '{path}': {message}")]
    CsvParse { path: String, message: String },

    // ============================================================================
    // Arrow/Parquet Errors
    // ============================================================================
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Output error: {message}")]
    Output { message: String },

    // ============================================================================
    // Database Errors
    // ============================================================================
    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Table '{table}' for dataset '{dataset}' collides with dataset '{other}'")]
    TableCollision {
        dataset: String,
        other: String,
        table: String,
    },

    // ============================================================================
    // Worker Errors
    // ============================================================================
    #[error("Worker panicked: {message}")]
    WorkerPanic { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl From<duckdb::Error> for Error {
    fn from(err: duckdb::Error) -> Self {
        Self::Database {
            message: err.to_string(),
        }
    }
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create a schema-not-found error
    pub fn schema_not_found(dataset: impl Into<String>) -> Self {
        Self::SchemaNotFound {
            dataset: dataset.into(),
        }
    }

    /// Create an invalid schema error
    pub fn invalid_schema(dataset: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            dataset: dataset.into(),
            message: message.into(),
        }
    }

    /// Create a no-files-found error
    pub fn no_files(dataset: impl Into<String>) -> Self {
        Self::NoFilesFound {
            dataset: dataset.into(),
        }
    }

    /// Create a CSV parse error
    pub fn csv(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CsvParse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Create a database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// Whether this is the "no part-files" condition that orchestrators skip past
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NoFilesFound { .. })
    }
}

/// Result type alias for dataset-porter
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
