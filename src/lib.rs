// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]

//! # dataset-porter
//!
//! Moves partitioned, headerless CSV datasets into JSON lines files or
//! database tables, naming columns from a shared schema registry.
//!
//! ## Features
//!
//! - **Schema Registry**: `schemas.json` maps each dataset to positioned column names
//! - **Conversion**: every `part-*` file becomes a JSON lines (or Parquet) file
//! - **Bulk Load**: datasets stream into tables in fixed-size chunks, several at once
//! - **Targets**: PostgreSQL (through DuckDB's postgres extension) or a DuckDB file
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dataset_porter::config::Settings;
//! use dataset_porter::output::ExportFormat;
//! use dataset_porter::pipeline::ConvertOrchestrator;
//!
//! fn main() -> dataset_porter::Result<()> {
//!     let settings = Settings::default();
//!     let orchestrator = ConvertOrchestrator::from_settings(&settings, ExportFormat::Jsonl)?;
//!     let report = orchestrator.run(None)?;
//!     println!("{} rows converted", report.total_rows());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Pipeline                             │
//! │  ConvertOrchestrator (sequential)   LoadOrchestrator (pool)  │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌──────────────┬──────────────┴───────────┬───────────────────┐
//! │   Registry   │          Source          │  Output / Database│
//! ├──────────────┼──────────────────────────┼───────────────────┤
//! │ schemas.json │ part-* locator           │ JSON lines        │
//! │ resolve      │ CSV reader (whole/chunk) │ Parquet           │
//! │              │ type inference           │ TableLoader       │
//! └──────────────┴──────────────────────────┴───────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Run settings
pub mod config;

/// Schema registry and column resolution
pub mod registry;

/// Part-file discovery and CSV reading
pub mod source;

/// JSON lines and Parquet output
pub mod output;

/// Database targets via DuckDB
pub mod database;

/// Conversion and load orchestration
pub mod pipeline;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
