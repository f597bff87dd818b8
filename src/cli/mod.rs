//! CLI module
//!
//! Command-line interface for the conversion and load tools.
//!
//! # Commands
//!
//! - `convert` - Write part-files as JSON lines (or Parquet)
//! - `load` - Bulk-load part-files into database tables
//! - `datasets` - List registry datasets and their columns

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
