//! Database target support via DuckDB
//!
//! This module provides the write path for the load tool, using DuckDB as the
//! engine. DuckDB writes to local database files directly and to PostgreSQL
//! through its postgres extension.

mod engine;
mod loader;

pub use engine::{mask_password, quote_identifier, DatabaseEngine, TARGET_CATALOG};
pub use loader::{create_table_sql, insert_sql, sql_type, LoadPhase, TableLoader};
