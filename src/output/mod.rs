//! Output module
//!
//! Writes converted part-files to the target directory.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Writing newline-delimited JSON from Arrow RecordBatches
//! - Writing Parquet files
//! - Laying out `{root}/{dataset}/{file_name}` destinations

mod exporter;
mod writer;

pub use exporter::{
    exporter_for, prepare_destination, BatchExporter, ExportFormat, JsonlExporter,
    ParquetExporter,
};
pub use writer::{JsonlWriter, ParquetWriter, ParquetWriterConfig};

#[cfg(test)]
mod tests;
