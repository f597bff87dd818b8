//! Dataset exporters
//!
//! Place a batch at `{root}/{dataset}/{file_name}`, creating the dataset
//! directory when needed and overwriting any existing file.

use super::writer::{JsonlWriter, ParquetWriter, ParquetWriterConfig};
use crate::error::{Result, ResultExt};
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Output file format for converted datasets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Newline-delimited JSON (default)
    #[default]
    Jsonl,
    /// Parquet files
    Parquet,
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Jsonl => write!(f, "jsonl"),
            ExportFormat::Parquet => write!(f, "parquet"),
        }
    }
}

/// Writes one batch per output file
pub trait BatchExporter: Send + Sync {
    /// Export `batch` to `{root}/{dataset}/{file_name}`, returning rows written
    fn export(
        &self,
        batch: &RecordBatch,
        root: &Path,
        dataset: &str,
        file_name: &str,
    ) -> Result<usize>;

    /// Format produced by this exporter
    fn format(&self) -> ExportFormat;
}

/// Build the exporter for a format
pub fn exporter_for(format: ExportFormat) -> Box<dyn BatchExporter> {
    match format {
        ExportFormat::Jsonl => Box::new(JsonlExporter),
        ExportFormat::Parquet => Box::new(ParquetExporter::default()),
    }
}

/// Create `{root}/{dataset}` and return the destination file path
pub fn prepare_destination(root: &Path, dataset: &str, file_name: &str) -> Result<PathBuf> {
    let dir = root.join(dataset);
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    Ok(dir.join(file_name))
}

/// Newline-delimited JSON exporter
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonlExporter;

impl BatchExporter for JsonlExporter {
    fn export(
        &self,
        batch: &RecordBatch,
        root: &Path,
        dataset: &str,
        file_name: &str,
    ) -> Result<usize> {
        let path = prepare_destination(root, dataset, file_name)?;
        let mut writer = JsonlWriter::new(&path)?;
        writer.write(batch)?;
        let rows = writer.close()?;

        tracing::debug!("Wrote {} rows to {}", rows, path.display());
        Ok(rows)
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::Jsonl
    }
}

/// Parquet exporter
#[derive(Debug, Clone, Default)]
pub struct ParquetExporter {
    config: ParquetWriterConfig,
}

impl BatchExporter for ParquetExporter {
    fn export(
        &self,
        batch: &RecordBatch,
        root: &Path,
        dataset: &str,
        file_name: &str,
    ) -> Result<usize> {
        let path = prepare_destination(root, dataset, file_name)?;
        let mut writer = ParquetWriter::new(&path, batch.schema().as_ref(), &self.config)?;
        writer.write(batch)?;
        let rows = writer.close()?;

        tracing::debug!("Wrote {} rows to {}", rows, path.display());
        Ok(rows)
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::Parquet
    }
}
