//! Conversion orchestrator
//!
//! Sequentially converts each requested dataset's part-files into the
//! target directory. A dataset without part-files is skipped; any other
//! error ends the run.

use super::report::{DatasetReport, DatasetStats, RunKind, RunReport};
use super::selection::select_datasets;
use crate::config::Settings;
use crate::error::Result;
use crate::output::{exporter_for, BatchExporter, ExportFormat};
use crate::registry::SchemaRegistry;
use crate::source::{
    infer_part_schema, locate_part_files, read_part_file, temporals_as_text, ReadOptions,
};
use std::path::PathBuf;
use std::time::Instant;

/// Converts CSV datasets into JSON lines (or Parquet)
pub struct ConvertOrchestrator {
    registry: SchemaRegistry,
    src_base_dir: PathBuf,
    tgt_base_dir: PathBuf,
    options: ReadOptions,
    exporter: Box<dyn BatchExporter>,
}

impl ConvertOrchestrator {
    /// Create an orchestrator over an already loaded registry
    pub fn new(
        registry: SchemaRegistry,
        src_base_dir: impl Into<PathBuf>,
        tgt_base_dir: impl Into<PathBuf>,
        options: ReadOptions,
        format: ExportFormat,
    ) -> Self {
        Self {
            registry,
            src_base_dir: src_base_dir.into(),
            tgt_base_dir: tgt_base_dir.into(),
            options,
            exporter: exporter_for(format),
        }
    }

    /// Build from settings, loading `schemas.json` from the source directory
    pub fn from_settings(settings: &Settings, format: ExportFormat) -> Result<Self> {
        settings.validate()?;
        let registry = SchemaRegistry::load(&settings.src_base_dir)?;
        Ok(Self::new(
            registry,
            &settings.src_base_dir,
            &settings.tgt_base_dir,
            settings.read_options(),
            format,
        ))
    }

    /// Convert the requested datasets (all registry datasets when `None`)
    pub fn run(&self, requested: Option<&[String]>) -> Result<RunReport> {
        let datasets = select_datasets(&self.registry, requested);
        let mut report = RunReport::new(RunKind::Convert);

        for dataset in datasets {
            tracing::info!("Processing {}", dataset);
            let started = Instant::now();

            match self.convert_dataset(&dataset) {
                Ok(stats) => {
                    tracing::info!(
                        "Converted {} rows from {} files of {}",
                        stats.rows,
                        stats.files,
                        dataset
                    );
                    report.push(DatasetReport::completed(dataset, stats, started.elapsed()));
                }
                Err(e) if e.is_not_found() => {
                    tracing::warn!("Error processing {}: {}", dataset, e);
                    report.push(DatasetReport::skipped(
                        dataset,
                        e.to_string(),
                        started.elapsed(),
                    ));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }

    /// Convert every part-file of one dataset
    pub fn convert_dataset(&self, dataset: &str) -> Result<DatasetStats> {
        let files = locate_part_files(&self.src_base_dir, dataset)?;
        let columns = self.registry.resolve(dataset)?;

        let mut stats = DatasetStats::default();
        for part in &files {
            tracing::info!("Processing {}", part.display_path());

            let inferred = infer_part_schema(part, &columns, &self.options)?;
            let schema = temporals_as_text(&inferred);
            let batch = read_part_file(part, schema, &self.options)?;
            let rows =
                self.exporter
                    .export(&batch, &self.tgt_base_dir, &part.dataset, &part.file_name)?;

            stats.files += 1;
            stats.chunks += 1;
            stats.rows += rows;
        }

        Ok(stats)
    }
}
