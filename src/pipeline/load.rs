//! Load orchestrator
//!
//! Loads datasets into database tables, one pool task per dataset. Each task
//! captures its own failure so sibling datasets are never affected.

use super::pool::WorkerPool;
use super::report::{DatasetReport, DatasetStats, RunKind, RunReport};
use super::selection::{plan_dispatch, select_datasets};
use crate::config::{Settings, DEFAULT_MAX_WORKERS};
use crate::database::{DatabaseEngine, TableLoader};
use crate::error::{Error, Result};
use crate::registry::SchemaRegistry;
use crate::source::{
    finalize_schema, infer_part_schema, locate_part_files, merge_schemas, read_part_chunks,
    PartFile, ReadOptions,
};
use arrow::datatypes::{Schema, SchemaRef};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Everything a load task needs, shared read-only across workers
struct LoadContext {
    registry: SchemaRegistry,
    src_base_dir: PathBuf,
    options: ReadOptions,
}

/// Loads CSV datasets into a database through a bounded worker pool
pub struct LoadOrchestrator {
    context: Arc<LoadContext>,
    max_workers: usize,
}

impl LoadOrchestrator {
    /// Create an orchestrator over an already loaded registry
    pub fn new(
        registry: SchemaRegistry,
        src_base_dir: impl Into<PathBuf>,
        options: ReadOptions,
    ) -> Self {
        Self {
            context: Arc::new(LoadContext {
                registry,
                src_base_dir: src_base_dir.into(),
                options,
            }),
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }

    /// Build from settings, loading `schemas.json` from the source directory
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        settings.validate_database()?;
        let registry = SchemaRegistry::load(&settings.src_base_dir)?;
        Ok(Self::new(registry, &settings.src_base_dir, settings.read_options())
            .with_max_workers(settings.max_workers))
    }

    /// Set the upper bound on concurrent dataset loads
    #[must_use]
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Open the target described by `settings` and load the requested datasets
    ///
    /// When the target cannot be opened every dataset is reported as failed.
    pub async fn run_with_settings(
        &self,
        settings: &Settings,
        requested: Option<&[String]>,
    ) -> RunReport {
        match DatabaseEngine::open(&settings.database) {
            Ok(engine) => self.run(Arc::new(engine), requested).await,
            Err(e) => {
                let message = e.to_string();
                let mut report = RunReport::new(RunKind::Load);
                for dataset in select_datasets(&self.context.registry, requested) {
                    tracing::error!("Error encountered {}: {}", dataset, message);
                    tracing::info!("Completed processing for {}", dataset);
                    report.push(DatasetReport::failed(dataset, message.as_str(), Duration::ZERO));
                }
                report
            }
        }
    }

    /// Load the requested datasets (all registry datasets when `None`)
    pub async fn run(
        &self,
        engine: Arc<DatabaseEngine>,
        requested: Option<&[String]>,
    ) -> RunReport {
        let datasets = select_datasets(&self.context.registry, requested);
        let (dispatch, rejected) = plan_dispatch(&datasets);

        let pool = WorkerPool::for_tasks(self.max_workers, dispatch.len());
        tracing::info!(
            "Loading {} datasets with {} workers into {}",
            dispatch.len(),
            pool.size(),
            engine.connection_info()
        );

        let context = Arc::clone(&self.context);
        let results = pool
            .run(dispatch.clone(), move |dataset: String| {
                Ok(process_dataset(&context, &engine, &dataset))
            })
            .await;

        let mut by_name: HashMap<String, DatasetReport> = HashMap::new();
        for (dataset, result) in dispatch.into_iter().zip(results) {
            let report = result.unwrap_or_else(|e| aborted_task_report(&dataset, &e));
            by_name.insert(dataset, report);
        }
        for report in rejected {
            by_name.insert(report.dataset.clone(), report);
        }

        let mut report = RunReport::new(RunKind::Load);
        for dataset in datasets {
            if let Some(entry) = by_name.remove(&dataset) {
                report.push(entry);
            }
        }
        report
    }
}

/// Run one dataset task, turning its result into a report
fn process_dataset(context: &LoadContext, engine: &DatabaseEngine, dataset: &str) -> DatasetReport {
    tracing::info!("Processing {}", dataset);
    let started = Instant::now();

    let report = match load_dataset(context, engine, dataset) {
        Ok(stats) => {
            tracing::info!(
                "Loaded {} rows in {} chunks into {}",
                stats.rows,
                stats.chunks,
                dataset
            );
            DatasetReport::completed(dataset, stats, started.elapsed())
        }
        Err(e) if e.is_not_found() => {
            tracing::warn!("Error processing {}: {}", dataset, e);
            DatasetReport::skipped(dataset, e.to_string(), started.elapsed())
        }
        Err(e) => {
            tracing::error!("Error encountered {}: {}", dataset, e);
            DatasetReport::failed(dataset, e.to_string(), started.elapsed())
        }
    };

    tracing::info!("Completed processing for {}", dataset);
    report
}

/// Report for a task that ended without producing its own report (a panic)
fn aborted_task_report(dataset: &str, err: &Error) -> DatasetReport {
    tracing::error!("Error encountered {}: {}", dataset, err);
    tracing::info!("Completed processing for {}", dataset);
    DatasetReport::failed(dataset, err.to_string(), Duration::ZERO)
}

/// Load every part-file of one dataset into its table
fn load_dataset(
    context: &LoadContext,
    engine: &DatabaseEngine,
    dataset: &str,
) -> Result<DatasetStats> {
    let files = locate_part_files(&context.src_base_dir, dataset)?;
    let columns = context.registry.resolve(dataset)?;

    let schema = dataset_schema(dataset, &files, &columns, &context.options)?;

    let mut loader = TableLoader::new(engine.connect()?, engine.table_ref(dataset));
    loader.initialize(&schema)?;

    for part in &files {
        tracing::info!("Processing {}", part.display_path());
        for (idx, chunk) in read_part_chunks(part, schema.clone(), &context.options)?.enumerate() {
            let chunk = chunk?;
            tracing::info!("Populating chunk {} of {}", idx, dataset);
            loader.append(&chunk)?;
        }
    }

    Ok(DatasetStats {
        files: files.len(),
        chunks: loader.chunks_loaded(),
        rows: loader.rows_loaded(),
    })
}

/// One schema for all part-files of a dataset
fn dataset_schema(
    dataset: &str,
    files: &[PartFile],
    columns: &[String],
    options: &ReadOptions,
) -> Result<SchemaRef> {
    let mut merged: Option<Schema> = None;
    for part in files {
        let inferred = infer_part_schema(part, columns, options)?;
        merged = Some(match merged {
            Some(previous) => merge_schemas(&previous, &inferred)?,
            None => inferred.as_ref().clone(),
        });
    }

    let merged = merged.ok_or_else(|| Error::no_files(dataset))?;
    Ok(finalize_schema(&merged))
}
