//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::Settings;
use crate::error::Result;
use crate::output::ExportFormat;
use crate::pipeline::{parse_dataset_list, ConvertOrchestrator, LoadOrchestrator};
use crate::registry::SchemaRegistry;
use serde::Serialize;
use serde_json::{json, Value};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Convert { datasets, export } => self.convert(datasets.as_deref(), *export),
            Commands::Load { datasets, .. } => self.load(datasets.as_deref()).await,
            Commands::Datasets => self.datasets(),
        }
    }

    /// Build settings: defaults, settings file, environment, then flags
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.cli.config {
            Some(path) => Settings::from_file(path)?,
            None => Settings::default(),
        };
        settings.apply_env()?;

        if let Some(dir) = &self.cli.src_base_dir {
            settings.src_base_dir.clone_from(dir);
        }
        if let Some(dir) = &self.cli.tgt_base_dir {
            settings.tgt_base_dir.clone_from(dir);
        }
        if let Some(chunk_size) = self.cli.chunk_size {
            settings.chunk_size = chunk_size;
        }
        if let Commands::Load {
            workers: Some(workers),
            ..
        } = &self.cli.command
        {
            settings.max_workers = *workers;
        }

        Ok(settings)
    }

    /// Convert datasets to the target directory
    fn convert(&self, datasets: Option<&str>, export: ExportFormat) -> Result<()> {
        let settings = self.settings()?;
        let requested = parse_dataset_list(datasets);

        tracing::info!(
            "Converting {} from {} to {}",
            export,
            settings.src_base_dir.display(),
            settings.tgt_base_dir.display()
        );

        let orchestrator = ConvertOrchestrator::from_settings(&settings, export)?;
        let report = orchestrator.run(requested.as_deref())?;

        self.output_message(&report);
        Ok(())
    }

    /// Load datasets into the configured database
    async fn load(&self, datasets: Option<&str>) -> Result<()> {
        let settings = self.settings()?;
        let requested = parse_dataset_list(datasets);

        let orchestrator = LoadOrchestrator::from_settings(&settings)?;
        let report = orchestrator
            .run_with_settings(&settings, requested.as_deref())
            .await;

        let failed = report.failed().count();
        if failed > 0 {
            tracing::warn!("{} of {} datasets failed to load", failed, report.datasets.len());
        }

        self.output_message(&report);
        Ok(())
    }

    /// List registry datasets with their resolved columns
    fn datasets(&self) -> Result<()> {
        let settings = self.settings()?;
        let registry = SchemaRegistry::load(&settings.src_base_dir)?;

        let datasets = registry
            .dataset_names()
            .into_iter()
            .map(|name| {
                let columns = registry.resolve(&name)?;
                Ok(json!({
                    "name": name,
                    "columns": columns
                }))
            })
            .collect::<Result<Vec<Value>>>()?;

        self.output_message(&json!({
            "type": "DATASETS",
            "datasets": datasets
        }));

        Ok(())
    }

    /// Output a message
    fn output_message<T: Serialize>(&self, msg: &T) {
        let rendered = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(msg),
            OutputFormat::Pretty => serde_json::to_string_pretty(msg),
        };
        println!("{}", rendered.unwrap_or_default());
    }
}
