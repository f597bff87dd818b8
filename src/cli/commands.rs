//! CLI commands and argument parsing

use crate::output::ExportFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Convert and load partitioned CSV datasets
#[derive(Parser, Debug)]
#[command(name = "dataset-porter")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (JSON or YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding schemas.json and the dataset directories
    #[arg(long, global = true)]
    pub src_base_dir: Option<PathBuf>,

    /// Directory converted files are written under
    #[arg(long, global = true)]
    pub tgt_base_dir: Option<PathBuf>,

    /// Rows per chunk when loading
    #[arg(long, global = true)]
    pub chunk_size: Option<usize>,

    /// Output format of the run report
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert part-files into the target directory
    Convert {
        /// Datasets to convert (comma-separated, empty = all)
        datasets: Option<String>,

        /// File format written for each part-file
        #[arg(long, default_value = "jsonl")]
        export: ExportFormat,
    },

    /// Load part-files into database tables
    Load {
        /// Datasets to load (comma-separated, empty = all)
        datasets: Option<String>,

        /// Maximum datasets loaded at once
        #[arg(long)]
        workers: Option<usize>,
    },

    /// List registry datasets and their resolved columns
    Datasets,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON on one line
    Json,
    /// Human-readable JSON
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_convert() {
        let cli = Cli::parse_from([
            "dataset-porter",
            "--src-base-dir",
            "/data/src",
            "convert",
            "orders,customers",
            "--export",
            "parquet",
        ]);

        assert_eq!(cli.src_base_dir, Some(PathBuf::from("/data/src")));
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Convert { datasets, export } => {
                assert_eq!(datasets.as_deref(), Some("orders,customers"));
                assert_eq!(export, ExportFormat::Parquet);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_load_with_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "dataset-porter",
            "load",
            "--workers",
            "2",
            "--chunk-size",
            "500",
            "-f",
            "pretty",
            "-v",
        ]);

        assert_eq!(cli.chunk_size, Some(500));
        assert_eq!(cli.format, OutputFormat::Pretty);
        assert!(cli.verbose);
        match cli.command {
            Commands::Load { datasets, workers } => {
                assert_eq!(datasets, None);
                assert_eq!(workers, Some(2));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_convert_defaults_to_jsonl() {
        let cli = Cli::parse_from(["dataset-porter", "convert"]);
        assert!(matches!(
            cli.command,
            Commands::Convert {
                datasets: None,
                export: ExportFormat::Jsonl
            }
        ));
    }
}
