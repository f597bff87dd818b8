//! Run reports
//!
//! Every dataset of a run ends up with exactly one [`DatasetReport`]. Load
//! workers send theirs back to the orchestrator instead of only logging.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Counters collected while processing one dataset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatasetStats {
    /// Part-files processed
    pub files: usize,
    /// Batches written (one per file when converting)
    pub chunks: usize,
    /// Rows written
    pub rows: usize,
}

/// Outcome of one dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DatasetStatus {
    /// All part-files processed
    Completed,
    /// Nothing to do (no part-files)
    Skipped {
        /// Why nothing was processed
        reason: String,
    },
    /// Processing stopped with an error
    Failed {
        /// Error that stopped processing
        error: String,
    },
}

/// Report for one dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetReport {
    /// Dataset name
    pub dataset: String,
    /// Outcome, serialized inline as `status`
    #[serde(flatten)]
    pub status: DatasetStatus,
    /// Part-files processed
    pub files: usize,
    /// Batches written
    pub chunks: usize,
    /// Rows written
    pub rows: usize,
    /// Wall-clock time spent on the dataset
    pub elapsed_ms: u64,
}

impl DatasetReport {
    /// Report for a dataset whose part-files were all processed
    pub fn completed(dataset: impl Into<String>, stats: DatasetStats, elapsed: Duration) -> Self {
        Self {
            dataset: dataset.into(),
            status: DatasetStatus::Completed,
            files: stats.files,
            chunks: stats.chunks,
            rows: stats.rows,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    /// Report for a dataset with nothing to process
    pub fn skipped(dataset: impl Into<String>, reason: impl Into<String>, elapsed: Duration) -> Self {
        Self::empty(
            dataset,
            DatasetStatus::Skipped {
                reason: reason.into(),
            },
            elapsed,
        )
    }

    /// Report for a dataset that stopped with an error
    pub fn failed(dataset: impl Into<String>, error: impl Into<String>, elapsed: Duration) -> Self {
        Self::empty(
            dataset,
            DatasetStatus::Failed {
                error: error.into(),
            },
            elapsed,
        )
    }

    fn empty(dataset: impl Into<String>, status: DatasetStatus, elapsed: Duration) -> Self {
        Self {
            dataset: dataset.into(),
            status,
            files: 0,
            chunks: 0,
            rows: 0,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    /// Whether the dataset completed
    pub fn is_completed(&self) -> bool {
        matches!(self.status, DatasetStatus::Completed)
    }

    /// Whether the dataset was skipped
    pub fn is_skipped(&self) -> bool {
        matches!(self.status, DatasetStatus::Skipped { .. })
    }

    /// Whether the dataset failed
    pub fn is_failed(&self) -> bool {
        matches!(self.status, DatasetStatus::Failed { .. })
    }
}

/// Which tool produced a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    /// CSV to JSON lines (or Parquet)
    Convert,
    /// CSV to database tables
    Load,
}

/// Aggregated outcome of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Tool that produced the report
    pub kind: RunKind,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// One entry per dataset, in request order
    pub datasets: Vec<DatasetReport>,
}

impl RunReport {
    /// Start an empty report stamped with the current time
    pub fn new(kind: RunKind) -> Self {
        Self {
            kind,
            started_at: Utc::now(),
            datasets: Vec::new(),
        }
    }

    /// Append a dataset report
    pub fn push(&mut self, report: DatasetReport) {
        self.datasets.push(report);
    }

    /// Report for a dataset, if it was part of the run
    pub fn get(&self, dataset: &str) -> Option<&DatasetReport> {
        self.datasets.iter().find(|r| r.dataset == dataset)
    }

    /// Datasets that completed
    pub fn completed(&self) -> impl Iterator<Item = &DatasetReport> {
        self.datasets.iter().filter(|r| r.is_completed())
    }

    /// Datasets that were skipped
    pub fn skipped(&self) -> impl Iterator<Item = &DatasetReport> {
        self.datasets.iter().filter(|r| r.is_skipped())
    }

    /// Datasets that failed
    pub fn failed(&self) -> impl Iterator<Item = &DatasetReport> {
        self.datasets.iter().filter(|r| r.is_failed())
    }

    /// Rows written across all datasets
    pub fn total_rows(&self) -> usize {
        self.datasets.iter().map(|r| r.rows).sum()
    }
}
