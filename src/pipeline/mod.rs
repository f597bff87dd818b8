//! Pipeline module
//!
//! The two tools built from the lower layers.
//!
//! # Overview
//!
//! - [`ConvertOrchestrator`] walks datasets one at a time and writes every
//!   part-file to the target directory
//! - [`LoadOrchestrator`] fans datasets out over a [`WorkerPool`] and streams
//!   each one into its own table
//!
//! Both produce a [`RunReport`] with one entry per dataset.

mod convert;
mod load;
mod pool;
mod report;
mod selection;

pub use convert::ConvertOrchestrator;
pub use load::LoadOrchestrator;
pub use pool::WorkerPool;
pub use report::{DatasetReport, DatasetStats, DatasetStatus, RunKind, RunReport};
pub use selection::{parse_dataset_list, plan_dispatch, select_datasets};
