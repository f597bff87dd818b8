//! Schema registry module
//!
//! Loads `schemas.json` and resolves the ordered column names of a dataset.
//!
//! # Overview
//!
//! The registry maps each dataset name to a list of column descriptors.
//! Part-files carry no header row, so the resolved names are assigned to
//! fields purely by position.

mod types;

pub use types::{ColumnDescriptor, SchemaRegistry, REGISTRY_FILE_NAME};
