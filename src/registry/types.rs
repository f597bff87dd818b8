//! Schema registry types

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

/// File name of the registry inside the source directory
pub const REGISTRY_FILE_NAME: &str = "schemas.json";

/// One column of a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name, unique within the dataset
    pub column_name: String,
    /// Sort key for the column, unique within the dataset
    pub column_position: u32,
}

impl ColumnDescriptor {
    /// Create a new column descriptor
    pub fn new(name: impl Into<String>, position: u32) -> Self {
        Self {
            column_name: name.into(),
            column_position: position,
        }
    }
}

/// Mapping of dataset name to its column descriptors
///
/// Datasets iterate in ascending name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaRegistry {
    datasets: BTreeMap<String, Vec<ColumnDescriptor>>,
}

impl SchemaRegistry {
    /// Load `{src_base_dir}/schemas.json`
    pub fn load(src_base_dir: impl AsRef<Path>) -> Result<Self> {
        let path = src_base_dir.as_ref().join(REGISTRY_FILE_NAME);
        Self::from_file(&path)
    }

    /// Load a registry from an explicit path
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read schema registry {}: {e}",
                path.display()
            ))
        })?;
        let registry = Self::from_str(&content)?;

        tracing::debug!(
            "Loaded schema registry {} with {} datasets",
            path.display(),
            registry.len()
        );

        Ok(registry)
    }

    /// Parse a registry document
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Register (or replace) a dataset
    pub fn insert(&mut self, dataset: impl Into<String>, columns: Vec<ColumnDescriptor>) {
        self.datasets.insert(dataset.into(), columns);
    }

    /// Raw descriptors of a dataset, in document order
    pub fn columns(&self, dataset: &str) -> Option<&[ColumnDescriptor]> {
        self.datasets.get(dataset).map(Vec::as_slice)
    }

    /// Whether the registry has an entry for the dataset
    pub fn contains(&self, dataset: &str) -> bool {
        self.datasets.contains_key(dataset)
    }

    /// All dataset names
    pub fn dataset_names(&self) -> Vec<String> {
        self.datasets.keys().cloned().collect()
    }

    /// Number of datasets
    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// Resolve the column names of a dataset ordered by ascending position
    ///
    /// Fails with [`Error::SchemaNotFound`] when the dataset has no entry and
    /// with [`Error::InvalidSchema`] when names or positions repeat.
    pub fn resolve(&self, dataset: &str) -> Result<Vec<String>> {
        let descriptors = self
            .datasets
            .get(dataset)
            .ok_or_else(|| Error::schema_not_found(dataset))?;

        let mut names = HashSet::with_capacity(descriptors.len());
        let mut positions = HashSet::with_capacity(descriptors.len());
        for column in descriptors {
            if !names.insert(column.column_name.as_str()) {
                return Err(Error::invalid_schema(
                    dataset,
                    format!("duplicate column name '{}'", column.column_name),
                ));
            }
            if !positions.insert(column.column_position) {
                return Err(Error::invalid_schema(
                    dataset,
                    format!("duplicate column position {}", column.column_position),
                ));
            }
        }

        let mut sorted: Vec<&ColumnDescriptor> = descriptors.iter().collect();
        sorted.sort_by_key(|column| column.column_position);

        Ok(sorted
            .into_iter()
            .map(|column| column.column_name.clone())
            .collect())
    }
}
