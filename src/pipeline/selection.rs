//! Dataset selection and dispatch planning

use super::report::DatasetReport;
use crate::error::Error;
use crate::registry::SchemaRegistry;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Parse a comma-separated dataset argument
///
/// Entries are trimmed and empty entries dropped. Returns `None` when nothing
/// is left, which means "every dataset in the registry".
pub fn parse_dataset_list(arg: Option<&str>) -> Option<Vec<String>> {
    let names: Vec<String> = arg?
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect();

    (!names.is_empty()).then_some(names)
}

/// Datasets a run should process, in request order without repeats
pub fn select_datasets(registry: &SchemaRegistry, requested: Option<&[String]>) -> Vec<String> {
    let Some(requested) = requested.filter(|names| !names.is_empty()) else {
        return registry.dataset_names();
    };

    let mut seen = HashSet::new();
    let mut selected = Vec::with_capacity(requested.len());
    for name in requested {
        if seen.insert(name.as_str()) {
            selected.push(name.clone());
        } else {
            tracing::warn!("Dataset {} requested more than once; processing it once", name);
        }
    }
    selected
}

/// Split datasets into those safe to load concurrently and those whose
/// table name collides with an earlier dataset
///
/// Table names are compared case-insensitively, matching how DuckDB
/// resolves identifiers.
pub fn plan_dispatch(datasets: &[String]) -> (Vec<String>, Vec<DatasetReport>) {
    let mut owners: HashMap<String, &str> = HashMap::new();
    let mut dispatch = Vec::with_capacity(datasets.len());
    let mut rejected = Vec::new();

    for dataset in datasets {
        let key = dataset.to_lowercase();
        if let Some(owner) = owners.get(&key) {
            let err = Error::TableCollision {
                dataset: dataset.clone(),
                other: (*owner).to_string(),
                table: dataset.clone(),
            };
            tracing::error!("Error encountered {}: {}", dataset, err);
            rejected.push(DatasetReport::failed(
                dataset.as_str(),
                err.to_string(),
                Duration::ZERO,
            ));
        } else {
            owners.insert(key, dataset.as_str());
            dispatch.push(dataset.clone());
        }
    }

    (dispatch, rejected)
}
