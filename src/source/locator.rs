//! Dataset part-file discovery

use crate::error::{Error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File name prefix shared by every shard of a dataset
pub const PART_FILE_PREFIX: &str = "part-";

/// One shard of a dataset
///
/// The dataset name travels with the path so readers never have to recover
/// it from the directory layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartFile {
    /// Dataset this file belongs to
    pub dataset: String,
    /// Full path to the file
    pub path: PathBuf,
    /// Bare file name (e.g. `part-00000`)
    pub file_name: String,
}

impl PartFile {
    /// Create a part-file reference
    pub fn new(dataset: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            dataset: dataset.into(),
            path,
            file_name,
        }
    }

    /// Path rendered for messages
    pub fn display_path(&self) -> String {
        self.path.display().to_string()
    }
}

/// Find the part-files of a dataset, sorted by file name
///
/// A missing dataset directory and a directory without `part-*` files both
/// yield [`Error::NoFilesFound`].
pub fn locate_part_files(src_root: &Path, dataset: &str) -> Result<Vec<PartFile>> {
    let dir = src_root.join(dataset);

    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(Error::no_files(dataset)),
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if name.to_string_lossy().starts_with(PART_FILE_PREFIX) {
            files.push(PartFile::new(dataset, entry.path()));
        }
    }

    if files.is_empty() {
        return Err(Error::no_files(dataset));
    }

    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    tracing::debug!("Found {} part-files for {}", files.len(), dataset);

    Ok(files)
}
