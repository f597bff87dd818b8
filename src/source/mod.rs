//! Source module
//!
//! Locates the part-files of a dataset and parses them into Arrow
//! RecordBatches.
//!
//! # Overview
//!
//! - `locate_part_files` finds `{src}/{dataset}/part-*`
//! - `infer_part_schema` names and types the fields of a headerless file
//! - `temporals_as_text` keeps date and timestamp fields as written
//! - `read_part_file` reads a whole file into one batch
//! - `read_part_chunks` streams a file as bounded-size batches

mod locator;
mod reader;

pub use locator::{locate_part_files, PartFile, PART_FILE_PREFIX};
pub use reader::{
    finalize_schema, infer_part_schema, merge_schemas, read_part_chunks, read_part_file,
    temporals_as_text, ChunkReader, ReadOptions, DEFAULT_CHUNK_SIZE,
};
