//! Headerless CSV reader
//!
//! Part-files have no header row. Fields are named positionally from the
//! resolved registry columns and typed by Arrow's CSV inference.

use super::locator::PartFile;
use crate::error::{Error, Result};
use arrow::compute::concat_batches;
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::fs::File;
use std::sync::Arc;

/// Rows per chunk when streaming a part-file
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Options shared by schema inference and reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Field delimiter
    pub delimiter: u8,
    /// Maximum rows per batch
    pub chunk_size: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ReadOptions {
    /// Set the field delimiter
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the chunk size (clamped to at least one row)
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    fn format(&self) -> Format {
        Format::default()
            .with_header(false)
            .with_delimiter(self.delimiter)
    }
}

/// Infer the schema of a part-file, naming fields from `columns`
///
/// The whole file is scanned. Columns without any value keep the `Null`
/// type so that [`merge_schemas`] can widen them from sibling files; a file
/// with no records gets an all-`Null` schema. A field count that differs
/// from `columns` is a [`Error::SchemaMismatch`].
pub fn infer_part_schema(
    part: &PartFile,
    columns: &[String],
    options: &ReadOptions,
) -> Result<SchemaRef> {
    let file = File::open(&part.path)?;
    let (inferred, records) = options
        .format()
        .infer_schema(file, None)
        .map_err(|e| Error::csv(part.display_path(), e.to_string()))?;

    if records == 0 {
        return Ok(Arc::new(null_schema(columns)));
    }

    if inferred.fields().len() != columns.len() {
        return Err(Error::SchemaMismatch {
            path: part.display_path(),
            expected: columns.len(),
            found: inferred.fields().len(),
        });
    }

    let fields: Vec<Field> = columns
        .iter()
        .zip(inferred.fields().iter())
        .map(|(name, field)| Field::new(name, field.data_type().clone(), true))
        .collect();

    Ok(Arc::new(Schema::new(fields)))
}

/// Replace `Null` column types with string so the schema can be read and stored
pub fn finalize_schema(schema: &Schema) -> SchemaRef {
    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .map(|field| {
            let data_type = match field.data_type() {
                DataType::Null => DataType::Utf8,
                other => other.clone(),
            };
            Field::new(field.name(), data_type, true)
        })
        .collect();
    Arc::new(Schema::new(fields))
}

/// Replace date and timestamp column types with string
///
/// Conversion passes temporal fields through exactly as written in the
/// part-file (`2013-07-25 00:00:00.0` stays as is).
pub fn temporals_as_text(schema: &Schema) -> SchemaRef {
    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .map(|field| {
            let data_type = match field.data_type() {
                DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => DataType::Utf8,
                other => other.clone(),
            };
            Field::new(field.name(), data_type, true)
        })
        .collect();
    Arc::new(Schema::new(fields))
}

/// Read a whole part-file into a single batch
pub fn read_part_file(
    part: &PartFile,
    schema: SchemaRef,
    options: &ReadOptions,
) -> Result<RecordBatch> {
    let schema = finalize_schema(&schema);
    let batches = read_part_chunks(part, schema.clone(), options)?.collect::<Result<Vec<_>>>()?;
    Ok(concat_batches(&schema, &batches)?)
}

/// Stream a part-file as batches of at most `options.chunk_size` rows
///
/// `Null` column types are read as strings.
pub fn read_part_chunks(
    part: &PartFile,
    schema: SchemaRef,
    options: &ReadOptions,
) -> Result<ChunkReader> {
    let file = File::open(&part.path)?;
    let inner = ReaderBuilder::new(finalize_schema(&schema))
        .with_format(options.format())
        .with_batch_size(options.chunk_size.max(1))
        .build(file)
        .map_err(|e| Error::csv(part.display_path(), e.to_string()))?;

    Ok(ChunkReader {
        inner,
        path: part.display_path(),
        chunks_read: 0,
    })
}

/// Lazy, forward-only sequence of chunks from one part-file
pub struct ChunkReader {
    inner: arrow::csv::Reader<File>,
    path: String,
    chunks_read: usize,
}

impl ChunkReader {
    /// Number of chunks yielded so far
    pub fn chunks_read(&self) -> usize {
        self.chunks_read
    }
}

impl Iterator for ChunkReader {
    type Item = Result<RecordBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        let batch = self.inner.next()?;
        self.chunks_read += 1;
        Some(batch.map_err(|e| Error::csv(&self.path, e.to_string())))
    }
}

/// Unify the inferred schemas of two part-files of the same dataset
///
/// Field names come from `a`. Matching types are kept, integer and float
/// widen to float, any other disagreement falls back to string.
pub fn merge_schemas(a: &Schema, b: &Schema) -> Result<Schema> {
    if a.fields().len() != b.fields().len() {
        return Err(Error::SchemaMismatch {
            path: "<merged schema>".to_string(),
            expected: a.fields().len(),
            found: b.fields().len(),
        });
    }

    let fields: Vec<Field> = a
        .fields()
        .iter()
        .zip(b.fields().iter())
        .map(|(left, right)| {
            Field::new(
                left.name(),
                merge_types(left.data_type(), right.data_type()),
                true,
            )
        })
        .collect();

    Ok(Schema::new(fields))
}

fn merge_types(a: &DataType, b: &DataType) -> DataType {
    match (a, b) {
        (x, y) if x == y => x.clone(),
        (DataType::Null, other) | (other, DataType::Null) => other.clone(),
        (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
            DataType::Float64
        }
        _ => DataType::Utf8,
    }
}

fn null_schema(columns: &[String]) -> Schema {
    Schema::new(
        columns
            .iter()
            .map(|name| Field::new(name, DataType::Null, true))
            .collect::<Vec<_>>(),
    )
}
