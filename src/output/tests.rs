//! Tests for output module

use super::*;
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

fn orders_batch() -> RecordBatch {
    let schema = Schema::new(vec![
        Field::new("id", DataType::Int64, true),
        Field::new("amount", DataType::Float64, true),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(vec![1, 2])),
        Arc::new(Float64Array::from(vec![9.99, 19.50])),
    ];
    RecordBatch::try_new(Arc::new(schema), columns).unwrap()
}

fn read_lines(path: &std::path::Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

// ============================================================================
// JSON Lines Writer Tests
// ============================================================================

#[test]
fn test_jsonl_writer_rows_written() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.json");

    let mut writer = JsonlWriter::new(&path).unwrap();
    writer.write(&orders_batch()).unwrap();
    assert_eq!(writer.rows_written(), 2);
    writer.write(&orders_batch()).unwrap();

    let rows = writer.close().unwrap();
    assert_eq!(rows, 4);
    assert_eq!(read_lines(&path).len(), 4);
}

#[test]
fn test_jsonl_writer_field_order_follows_schema() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.json");

    let mut writer = JsonlWriter::new(&path).unwrap();
    writer.write(&orders_batch()).unwrap();
    writer.close().unwrap();

    assert_eq!(
        read_lines(&path),
        vec![r#"{"id":1,"amount":9.99}"#, r#"{"id":2,"amount":19.5}"#]
    );
}

#[test]
fn test_jsonl_writer_explicit_nulls() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.json");

    let schema = Schema::new(vec![
        Field::new("name", DataType::Utf8, true),
        Field::new("active", DataType::Boolean, true),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec![Some("Alice"), None])),
        Arc::new(BooleanArray::from(vec![None, Some(true)])),
    ];
    let batch = RecordBatch::try_new(Arc::new(schema), columns).unwrap();

    let mut writer = JsonlWriter::new(&path).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let records: Vec<Value> = read_lines(&path)
        .iter()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records[0], json!({"name": "Alice", "active": null}));
    assert_eq!(records[1], json!({"name": null, "active": true}));
}

// ============================================================================
// Parquet Writer Config Tests
// ============================================================================

#[test]
fn test_parquet_writer_config_default() {
    let config = ParquetWriterConfig::default();
    assert_eq!(config.row_group_size(), crate::source::DEFAULT_CHUNK_SIZE);
}

#[test]
fn test_parquet_writer_config_builder() {
    let config = ParquetWriterConfig::new()
        .with_row_group_size(500)
        .with_compression(parquet::basic::Compression::UNCOMPRESSED);
    assert_eq!(config.row_group_size(), 500);
}

// ============================================================================
// Exporter Tests
// ============================================================================

#[test]
fn test_jsonl_exporter_creates_dataset_directory() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("retail_db_json");

    let rows = JsonlExporter
        .export(&orders_batch(), &target, "orders", "part-0001")
        .unwrap();

    assert_eq!(rows, 2);
    let path = target.join("orders").join("part-0001");
    assert!(path.is_file());
    assert_eq!(read_lines(&path).len(), 2);
}

#[test]
fn test_jsonl_exporter_overwrites_existing_file() {
    let dir = tempdir().unwrap();
    let path = prepare_destination(dir.path(), "orders", "part-0001").unwrap();
    fs::write(&path, "stale\nstale\nstale\nstale\n").unwrap();

    JsonlExporter
        .export(&orders_batch(), dir.path(), "orders", "part-0001")
        .unwrap();

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|line| line.starts_with('{')));
}

#[test]
fn test_prepare_destination_is_idempotent() {
    let dir = tempdir().unwrap();
    let first = prepare_destination(dir.path(), "orders", "a").unwrap();
    let second = prepare_destination(dir.path(), "orders", "b").unwrap();

    assert_eq!(first.parent(), second.parent());
    assert!(dir.path().join("orders").is_dir());
}

#[test]
fn test_parquet_exporter_round_trip() {
    let dir = tempdir().unwrap();

    let rows = ParquetExporter::default()
        .export(&orders_batch(), dir.path(), "orders", "part-0001")
        .unwrap();
    assert_eq!(rows, 2);

    let file = fs::File::open(dir.path().join("orders").join("part-0001")).unwrap();
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .unwrap()
        .build()
        .unwrap();
    let batches: Vec<RecordBatch> = reader.map(|b| b.unwrap()).collect();

    let total: usize = batches.iter().map(RecordBatch::num_rows).sum();
    assert_eq!(total, 2);
    assert_eq!(batches[0].schema().field(0).name(), "id");
}

#[test]
fn test_exporter_for_format() {
    assert_eq!(exporter_for(ExportFormat::Jsonl).format(), ExportFormat::Jsonl);
    assert_eq!(
        exporter_for(ExportFormat::Parquet).format(),
        ExportFormat::Parquet
    );
    assert_eq!(ExportFormat::default(), ExportFormat::Jsonl);
    assert_eq!(ExportFormat::Parquet.to_string(), "parquet");
}
