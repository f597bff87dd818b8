//! Chunked table loader
//!
//! A loader walks through two phases for each dataset: `Initializing`, where
//! the table is dropped and recreated exactly once, then `Appending`, where
//! every chunk is inserted in its own transaction.

use crate::error::{Error, Result};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float64Type, Int64Type, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use duckdb::types::Value;
use duckdb::{params_from_iter, Connection};

use super::engine::quote_identifier;

/// Phase of a dataset's table load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// Table not yet (re)created
    Initializing,
    /// Table created, chunks are appended
    Appending,
}

/// Loads record batches into one table
pub struct TableLoader {
    conn: Connection,
    table: String,
    phase: LoadPhase,
    insert_sql: String,
    columns: usize,
    rows_loaded: usize,
    chunks_loaded: usize,
}

impl TableLoader {
    /// Create a loader for `table` (already qualified and quoted)
    pub fn new(conn: Connection, table: impl Into<String>) -> Self {
        Self {
            conn,
            table: table.into(),
            phase: LoadPhase::Initializing,
            insert_sql: String::new(),
            columns: 0,
            rows_loaded: 0,
            chunks_loaded: 0,
        }
    }

    /// Current phase
    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    /// Rows appended so far
    pub fn rows_loaded(&self) -> usize {
        self.rows_loaded
    }

    /// Non-empty chunks appended so far
    pub fn chunks_loaded(&self) -> usize {
        self.chunks_loaded
    }

    /// Drop and recreate the table for `schema`, then switch to appending
    pub fn initialize(&mut self, schema: &Schema) -> Result<()> {
        if self.phase != LoadPhase::Initializing {
            return Err(Error::database(format!(
                "Table {} is already initialized",
                self.table
            )));
        }

        let ddl = format!(
            "DROP TABLE IF EXISTS {table}; {create}",
            table = self.table,
            create = create_table_sql(&self.table, schema)
        );
        tracing::debug!("Executing: {}", ddl);

        self.conn
            .execute_batch(&ddl)
            .map_err(|e| Error::database(format!("Failed to create table {}: {e}", self.table)))?;

        self.insert_sql = insert_sql(&self.table, schema);
        self.columns = schema.fields().len();
        self.phase = LoadPhase::Appending;
        Ok(())
    }

    /// Insert every row of `batch`; returns the number of rows inserted
    pub fn append(&mut self, batch: &RecordBatch) -> Result<usize> {
        if self.phase != LoadPhase::Appending {
            return Err(Error::database(format!(
                "Table {} must be initialized before appending",
                self.table
            )));
        }

        if batch.num_columns() != self.columns {
            return Err(Error::database(format!(
                "Chunk has {} columns, table {} has {}",
                batch.num_columns(),
                self.table,
                self.columns
            )));
        }

        let rows = batch.num_rows();
        if rows == 0 {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&self.insert_sql)?;
            let mut values = Vec::with_capacity(self.columns);
            for row in 0..rows {
                values.clear();
                for column in batch.columns() {
                    values.push(cell_value(column.as_ref(), row));
                }
                stmt.execute(params_from_iter(values.iter()))?;
            }
        }
        tx.commit()?;

        self.rows_loaded += rows;
        self.chunks_loaded += 1;
        Ok(rows)
    }
}

/// SQL column type for an Arrow type
pub fn sql_type(data_type: &DataType) -> &'static str {
    match data_type {
        DataType::Boolean => "BOOLEAN",
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => "BIGINT",
        DataType::Float16 | DataType::Float32 | DataType::Float64 => "DOUBLE",
        DataType::Date32 | DataType::Date64 => "DATE",
        DataType::Timestamp(_, _) => "TIMESTAMP",
        _ => "VARCHAR",
    }
}

/// `CREATE TABLE` statement for a schema
pub fn create_table_sql(table: &str, schema: &Schema) -> String {
    let columns: Vec<String> = schema
        .fields()
        .iter()
        .map(|field| {
            format!(
                "{} {}",
                quote_identifier(field.name()),
                sql_type(field.data_type())
            )
        })
        .collect();
    format!("CREATE TABLE {table} ({})", columns.join(", "))
}

/// Parameterised `INSERT` statement for a schema
///
/// Date and timestamp values are bound as text and cast by the database.
pub fn insert_sql(table: &str, schema: &Schema) -> String {
    let names: Vec<String> = schema
        .fields()
        .iter()
        .map(|field| quote_identifier(field.name()))
        .collect();
    let placeholders: Vec<&str> = schema
        .fields()
        .iter()
        .map(|field| match sql_type(field.data_type()) {
            "DATE" => "CAST(? AS DATE)",
            "TIMESTAMP" => "CAST(? AS TIMESTAMP)",
            _ => "?",
        })
        .collect();
    format!(
        "INSERT INTO {table} ({}) VALUES ({})",
        names.join(", "),
        placeholders.join(", ")
    )
}

/// Convert one Arrow cell into a DuckDB parameter value
fn cell_value(array: &dyn Array, row: usize) -> Value {
    if array.is_null(row) {
        return Value::Null;
    }

    match array.data_type() {
        DataType::Null => Value::Null,
        DataType::Boolean => Value::Boolean(array.as_boolean().value(row)),
        DataType::Int64 => Value::BigInt(array.as_primitive::<Int64Type>().value(row)),
        DataType::Float64 => Value::Double(array.as_primitive::<Float64Type>().value(row)),
        DataType::Utf8 => Value::Text(array.as_string::<i32>().value(row).to_string()),
        _ => array_value_to_string(array, row).map_or(Value::Null, Value::Text),
    }
}
