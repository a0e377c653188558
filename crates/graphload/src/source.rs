// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Row sources
//!
//! [`CsvSource`] decodes a delimited text file with arrow_csv. Opening the
//! source makes one full pass to infer the schema, which also rejects
//! malformed files before any row reaches the store. A second pass then
//! streams Arrow record batches and hands them out one [`Record`] at a time.
//!
//! Only integer, float and boolean columns are typed. Every other column is
//! read as text so dates and timestamps reach the store exactly as written.
//! Empty cells keep their column: they become NaN in numeric columns and an
//! empty string in text columns.

use crate::config::LoadConfig;
use crate::error::{LoadError, Result};
use crate::record::{Record, Value};
use arrow_array::cast::AsArray;
use arrow_array::types::{Float64Type, Int64Type};
use arrow_array::{Array, RecordBatch};
use arrow_csv::reader::{Format, Reader, ReaderBuilder};
use arrow_schema::{DataType, Field, Schema, SchemaRef};
use diagnostics::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Rows decoded per Arrow record batch. Independent of the store batch size.
const DECODE_BATCH_ROWS: usize = 1024;

/// A finite, re-openable sequence of records
pub trait RecordSource {
    type Rows: Iterator<Item = Result<Record>>;

    /// Start a fresh pass over the rows.
    ///
    /// Fails with [`LoadError::SourceRead`] when the source cannot be produced at all.
    fn open(&self) -> Result<Self::Rows>;
}

/// CSV file with a header row
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    delimiter: u8,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
        }
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Source named by `CREDS.FILE_PATH`, using `LOAD.DELIMITER`
    #[must_use]
    pub fn from_config(config: &LoadConfig) -> Self {
        Self::new(&config.creds.file_path).with_delimiter(config.delimiter_byte())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn format(&self) -> Format {
        Format::default()
            .with_header(true)
            .with_delimiter(self.delimiter)
    }

    fn open_file(&self) -> Result<File> {
        File::open(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LoadError::source_read(format!("File not found: {}", self.path.display()))
            } else {
                LoadError::source_read(format!("Failed to open {}: {e}", self.path.display()))
            }
        })
    }

    /// Infer column types from every row in the file
    fn infer_schema(&self) -> Result<(SchemaRef, usize)> {
        let file = self.open_file()?;
        let (schema, rows) = self.format().infer_schema(file, None).map_err(|e| {
            LoadError::source_read(format!(
                "Error parsing CSV file {}: {e}",
                self.path.display()
            ))
        })?;

        if schema.fields().is_empty() {
            return Err(LoadError::source_read(format!(
                "CSV file {} has no header row",
                self.path.display()
            )));
        }
        Ok((verbatim_schema(&schema), rows))
    }
}

/// Keep scalar types arrow_csv inferred; read every other column as text
fn verbatim_schema(inferred: &Schema) -> SchemaRef {
    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|field| match field.data_type() {
            DataType::Int64
            | DataType::Float64
            | DataType::Boolean
            | DataType::Utf8
            | DataType::Null => field.as_ref().clone(),
            _ => field.as_ref().clone().with_data_type(DataType::Utf8),
        })
        .collect();
    Arc::new(Schema::new(fields))
}

impl RecordSource for CsvSource {
    type Rows = CsvRows;

    fn open(&self) -> Result<CsvRows> {
        let (schema, row_count) = self.infer_schema()?;
        let path = self.path.display().to_string();
        let column_count = schema.fields().len();
        info!(
            "CSV data validated: {path} has {row_count} rows in {column_count} columns",
            path: path,
            row_count: row_count,
            column_count: column_count
        );

        let reader = ReaderBuilder::new(schema.clone())
            .with_format(self.format())
            .with_batch_size(DECODE_BATCH_ROWS)
            .build(self.open_file()?)
            .map_err(|e| LoadError::source_read(format!("Failed to create CSV reader: {e}")))?;

        let columns: Arc<[String]> = schema.fields().iter().map(|f| f.name().clone()).collect();

        Ok(CsvRows {
            reader,
            columns,
            current: None,
            next_row: 0,
        })
    }
}

/// Iterator over the records of an opened [`CsvSource`]
pub struct CsvRows {
    reader: Reader<File>,
    columns: Arc<[String]>,
    current: Option<RecordBatch>,
    next_row: usize,
}

impl CsvRows {
    /// Column names in header order
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    fn record_at(&self, batch: &RecordBatch, row: usize) -> Result<Record> {
        let values = batch
            .columns()
            .iter()
            .map(|array| cell_value(array.as_ref(), row))
            .collect::<Result<Vec<_>>>()?;

        Record::new(self.columns.clone(), values).ok_or_else(|| {
            LoadError::source_read(format!("Row {row} does not match the header width"))
        })
    }
}

impl Iterator for CsvRows {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let pending = self
                .current
                .as_ref()
                .is_some_and(|batch| self.next_row < batch.num_rows());
            if pending {
                let row = self.next_row;
                self.next_row += 1;
                let batch = self.current.as_ref()?;
                return Some(self.record_at(batch, row));
            }

            match self.reader.next()? {
                Ok(batch) => {
                    self.current = Some(batch);
                    self.next_row = 0;
                }
                Err(e) => {
                    self.current = None;
                    return Some(Err(LoadError::source_read(format!(
                        "Failed to read CSV batch: {e}"
                    ))));
                }
            }
        }
    }
}

/// Convert one Arrow cell to a scalar value
fn cell_value(array: &dyn Array, row: usize) -> Result<Value> {
    let data_type = array.data_type();
    if array.is_null(row) || *data_type == DataType::Null {
        return Ok(empty_cell(data_type));
    }

    let value = match data_type {
        DataType::Int64 => Value::Integer(array.as_primitive::<Int64Type>().value(row)),
        DataType::Float64 => Value::Float(array.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Value::Boolean(array.as_boolean().value(row)),
        DataType::Utf8 => Value::String(array.as_string::<i32>().value(row).to_string()),
        other => {
            return Err(LoadError::source_read(format!("Unexpected column type {other}")));
        }
    };
    Ok(value)
}

/// Value for an empty cell; never null, so the property survives `SET n = row`
fn empty_cell(data_type: &DataType) -> Value {
    match data_type {
        DataType::Utf8 => Value::String(String::new()),
        _ => Value::Float(f64::NAN),
    }
}
