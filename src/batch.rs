//! Arrow hand-off for finished tablets.
//!
//! Converts the timestamped rows of a tablet into a `RecordBatch`: a
//! non-null `Int64` timestamp field followed by one nullable field per
//! measurement, in schema order. Rows below `row_count` without a written
//! timestamp are skipped. Clear validity bits become Arrow nulls.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::{DataType as ArrowType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use bitvec::slice::BitSlice;

use crate::column::{Column, ColumnValues};
use crate::error::Result;
use crate::schema::{DataType, MeasurementSchema};
use crate::tablet::Tablet;

/// Name of the timestamp field in produced record batches.
pub const TIMESTAMP_FIELD: &str = "timestamp";

impl From<DataType> for ArrowType {
    fn from(data_type: DataType) -> Self {
        match data_type {
            DataType::Boolean => ArrowType::Boolean,
            DataType::Int32 => ArrowType::Int32,
            DataType::Int64 => ArrowType::Int64,
            DataType::Float => ArrowType::Float32,
            DataType::Double => ArrowType::Float64,
            DataType::Text => ArrowType::Utf8,
        }
    }
}

/// Arrow schema matching `to_record_batch` output for `schema`.
pub fn arrow_schema(schema: &[MeasurementSchema]) -> SchemaRef {
    let mut fields = Vec::with_capacity(schema.len() + 1);
    fields.push(Field::new(TIMESTAMP_FIELD, ArrowType::Int64, false));
    for measurement in schema {
        fields.push(Field::new(
            &measurement.name,
            measurement.data_type.into(),
            true,
        ));
    }
    Arc::new(Schema::new(fields))
}

impl Tablet {
    /// Build a record batch from the rows that have a written timestamp.
    ///
    /// # Errors
    ///
    /// - `Error::Arrow`: arrow rejected the assembled columns
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let rows: Vec<usize> = self.timestamped_rows().collect();
        let timestamps = self.timestamps();
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(self.column_count() + 1);
        arrays.push(Arc::new(Int64Array::from_iter_values(
            rows.iter().map(|&row| timestamps[row]),
        )));
        for column in self.columns() {
            arrays.push(column_array(column, &rows));
        }
        let batch = RecordBatch::try_new(arrow_schema(self.schema()), arrays)?;
        log::debug!(
            "built record batch: {} rows x {} columns",
            batch.num_rows(),
            batch.num_columns()
        );
        Ok(batch)
    }
}

fn column_array(column: &Column, rows: &[usize]) -> ArrayRef {
    let validity = column.validity();
    match column.values() {
        ColumnValues::Boolean(v) => Arc::new(BooleanArray::from(cells(v, validity, rows, |x| *x))),
        ColumnValues::Int32(v) => Arc::new(Int32Array::from(cells(v, validity, rows, |x| *x))),
        ColumnValues::Int64(v) => Arc::new(Int64Array::from(cells(v, validity, rows, |x| *x))),
        ColumnValues::Float(v) => Arc::new(Float32Array::from(cells(v, validity, rows, |x| *x))),
        ColumnValues::Double(v) => Arc::new(Float64Array::from(cells(v, validity, rows, |x| *x))),
        ColumnValues::Text(v) => {
            Arc::new(StringArray::from(cells(v, validity, rows, |x| x.as_str())))
        }
    }
}

fn cells<'a, T, U>(
    values: &'a [T],
    validity: &BitSlice,
    rows: &[usize],
    map: impl Fn(&'a T) -> U,
) -> Vec<Option<U>> {
    rows.iter()
        .map(|&row| validity[row].then(|| map(&values[row])))
        .collect()
}
