//! Fixed-capacity columnar row batch for a single device.
//!
//! A [`Tablet`] binds one timestamp column to one typed column per
//! measurement. All storage is allocated up front from the schema and the
//! row capacity; filling happens in place by `(row, column)` coordinate and
//! the tablet never grows. Storage is released when the tablet is dropped.
//!
//! # Example
//!
//! ```
//! use tablet::{DataType, MeasurementSchema, Tablet};
//!
//! let schema = vec![
//!     MeasurementSchema::new("temperature", DataType::Double),
//!     MeasurementSchema::new("status", DataType::Boolean),
//! ];
//! let mut tablet = Tablet::new(schema, 128)?;
//!
//! tablet.set_timestamp(0, 1_700_000_000_000)?;
//! tablet.set_value(0, "temperature", 21.5f64)?;
//! tablet.set_value(0, 1usize, true)?;
//!
//! assert_eq!(tablet.row_count(), 1);
//! assert!(!tablet.is_null(0, "status")?);
//! # Ok::<(), tablet::Error>(())
//! ```

use std::collections::HashMap;

use bitvec::prelude::*;

use crate::column::Column;
use crate::config::TabletConfig;
use crate::error::{Error, Result};
use crate::schema::{build_name_index, MeasurementSchema};
use crate::value::{ColumnSelector, Value};

/// Columnar batch of timestamped rows for one device.
#[derive(Debug, Clone)]
pub struct Tablet {
    device_id: Option<String>,
    schema: Vec<MeasurementSchema>,
    name_index: HashMap<String, usize>,
    timestamps: Vec<i64>,
    timestamp_set: BitVec,
    columns: Vec<Column>,
    row_count: usize,
    config: TabletConfig,
}

/// Owned contents of a finished tablet, handed to a serializer.
///
/// Arrays keep their full capacity; only rows `[0, row_count)` are in use,
/// and among those only rows with a set `timestamp_validity` bit.
#[derive(Debug, Clone)]
pub struct TabletParts {
    pub device_id: Option<String>,
    pub schema: Vec<MeasurementSchema>,
    pub timestamps: Vec<i64>,
    pub timestamp_validity: BitVec,
    pub columns: Vec<Column>,
    pub row_count: usize,
}

impl Tablet {
    /// Allocate a tablet with `capacity` rows and row-checked writes.
    ///
    /// # Errors
    ///
    /// - `Error::ZeroCapacity`: `capacity` is 0
    /// - `Error::EmptySchema`: `schema` has no measurements
    /// - `Error::DuplicateMeasurement`: two measurements share a name
    pub fn new(schema: Vec<MeasurementSchema>, capacity: usize) -> Result<Self> {
        Self::with_config(schema, TabletConfig::default().with_max_rows(capacity))
    }

    /// Allocate a tablet from a configuration.
    ///
    /// # Errors
    ///
    /// - `Error::ZeroCapacity`: `config.max_rows` is 0
    /// - `Error::EmptySchema`: `schema` has no measurements
    /// - `Error::DuplicateMeasurement`: two measurements share a name
    pub fn with_config(schema: Vec<MeasurementSchema>, config: TabletConfig) -> Result<Self> {
        if config.max_rows == 0 {
            return Err(Error::ZeroCapacity);
        }
        let name_index = build_name_index(&schema)?;
        let capacity = config.max_rows;

        let columns: Vec<Column> = schema
            .iter()
            .map(|measurement| Column::new(measurement.data_type, capacity))
            .collect();

        let fixed_bytes: usize = schema
            .iter()
            .filter_map(|m| m.data_type.fixed_width())
            .sum::<usize>()
            .saturating_add(8)
            .saturating_mul(capacity);
        log::debug!(
            "allocated tablet: {} columns x {} rows, ~{} fixed-width bytes, row checks {}",
            columns.len(),
            capacity,
            fixed_bytes,
            if config.check_row_bounds { "on" } else { "off" }
        );

        Ok(Self {
            device_id: None,
            schema,
            name_index,
            timestamps: vec![0; capacity],
            timestamp_set: bitvec![0; capacity],
            columns,
            row_count: 0,
            config,
        })
    }

    /// Attach the identifier of the device these rows belong to.
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    pub fn schema(&self) -> &[MeasurementSchema] {
        &self.schema
    }

    pub fn config(&self) -> &TabletConfig {
        &self.config
    }

    pub fn capacity(&self) -> usize {
        self.timestamps.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of leading rows in use: one past the highest timestamped row.
    ///
    /// Rows below it whose timestamp was never written are skipped by
    /// `time_range` and `to_record_batch`.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn is_full(&self) -> bool {
        self.row_count == self.capacity()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.name_index.get(name).copied()
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Timestamp slots of rows `[0, row_count)`.
    ///
    /// Slots whose timestamp was not written read 0; check
    /// `timestamp_validity` before trusting one.
    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps[..self.row_count]
    }

    /// Which of the rows `[0, row_count)` have a written timestamp.
    pub fn timestamp_validity(&self) -> &BitSlice {
        &self.timestamp_set[..self.row_count]
    }

    /// Rows `[0, row_count)` that have a written timestamp, in row order.
    pub fn timestamped_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.timestamp_validity().iter_ones()
    }

    /// Write the timestamp of `row`, overwriting any previous one.
    ///
    /// # Errors
    ///
    /// - `Error::OutOfRange`: `row >= capacity`
    pub fn set_timestamp(&mut self, row: usize, timestamp: i64) -> Result<()> {
        self.check_row(row)?;
        self.timestamps[row] = timestamp;
        self.timestamp_set.set(row, true);
        self.row_count = self.row_count.max(row + 1);
        Ok(())
    }

    /// Read the timestamp of `row`; `None` when it was not written.
    pub fn timestamp(&self, row: usize) -> Result<Option<i64>> {
        self.check_row(row)?;
        Ok(self.timestamp_set[row].then_some(self.timestamps[row]))
    }

    /// Write a cell and mark it non-null.
    ///
    /// The column is addressed by index or measurement name. The value's
    /// type must equal the column's declared type. On any error nothing is
    /// written.
    ///
    /// # Errors
    ///
    /// - `Error::UnknownColumn`: no measurement has that name
    /// - `Error::OutOfRange`: column index `>= column_count`, or row
    ///   `>= capacity` when row checks are enabled
    /// - `Error::TypeMismatch`: value type differs from the column type
    ///
    /// # Panics
    ///
    /// With `check_row_bounds` disabled, panics if `row >= capacity`.
    pub fn set_value<'a>(
        &mut self,
        row: usize,
        column: impl Into<ColumnSelector<'a>>,
        value: impl Into<Value>,
    ) -> Result<()> {
        let col = self.resolve(column.into())?;
        if self.config.check_row_bounds {
            self.check_row(row)?;
        } else {
            debug_assert!(row < self.capacity(), "row {row} past tablet capacity");
        }

        let column = &mut self.columns[col];
        let expected = column.data_type();
        column.write(row, value.into()).map_err(|actual| {
            log::trace!("rejected {actual} write into {expected} column {col} at row {row}");
            Error::TypeMismatch {
                column: col,
                expected,
                actual,
            }
        })
    }

    /// Read a cell; `None` when it holds no value.
    pub fn value<'a>(
        &self,
        row: usize,
        column: impl Into<ColumnSelector<'a>>,
    ) -> Result<Option<Value>> {
        let col = self.resolve(column.into())?;
        self.check_row(row)?;
        Ok(self.columns[col].get(row))
    }

    pub fn is_null<'a>(&self, row: usize, column: impl Into<ColumnSelector<'a>>) -> Result<bool> {
        let col = self.resolve(column.into())?;
        self.check_row(row)?;
        Ok(!self.columns[col].is_valid(row))
    }

    /// Clear the validity bit of a cell so it reads as null.
    pub fn mark_null<'a>(&mut self, row: usize, column: impl Into<ColumnSelector<'a>>) -> Result<()> {
        let col = self.resolve(column.into())?;
        self.check_row(row)?;
        self.columns[col].clear(row);
        Ok(())
    }

    /// Smallest and largest written timestamp.
    pub fn time_range(&self) -> Option<(i64, i64)> {
        self.timestamped_rows()
            .map(|row| self.timestamps[row])
            .fold(None, |range, ts| match range {
                None => Some((ts, ts)),
                Some((min, max)) => Some((min.min(ts), max.max(ts))),
            })
    }

    /// Clear all cells so the allocation can stage the next batch.
    ///
    /// Capacity, schema and device are kept.
    pub fn reset(&mut self) {
        log::debug!("resetting tablet after {} rows", self.row_count);
        self.timestamps[..self.row_count].fill(0);
        self.timestamp_set.fill(false);
        for column in &mut self.columns {
            column.clear_all();
        }
        self.row_count = 0;
    }

    /// Consume the tablet, handing its storage to a serializer.
    pub fn into_parts(self) -> TabletParts {
        log::debug!(
            "handing off tablet {:?}: {} of {} rows",
            self.device_id,
            self.row_count,
            self.timestamps.len()
        );
        TabletParts {
            device_id: self.device_id,
            schema: self.schema,
            timestamps: self.timestamps,
            timestamp_validity: self.timestamp_set,
            columns: self.columns,
            row_count: self.row_count,
        }
    }

    fn resolve(&self, selector: ColumnSelector<'_>) -> Result<usize> {
        match selector {
            ColumnSelector::Index(index) if index < self.columns.len() => Ok(index),
            ColumnSelector::Index(index) => {
                Err(Error::column_out_of_range(index, self.columns.len()))
            }
            ColumnSelector::Name(name) => self
                .column_index(name)
                .ok_or_else(|| Error::UnknownColumn(name.to_owned())),
        }
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row >= self.capacity() {
            return Err(Error::row_out_of_range(row, self.capacity()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndexKind;
    use crate::schema::DataType;

    fn sensors() -> Vec<MeasurementSchema> {
        vec![
            MeasurementSchema::new("s_bool", DataType::Boolean),
            MeasurementSchema::new("s_i32", DataType::Int32),
            MeasurementSchema::new("s_i64", DataType::Int64),
            MeasurementSchema::new("s_f32", DataType::Float),
            MeasurementSchema::new("s_f64", DataType::Double),
            MeasurementSchema::new("s_text", DataType::Text),
        ]
    }

    #[test]
    fn test_construct_allocates_full_capacity() {
        let tablet = Tablet::new(sensors(), 16).unwrap();
        assert_eq!(tablet.capacity(), 16);
        assert_eq!(tablet.column_count(), 6);
        assert_eq!(tablet.row_count(), 0);
        for (col, column) in tablet.columns().iter().enumerate() {
            assert_eq!(column.values().len(), 16);
            assert_eq!(column.validity().len(), 16);
            assert_eq!(column.data_type(), tablet.schema()[col].data_type);
        }
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(Tablet::new(sensors(), 0), Err(Error::ZeroCapacity)));
    }

    #[test]
    fn test_every_bit_null_before_writes() {
        let tablet = Tablet::new(sensors(), 8).unwrap();
        for col in 0..tablet.column_count() {
            for row in 0..tablet.capacity() {
                assert!(tablet.is_null(row, col).unwrap());
            }
        }
    }

    #[test]
    fn test_write_each_type() {
        let mut tablet = Tablet::new(sensors(), 4).unwrap();
        tablet.set_value(1, "s_bool", true).unwrap();
        tablet.set_value(1, "s_i32", 7i32).unwrap();
        tablet.set_value(1, "s_i64", 7i64).unwrap();
        tablet.set_value(1, "s_f32", 1.25f32).unwrap();
        tablet.set_value(1, "s_f64", 2.5f64).unwrap();
        tablet.set_value(1, "s_text", "ok").unwrap();

        assert_eq!(tablet.value(1, "s_bool").unwrap(), Some(Value::Boolean(true)));
        assert_eq!(tablet.value(1, "s_i32").unwrap(), Some(Value::Int32(7)));
        assert_eq!(tablet.value(1, "s_i64").unwrap(), Some(Value::Int64(7)));
        assert_eq!(tablet.value(1, "s_f32").unwrap(), Some(Value::Float(1.25)));
        assert_eq!(tablet.value(1, "s_f64").unwrap(), Some(Value::Double(2.5)));
        assert_eq!(tablet.value(1, "s_text").unwrap(), Some(Value::Text("ok".into())));
        assert_eq!(tablet.value(0, "s_i64").unwrap(), None);
    }

    #[test]
    fn test_timestamp_out_of_range_does_not_mutate() {
        let mut tablet = Tablet::new(sensors(), 2).unwrap();
        let err = tablet.set_timestamp(2, 99).unwrap_err();
        assert!(matches!(
            err,
            Error::OutOfRange {
                kind: IndexKind::Row,
                index: 2,
                limit: 2
            }
        ));
        assert_eq!(tablet.row_count(), 0);
    }

    #[test]
    fn test_row_count_tracks_highest_timestamp_row() {
        let mut tablet = Tablet::new(sensors(), 8).unwrap();
        tablet.set_timestamp(3, 30).unwrap();
        assert_eq!(tablet.row_count(), 4);
        tablet.set_timestamp(1, 10).unwrap();
        assert_eq!(tablet.row_count(), 4);
        assert_eq!(tablet.timestamps(), &[0, 10, 0, 30]);
        assert_eq!(tablet.timestamp(0).unwrap(), None);
        assert_eq!(tablet.timestamp(3).unwrap(), Some(30));
        assert_eq!(tablet.timestamped_rows().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_sparse_timestamp_range_ignores_unwritten_rows() {
        let mut tablet = Tablet::new(sensors(), 8).unwrap();
        tablet.set_timestamp(3, 1_700_000_000_000).unwrap();
        assert_eq!(tablet.row_count(), 4);
        assert_eq!(
            tablet.time_range(),
            Some((1_700_000_000_000, 1_700_000_000_000))
        );
    }

    #[test]
    fn test_reset_forgets_previous_timestamps() {
        let mut tablet = Tablet::new(sensors(), 4).unwrap();
        tablet.set_timestamp(0, 9000).unwrap();
        tablet.set_timestamp(1, 9001).unwrap();
        tablet.reset();
        assert!(tablet.timestamps().is_empty());
        assert_eq!(tablet.time_range(), None);

        tablet.set_timestamp(2, 100).unwrap();
        assert_eq!(tablet.timestamps(), &[0, 0, 100]);
        assert_eq!(tablet.timestamp(0).unwrap(), None);
        assert_eq!(tablet.timestamp(1).unwrap(), None);
        assert_eq!(tablet.time_range(), Some((100, 100)));
    }

    #[test]
    fn test_column_index_out_of_range() {
        let mut tablet = Tablet::new(sensors(), 2).unwrap();
        let err = tablet.set_value(0, 6usize, true).unwrap_err();
        assert!(matches!(
            err,
            Error::OutOfRange {
                kind: IndexKind::Column,
                index: 6,
                limit: 6
            }
        ));
    }

    #[test]
    fn test_type_mismatch_reports_both_types() {
        let mut tablet = Tablet::new(sensors(), 2).unwrap();
        match tablet.set_value(0, "s_f64", 3i32) {
            Err(Error::TypeMismatch {
                column,
                expected,
                actual,
            }) => {
                assert_eq!(column, 4);
                assert_eq!(expected, DataType::Double);
                assert_eq!(actual, DataType::Int32);
            }
            other => panic!("expected type mismatch, got {other:?}"),
        }
        assert!(tablet.is_null(0, "s_f64").unwrap());
    }

    #[test]
    fn test_mark_null_clears_written_cell() {
        let mut tablet = Tablet::new(sensors(), 2).unwrap();
        tablet.set_value(0, "s_i64", 5i64).unwrap();
        tablet.mark_null(0, "s_i64").unwrap();
        assert!(tablet.is_null(0, "s_i64").unwrap());
        assert_eq!(tablet.value(0, "s_i64").unwrap(), None);
    }

    #[test]
    fn test_unchecked_rows_accept_in_bounds_writes() {
        let config = TabletConfig::default().with_max_rows(4).unchecked_rows();
        let mut tablet = Tablet::with_config(sensors(), config).unwrap();
        tablet.set_value(3, "s_i32", 1i32).unwrap();
        assert!(!tablet.is_null(3, "s_i32").unwrap());
    }

    #[test]
    #[should_panic]
    fn test_unchecked_rows_panic_past_capacity() {
        let config = TabletConfig::default().with_max_rows(4).unchecked_rows();
        let mut tablet = Tablet::with_config(sensors(), config).unwrap();
        let _ = tablet.set_value(4, "s_i32", 1i32);
    }

    #[test]
    fn test_time_range() {
        let mut tablet = Tablet::new(sensors(), 4).unwrap();
        assert_eq!(tablet.time_range(), None);
        tablet.set_timestamp(0, 500).unwrap();
        tablet.set_timestamp(1, 100).unwrap();
        tablet.set_timestamp(2, 300).unwrap();
        assert_eq!(tablet.time_range(), Some((100, 500)));
    }

    #[test]
    fn test_into_parts_keeps_storage() {
        let mut tablet = Tablet::new(sensors(), 4).unwrap().with_device_id("root.sg.d1");
        tablet.set_timestamp(0, 1).unwrap();
        tablet.set_value(0, "s_bool", false).unwrap();

        let parts = tablet.into_parts();
        assert_eq!(parts.device_id.as_deref(), Some("root.sg.d1"));
        assert_eq!(parts.row_count, 1);
        assert_eq!(parts.timestamps.len(), 4);
        assert!(parts.timestamp_validity[0]);
        assert!(!parts.timestamp_validity[1]);
        assert_eq!(parts.columns.len(), 6);
        assert!(parts.columns[0].is_valid(0));
    }
}
