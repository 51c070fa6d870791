//! Typed column storage with a validity bitmap.
//!
//! Each column owns a homogeneous value vector and a bitmap of the same
//! length. A set bit means the row holds a written value; a clear bit means
//! the cell is null. Both are allocated once at full capacity.

use bitvec::prelude::*;

use crate::schema::DataType;
use crate::value::Value;

/// Backing values of one column, one arm per supported type.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Boolean(Vec<bool>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Text(Vec<String>),
}

impl ColumnValues {
    fn with_len(data_type: DataType, len: usize) -> Self {
        match data_type {
            DataType::Boolean => ColumnValues::Boolean(vec![false; len]),
            DataType::Int32 => ColumnValues::Int32(vec![0; len]),
            DataType::Int64 => ColumnValues::Int64(vec![0; len]),
            DataType::Float => ColumnValues::Float(vec![0.0; len]),
            DataType::Double => ColumnValues::Double(vec![0.0; len]),
            DataType::Text => ColumnValues::Text(vec![String::new(); len]),
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            ColumnValues::Boolean(_) => DataType::Boolean,
            ColumnValues::Int32(_) => DataType::Int32,
            ColumnValues::Int64(_) => DataType::Int64,
            ColumnValues::Float(_) => DataType::Float,
            ColumnValues::Double(_) => DataType::Double,
            ColumnValues::Text(_) => DataType::Text,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Boolean(v) => v.len(),
            ColumnValues::Int32(v) => v.len(),
            ColumnValues::Int64(v) => v.len(),
            ColumnValues::Float(v) => v.len(),
            ColumnValues::Double(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, row: usize) -> Value {
        match self {
            ColumnValues::Boolean(v) => Value::Boolean(v[row]),
            ColumnValues::Int32(v) => Value::Int32(v[row]),
            ColumnValues::Int64(v) => Value::Int64(v[row]),
            ColumnValues::Float(v) => Value::Float(v[row]),
            ColumnValues::Double(v) => Value::Double(v[row]),
            ColumnValues::Text(v) => Value::Text(v[row].clone()),
        }
    }
}

/// One measurement column: values plus validity bitmap.
#[derive(Debug, Clone)]
pub struct Column {
    values: ColumnValues,
    validity: BitVec,
}

impl Column {
    pub(crate) fn new(data_type: DataType, capacity: usize) -> Self {
        Self {
            values: ColumnValues::with_len(data_type, capacity),
            validity: bitvec![0; capacity],
        }
    }

    pub fn data_type(&self) -> DataType {
        self.values.data_type()
    }

    pub fn values(&self) -> &ColumnValues {
        &self.values
    }

    /// Validity bitmap, one bit per row slot.
    pub fn validity(&self) -> &BitSlice {
        &self.validity
    }

    /// Returns true if `row` holds a written value.
    pub fn is_valid(&self, row: usize) -> bool {
        self.validity.get(row).map(|bit| *bit).unwrap_or(false)
    }

    pub(crate) fn get(&self, row: usize) -> Option<Value> {
        if self.is_valid(row) {
            Some(self.values.get(row))
        } else {
            None
        }
    }

    /// Store `value` at `row` and mark it non-null.
    ///
    /// Returns the rejected value's type when it differs from the column
    /// type; nothing is written in that case. `row` must be in bounds.
    pub(crate) fn write(&mut self, row: usize, value: Value) -> Result<(), DataType> {
        match (&mut self.values, value) {
            (ColumnValues::Boolean(v), Value::Boolean(x)) => v[row] = x,
            (ColumnValues::Int32(v), Value::Int32(x)) => v[row] = x,
            (ColumnValues::Int64(v), Value::Int64(x)) => v[row] = x,
            (ColumnValues::Float(v), Value::Float(x)) => v[row] = x,
            (ColumnValues::Double(v), Value::Double(x)) => v[row] = x,
            (ColumnValues::Text(v), Value::Text(x)) => v[row] = x,
            (_, other) => return Err(other.data_type()),
        }
        self.validity.set(row, true);
        Ok(())
    }

    pub(crate) fn clear(&mut self, row: usize) {
        self.validity.set(row, false);
    }

    pub(crate) fn clear_all(&mut self) {
        self.validity.fill(false);
    }
}
