//! Measurement schema descriptors.
//!
//! A tablet schema is an ordered list of [`MeasurementSchema`] entries. The
//! position of an entry is its column index; names must be unique.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Primitive type of a measurement column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Boolean,
    Int32,
    Int64,
    Float,
    Double,
    Text,
}

impl DataType {
    /// Width in bytes of one stored value, `None` for variable-width types.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            DataType::Boolean => Some(1),
            DataType::Int32 | DataType::Float => Some(4),
            DataType::Int64 | DataType::Double => Some(8),
            DataType::Text => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Boolean => "boolean",
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::Float => "float",
            DataType::Double => "double",
            DataType::Text => "text",
        };
        f.write_str(name)
    }
}

/// A named, typed time-series channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementSchema {
    pub name: String,
    pub data_type: DataType,
}

impl MeasurementSchema {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Build the name -> column index map for an ordered schema.
///
/// # Errors
///
/// - `Error::EmptySchema`: no measurements were given
/// - `Error::DuplicateMeasurement`: two entries share a name
pub(crate) fn build_name_index(schema: &[MeasurementSchema]) -> Result<HashMap<String, usize>> {
    if schema.is_empty() {
        return Err(Error::EmptySchema);
    }
    let mut index = HashMap::with_capacity(schema.len());
    for (col, measurement) in schema.iter().enumerate() {
        if index.insert(measurement.name.clone(), col).is_some() {
            return Err(Error::DuplicateMeasurement(measurement.name.clone()));
        }
    }
    debug_assert_eq!(index.len(), schema.len());
    Ok(index)
}
