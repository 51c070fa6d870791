use thiserror::Error;

use crate::schema::DataType;

#[derive(Debug, Error)]
pub enum Error {
    #[error("schema has no measurements")]
    EmptySchema,
    #[error("tablet capacity must be > 0")]
    ZeroCapacity,
    #[error("duplicate measurement: {0}")]
    DuplicateMeasurement(String),
    #[error("{kind} index {index} out of range (limit {limit})")]
    OutOfRange {
        kind: IndexKind,
        index: usize,
        limit: usize,
    },
    #[error("unknown measurement: {0}")]
    UnknownColumn(String),
    #[error("type mismatch on column {column}: expected {expected}, got {actual}")]
    TypeMismatch {
        column: usize,
        expected: DataType,
        actual: DataType,
    },
    #[cfg(feature = "arrow")]
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

/// Which coordinate of a cell address was out of bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Row,
    Column,
}

impl std::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexKind::Row => write!(f, "row"),
            IndexKind::Column => write!(f, "column"),
        }
    }
}

impl Error {
    pub(crate) fn row_out_of_range(index: usize, limit: usize) -> Self {
        Error::OutOfRange {
            kind: IndexKind::Row,
            index,
            limit,
        }
    }

    pub(crate) fn column_out_of_range(index: usize, limit: usize) -> Self {
        Error::OutOfRange {
            kind: IndexKind::Column,
            index,
            limit,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
