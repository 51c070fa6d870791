//! Fixed-capacity columnar row batches ("tablets") for staging device
//! time-series writes.
//!
//! A [`Tablet`] holds one timestamp column and one typed column per
//! measurement, each with a validity bitmap. Callers fill it by
//! `(row, column)` coordinate, then hand it to a serializer either as raw
//! parts ([`Tablet::into_parts`]) or, with the `arrow` feature, as a
//! `RecordBatch`.

pub mod column;
pub mod config;
pub mod error;
pub mod schema;
pub mod tablet;
pub mod value;
#[cfg(feature = "arrow")]
pub mod batch;

pub use column::{Column, ColumnValues};
pub use config::{TabletConfig, DEFAULT_MAX_ROWS};
pub use error::{Error, IndexKind, Result};
pub use schema::{DataType, MeasurementSchema};
pub use tablet::{Tablet, TabletParts};
pub use value::{ColumnSelector, Value};
#[cfg(feature = "arrow")]
pub use batch::{arrow_schema, TIMESTAMP_FIELD};
