//! Tablet configuration.

use serde::{Deserialize, Serialize};

/// Default row capacity of a tablet.
pub const DEFAULT_MAX_ROWS: usize = 1024;

/// Configuration for a tablet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabletConfig {
    /// Row capacity, fixed for the lifetime of the tablet.
    /// Default: 1024
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,

    /// Bounds-check the row index of value writes.
    ///
    /// When false the caller guarantees `row < max_rows`; an out-of-range
    /// row then panics on the slice index instead of returning an error.
    /// Timestamp writes are always checked.
    /// Default: true
    #[serde(default = "default_check_row_bounds")]
    pub check_row_bounds: bool,
}

fn default_max_rows() -> usize {
    DEFAULT_MAX_ROWS
}

fn default_check_row_bounds() -> bool {
    true
}

impl Default for TabletConfig {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
            check_row_bounds: true,
        }
    }
}

impl TabletConfig {
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn unchecked_rows(mut self) -> Self {
        self.check_row_bounds = false;
        self
    }
}
