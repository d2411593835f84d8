use std::path::PathBuf;

use thiserror::Error;

/// Errors that may occur when constructing a [`DataTable`](super::DataTable).
#[derive(Debug, Error)]
pub enum TableError {
    /// The table has no data rows.
    #[error("table has no data rows")]
    Empty,

    /// A row does not have at least one input and one output column.
    #[error("row {row} has {width} column(s); at least 2 are required")]
    TooNarrow { row: usize, width: usize },

    /// A row's width differs from the first row's width.
    #[error("row {row} has {width} column(s), expected {expected}")]
    RaggedRow {
        row: usize,
        width: usize,
        expected: usize,
    },

    /// A value is NaN or infinite.
    #[error("row {row}, column {column} is not finite")]
    NonFinite { row: usize, column: usize },

    /// The table does not have the number of inputs its consumer declared.
    #[error("table has {actual} input(s), expected {expected}")]
    Dimensionality { expected: usize, actual: usize },

    /// The table file could not be read.
    #[error("failed to read table {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
