use std::path::PathBuf;

use thiserror::Error;

use crate::support::{regression::EquationError, residual::ResidualError, table::TableError};

/// Errors that may occur when loading a variant from a data directory.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// A required table or equation file does not exist.
    #[error("missing reference data {path:?}")]
    Missing { path: PathBuf },

    /// A table file is malformed or has the wrong number of inputs.
    #[error("invalid table {path:?}")]
    Table {
        path: PathBuf,
        #[source]
        source: TableError,
    },

    /// An equation file is malformed or refers to missing residual data.
    #[error("invalid equation {path:?}")]
    Equation {
        path: PathBuf,
        #[source]
        source: EquationError,
    },

    /// The residual dataset could not be loaded.
    #[error("invalid residual dataset")]
    Residual(#[from] ResidualError),
}
