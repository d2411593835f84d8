use std::path::PathBuf;

use thiserror::Error;

use crate::support::residual::ResidualError;

use super::EquationType;

/// Errors that may occur when constructing a [`RegressionEquation`](super::RegressionEquation).
#[derive(Debug, Error)]
pub enum EquationError {
    /// The document is not valid JSON or is missing required fields.
    #[error("malformed equation document")]
    Parse(#[source] serde_json::Error),

    /// The document's schema version is not supported.
    #[error("equation {name:?} has unsupported version {version:?}")]
    UnsupportedVersion { name: String, version: String },

    /// The type-specific payload is missing fields or has the wrong shape.
    #[error("equation {name:?} has a malformed {kind:?} payload")]
    Payload {
        name: String,
        kind: EquationType,
        #[source]
        source: serde_json::Error,
    },

    /// The equation refers to a variable it does not declare.
    #[error("equation {name:?} refers to undeclared variable {variable:?}")]
    UndeclaredVariable { name: String, variable: String },

    /// A polynomial term's powers do not match the declared variables.
    #[error("equation {name:?} term {term} has {actual} power(s) for {expected} variable(s)")]
    Dimensionality {
        name: String,
        term: usize,
        expected: usize,
        actual: usize,
    },

    /// A linear equation declares no variables.
    #[error("equation {name:?} declares no variables")]
    NoVariables { name: String },

    /// A logistic feature could not be parsed or uses an unknown symbol.
    #[error("equation {name:?} has invalid feature {feature:?}")]
    Feature { name: String, feature: String },

    /// A logistic normalization has a zero or non-finite scale.
    #[error("equation {name:?} has invalid normalization for {variable:?}")]
    Normalization { name: String, variable: String },

    /// The equation's uncertainty key has no residual data.
    #[error("equation {name:?} has no residual data")]
    Residual {
        name: String,
        #[source]
        source: ResidualError,
    },

    /// The equation file could not be read.
    #[error("failed to read equation {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
