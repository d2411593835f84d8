//! Aircraft performance models.
//!
//! Models are the primary public interface of this crate. Each model lives in
//! its own module and re-exports the types a caller needs; the evaluation
//! steps behind it are private.
//!
//! The limiting weight search exposes a model through a thin
//! [`twine_core::Model`] adapter so it can be driven by `twine-solvers`.

pub mod performance;
