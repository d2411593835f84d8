//! # TOLD Models
//!
//! Takeoff and landing data (TOLD) calculations for a single-engine jet,
//! driven by digitized flight manual charts or by regression equations fitted
//! to them.
//!
//! ## Crate layout
//!
//! - [`models`]: The performance engine ([`models::performance`]).
//! - [`support`]: Chart interpolation, regression equations, residual
//!   uncertainty, and the [`Value`](support::value::Value) result type.
//!
//! ## Evaluation never fails
//!
//! Loading reference data returns a `Result`; a malformed or missing file is
//! a packaging defect and is reported immediately. Evaluation returns a
//! [`Value`](support::value::Value) instead: inputs outside the charted
//! domain, unavailable data, and unapproved operations are terminal states
//! that flow through every later step unchanged.
//!
//! ## Utility code lifecycle
//!
//! Modules in [`support`] are part of the public API because they're useful,
//! but their APIs are not stable. Breaking changes may occur as needed.

pub mod models;
pub mod support;
