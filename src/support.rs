//! Supporting utilities used by the performance models.
//!
//! These modules are public because they are useful on their own (table
//! interpolation, regression equations, residual uncertainty), but their
//! APIs are not stable.

pub mod constraint;
pub mod regression;
pub mod residual;
pub mod table;
pub mod units;
pub mod value;
