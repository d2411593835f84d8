//! Multiplicative corrections for wind, runway slope, and surface.
//!
//! Each correction multiplies the running distance by
//!
//! | correction | multiplier                    |
//! |------------|-------------------------------|
//! | headwind   | `1 - factor * knots / 10`     |
//! | tailwind   | `1 + factor * knots / 10`     |
//! | uphill     | `1 + factor * gradient * 100` |
//! | downhill   | `1 - factor * gradient * 100` |
//! | unpaved    | `1 + factor`                  |
//!
//! and corrections apply in that order. A zero wind or slope component
//! leaves the distance unchanged without evaluating its factor.

use std::sync::Arc;

use crate::support::{
    regression::RegressionEquation,
    table::{Clamping, DataTable, TableError},
    value::Value,
};

use super::conditions::{DerivedInputs, Surface};

/// The scalar factor of one correction.
#[derive(Debug, Clone)]
pub enum Factor {
    Fixed(f64),
    /// Evaluated over the derived input variables.
    Equation(Arc<RegressionEquation>),
    /// Interpolated from a weight-indexed chart, clamped at both ends.
    Table(Arc<DataTable>),
}

impl Factor {
    /// A weight-indexed factor chart.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Dimensionality`] unless the table has one input.
    pub fn table(table: DataTable) -> Result<Self, TableError> {
        Ok(Self::Table(Arc::new(table.expect_inputs(1)?)))
    }

    #[must_use]
    pub fn equation(equation: RegressionEquation) -> Self {
        Self::Equation(Arc::new(equation))
    }

    pub fn evaluate(&self, inputs: &DerivedInputs) -> Value<f64> {
        match self {
            Self::Fixed(factor) => Value::finite(*factor),
            Self::Equation(equation) => equation.evaluate(&inputs.variables()),
            Self::Table(table) => table.value_clamped(&[inputs.weight], &[Clamping::Both]),
        }
    }
}

/// The correction factors available for one output.
///
/// A missing wind or slope factor means the output cannot be corrected for
/// that condition, so a nonzero component yields [`Value::NotAvailable`]. A
/// missing unpaved factor means operation from unpaved runways is not
/// approved, yielding [`Value::NotAuthorized`].
#[derive(Debug, Clone, Default)]
pub struct Adjustments {
    pub headwind: Option<Factor>,
    pub tailwind: Option<Factor>,
    pub uphill: Option<Factor>,
    pub downhill: Option<Factor>,
    pub unpaved: Option<Factor>,
}

impl Adjustments {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_headwind(mut self, factor: Factor) -> Self {
        self.headwind = Some(factor);
        self
    }

    #[must_use]
    pub fn with_tailwind(mut self, factor: Factor) -> Self {
        self.tailwind = Some(factor);
        self
    }

    #[must_use]
    pub fn with_uphill(mut self, factor: Factor) -> Self {
        self.uphill = Some(factor);
        self
    }

    #[must_use]
    pub fn with_downhill(mut self, factor: Factor) -> Self {
        self.downhill = Some(factor);
        self
    }

    #[must_use]
    pub fn with_unpaved(mut self, factor: Factor) -> Self {
        self.unpaved = Some(factor);
        self
    }

    /// Applies the corrections to a base distance.
    pub fn apply(&self, base: Value<f64>, inputs: &DerivedInputs, surface: Surface) -> Value<f64> {
        let steps = [
            (&self.headwind, inputs.headwind / 10.0, -1.0),
            (&self.tailwind, inputs.tailwind / 10.0, 1.0),
            (&self.uphill, inputs.uphill * 100.0, 1.0),
            (&self.downhill, inputs.downhill * 100.0, -1.0),
        ];

        let mut running = base;
        for (factor, magnitude, sign) in steps {
            if magnitude == 0.0 {
                continue;
            }
            running = running * multiplier(factor.as_ref(), inputs, sign * magnitude);
        }

        if surface == Surface::Unpaved {
            let Some(factor) = &self.unpaved else {
                tracing::trace!("no unpaved runway data");
                return running.terminal().unwrap_or(Value::NotAuthorized);
            };
            running = running * multiplier(Some(factor), inputs, 1.0);
        }

        running
    }
}

/// `1 + factor * scale`, with the factor's uncertainty scaled along.
fn multiplier(factor: Option<&Factor>, inputs: &DerivedInputs, scale: f64) -> Value<f64> {
    match factor {
        Some(factor) => factor
            .evaluate(inputs)
            .map(|f, sigma| (1.0 + f * scale, sigma.map(|s| (s * scale).abs()))),
        None => {
            tracing::trace!(scale, "no correction factor");
            Value::NotAvailable
        }
    }
}
