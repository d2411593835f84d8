use std::sync::Arc;

use crate::support::{
    regression::RegressionEquation,
    table::{Clamping, DataTable, TableError},
    value::Value,
};

use super::conditions::DerivedInputs;

/// A derived input used as a table axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Weight,
    Altitude,
    Temperature,
    Headwind,
    Tailwind,
    Uphill,
    Downhill,
}

impl Axis {
    /// The conventional weight, altitude, temperature chart axes.
    pub const CHART: [Self; 3] = [Self::Weight, Self::Altitude, Self::Temperature];

    #[must_use]
    pub fn of(self, inputs: &DerivedInputs) -> f64 {
        match self {
            Self::Weight => inputs.weight,
            Self::Altitude => inputs.altitude,
            Self::Temperature => inputs.temperature,
            Self::Headwind => inputs.headwind,
            Self::Tailwind => inputs.tailwind,
            Self::Uphill => inputs.uphill,
            Self::Downhill => inputs.downhill,
        }
    }
}

/// Where a base output value comes from.
#[derive(Debug, Clone)]
pub enum Source {
    /// A chart lookup with the table's inputs drawn from the given axes.
    Table {
        table: Arc<DataTable>,
        axes: Vec<Axis>,
        clamping: Vec<Clamping>,
    },
    /// A regression equation over the derived input variables.
    Equation(Arc<RegressionEquation>),
}

impl Source {
    /// A table lookup that refuses every offscale input.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Dimensionality`] if the table's input count does
    /// not match the number of axes.
    pub fn table(table: DataTable, axes: impl Into<Vec<Axis>>) -> Result<Self, TableError> {
        let axes = axes.into();
        let table = table.expect_inputs(axes.len())?;
        Ok(Self::Table {
            table: Arc::new(table),
            axes,
            clamping: Vec::new(),
        })
    }

    /// A table lookup over the weight, altitude, temperature chart axes.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Dimensionality`] unless the table has three inputs.
    pub fn chart(table: DataTable) -> Result<Self, TableError> {
        Self::table(table, Axis::CHART)
    }

    /// Sets the clamping applied to each axis.
    #[must_use]
    pub fn with_clamping(self, modes: impl Into<Vec<Clamping>>) -> Self {
        match self {
            Self::Table { table, axes, .. } => Self::Table {
                table,
                axes,
                clamping: modes.into(),
            },
            equation @ Self::Equation(_) => equation,
        }
    }

    #[must_use]
    pub fn equation(equation: RegressionEquation) -> Self {
        Self::Equation(Arc::new(equation))
    }

    pub fn evaluate(&self, inputs: &DerivedInputs) -> Value<f64> {
        match self {
            Self::Table {
                table,
                axes,
                clamping,
            } => {
                let query: Vec<f64> = axes.iter().map(|axis| axis.of(inputs)).collect();
                let value = table.value_clamped(&query, clamping);
                if !value.is_computed() {
                    tracing::trace!(?query, ?value, "table lookup refused");
                }
                value
            }
            Self::Equation(equation) => equation.evaluate(&inputs.variables()),
        }
    }

    /// The backing table, for sources that have one.
    pub fn data_table(&self) -> Option<&Arc<DataTable>> {
        match self {
            Self::Table { table, .. } => Some(table),
            Self::Equation(_) => None,
        }
    }

    /// Sampled range of an axis, for table sources indexed by it.
    pub fn range(&self, axis: Axis) -> Option<(f64, f64)> {
        let Self::Table { table, axes, .. } = self else {
            return None;
        };
        let dim = axes.iter().position(|a| *a == axis)?;
        Some((table.min(dim)?, table.max(dim)?))
    }
}
