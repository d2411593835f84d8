//! Landing distance corrections for contaminated runways.
//!
//! Tabular models look up the contaminated ground run from charts indexed by
//! the dry ground run (and, for depth-dependent contaminants, the depth in
//! inches). The total landing distance grows by the same amount as the ground
//! run; see [`ContaminationCalculator::apply_landing`].
//! Regression models evaluate a correction formula over the variables
//! `distance` and `depth`, whose residual uncertainty combines with the
//! uncertainty already on the distance. Either way a contaminated distance is
//! never shorter than the dry one.
//!
//! A wet runway is corrected by the fixed [`WET_RUNWAY_FACTOR`] on variants
//! that publish wet runway data and left unchanged on those that do not.

use std::{collections::BTreeMap, sync::Arc};

use crate::support::{
    regression::{RegressionEquation, Variables},
    table::{Clamping, DataTable, TableError},
    value::Value,
};

use super::conditions::{Contamination, ContaminationKind};

/// Multiplier applied to the landing distance on a wet runway.
pub const WET_RUNWAY_FACTOR: f64 = 1.15;

#[derive(Debug, Clone)]
enum Strategy {
    Table(BTreeMap<ContaminationKind, Arc<DataTable>>),
    Formula(BTreeMap<ContaminationKind, Arc<RegressionEquation>>),
}

/// Applies runway contamination to a landing distance.
#[derive(Debug, Clone)]
pub struct ContaminationCalculator {
    strategy: Strategy,
    wet_runway: bool,
}

impl ContaminationCalculator {
    /// A chart-based calculator with no charts yet.
    #[must_use]
    pub fn tables() -> Self {
        Self {
            strategy: Strategy::Table(BTreeMap::new()),
            wet_runway: false,
        }
    }

    /// A formula-based calculator with no formulas yet.
    #[must_use]
    pub fn formulas() -> Self {
        Self {
            strategy: Strategy::Formula(BTreeMap::new()),
            wet_runway: false,
        }
    }

    /// Adds the chart for a contaminant.
    ///
    /// The chart maps `[distance]` or `[distance, depth]` to the contaminated
    /// distance. On a formula-based calculator this is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Dimensionality`] unless the table has one or two inputs.
    pub fn with_table(mut self, kind: ContaminationKind, table: DataTable) -> Result<Self, TableError> {
        let table = match table.n_inputs() {
            1 | 2 => table,
            actual => return Err(TableError::Dimensionality { expected: 2, actual }),
        };
        if let Strategy::Table(tables) = &mut self.strategy {
            tables.insert(kind, Arc::new(table));
        }
        Ok(self)
    }

    /// Adds the correction formula for a contaminant.
    ///
    /// On a chart-based calculator this is a no-op.
    #[must_use]
    pub fn with_formula(mut self, kind: ContaminationKind, equation: RegressionEquation) -> Self {
        if let Strategy::Formula(formulas) = &mut self.strategy {
            formulas.insert(kind, Arc::new(equation));
        }
        self
    }

    /// Sets whether the variant publishes wet runway data.
    #[must_use]
    pub fn with_wet_runway(mut self, supported: bool) -> Self {
        self.wet_runway = supported;
        self
    }

    pub fn supports(&self, kind: ContaminationKind) -> bool {
        match (kind, &self.strategy) {
            (ContaminationKind::WetRunway, _) => self.wet_runway,
            (kind, Strategy::Table(tables)) => tables.contains_key(&kind),
            (kind, Strategy::Formula(formulas)) => formulas.contains_key(&kind),
        }
    }

    /// Returns the distance corrected for contamination.
    ///
    /// No contamination leaves the distance unchanged. A contaminant without
    /// a chart or formula yields [`Value::NotAvailable`].
    pub fn apply(&self, distance: Value<f64>, contamination: Option<&Contamination>) -> Value<f64> {
        let Some(contamination) = contamination else {
            return distance;
        };
        if let Some(state) = distance.terminal() {
            return state;
        }

        if contamination.kind == ContaminationKind::WetRunway {
            return if self.wet_runway {
                distance * WET_RUNWAY_FACTOR
            } else {
                tracing::trace!("no wet runway data, distance unchanged");
                distance
            };
        }

        let depth = contamination.depth_inches();
        match &self.strategy {
            Strategy::Table(tables) => match tables.get(&contamination.kind) {
                Some(table) => from_table(table, distance, depth),
                None => not_available(contamination.kind),
            },
            Strategy::Formula(formulas) => match formulas.get(&contamination.kind) {
                Some(equation) => from_formula(equation, distance, depth),
                None => not_available(contamination.kind),
            },
        }
    }

    /// Returns the landing ground run and total distance corrected for
    /// contamination.
    ///
    /// Contamination charts and formulas are indexed by the dry ground run.
    /// The air segment is unaffected, so the total distance grows by the same
    /// amount as the ground run. A wet runway scales both distances.
    pub fn apply_landing(
        &self,
        ground_run: Value<f64>,
        total_distance: Value<f64>,
        contamination: Option<&Contamination>,
    ) -> (Value<f64>, Value<f64>) {
        match contamination {
            None => (ground_run, total_distance),
            Some(wet) if wet.kind == ContaminationKind::WetRunway => (
                self.apply(ground_run, Some(wet)),
                self.apply(total_distance, Some(wet)),
            ),
            Some(contamination) => {
                let contaminated = self.apply(ground_run, Some(contamination));
                (
                    contaminated,
                    extend_total(total_distance, ground_run, contaminated),
                )
            }
        }
    }
}

/// Adds the ground run increase to the total distance.
///
/// The increase carries the correction's own uncertainty, which is the part
/// of the contaminated run's uncertainty not already on the dry run.
fn extend_total(total: Value<f64>, dry_run: Value<f64>, run: Value<f64>) -> Value<f64> {
    if let Some(state) = run.terminal() {
        return state;
    }
    let (Some(&dry), Some(&contaminated)) = (dry_run.value(), run.value()) else {
        return Value::Invalid;
    };
    let increase = contaminated - dry;
    let sigma_increase = run.uncertainty().map(|&sigma| {
        let sigma_dry = dry_run.uncertainty().copied().unwrap_or(0.0);
        (sigma * sigma - sigma_dry * sigma_dry).max(0.0).sqrt()
    });
    total.map(|value, sigma| {
        let sigma = match (sigma, sigma_increase) {
            (None, None) => None,
            (a, b) => Some(a.unwrap_or(0.0).hypot(b.unwrap_or(0.0))),
        };
        (value + increase, sigma)
    })
}

fn not_available(kind: ContaminationKind) -> Value<f64> {
    tracing::trace!(?kind, "no contamination data");
    Value::NotAvailable
}

fn from_table(table: &DataTable, distance: Value<f64>, depth: f64) -> Value<f64> {
    let Some(&d) = distance.value() else {
        return distance;
    };
    let query = if table.n_inputs() == 1 {
        vec![d]
    } else {
        vec![d, depth]
    };
    let sigma = distance.uncertainty().copied();
    table
        .value_clamped(&query, &[Clamping::Both, Clamping::Both])
        .map(|contaminated, _| (contaminated.max(d), sigma))
}

fn from_formula(equation: &RegressionEquation, distance: Value<f64>, depth: f64) -> Value<f64> {
    let Some(&d) = distance.value() else {
        return distance;
    };
    let variables = Variables::new().with("distance", d).with("depth", depth);
    let correction = equation.evaluate(&variables);
    if let Some(state) = correction.terminal() {
        return state;
    }

    let sigma_d = distance.uncertainty().copied();
    correction.map(|contaminated, sigma_c| {
        let sigma = match (sigma_d, sigma_c) {
            (None, None) => None,
            (a, b) => Some(a.unwrap_or(0.0).hypot(b.unwrap_or(0.0))),
        };
        (contaminated.max(d), sigma)
    })
}
