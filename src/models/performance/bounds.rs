//! Advisory domain checks for regression models.
//!
//! Regression equations evaluate anywhere, so a regression model still
//! reports a distance for a weight the flight manual never charted. The
//! [`BoundsChecker`] compares the inputs against the chart the equation was
//! fitted to so the caller can flag such results.

use std::{collections::BTreeMap, sync::Arc};

use crate::support::table::{DataTable, TableError};

use super::{conditions::DerivedInputs, variant::FlapSetting};

/// Where the inputs lie relative to the charted domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundsStatus {
    WithinBounds,
    BelowMinimum,
    AboveMaximum,
}

impl BoundsStatus {
    #[must_use]
    pub fn is_offscale_low(self) -> bool {
        self == Self::BelowMinimum
    }

    #[must_use]
    pub fn is_offscale_high(self) -> bool {
        self == Self::AboveMaximum
    }
}

/// Reference charts for the takeoff and per-flap landing domains.
///
/// Each reference table is indexed by weight, altitude, and temperature.
#[derive(Debug, Clone)]
pub struct BoundsChecker {
    takeoff: Arc<DataTable>,
    landing: BTreeMap<FlapSetting, Arc<DataTable>>,
}

impl BoundsChecker {
    /// Creates a checker with a takeoff reference chart.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Dimensionality`] unless the table has three inputs.
    pub fn new(takeoff: DataTable) -> Result<Self, TableError> {
        Ok(Self {
            takeoff: Arc::new(takeoff.expect_inputs(3)?),
            landing: BTreeMap::new(),
        })
    }

    /// Adds the landing reference chart for a flap setting.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Dimensionality`] unless the table has three inputs.
    pub fn with_landing(mut self, flaps: FlapSetting, table: DataTable) -> Result<Self, TableError> {
        self.landing.insert(flaps, Arc::new(table.expect_inputs(3)?));
        Ok(self)
    }

    pub fn check_takeoff(&self, inputs: &DerivedInputs) -> BoundsStatus {
        check(&self.takeoff, inputs)
    }

    /// Checks the landing domain for a flap setting.
    ///
    /// Returns `None` if there is no reference chart for the setting.
    pub fn check_landing(&self, flaps: FlapSetting, inputs: &DerivedInputs) -> Option<BoundsStatus> {
        self.landing.get(&flaps).map(|table| check(table, inputs))
    }

    /// Charted takeoff weight range, in pounds.
    pub fn takeoff_weight_range(&self) -> Option<(f64, f64)> {
        Some((self.takeoff.min(0)?, self.takeoff.max(0)?))
    }
}

/// Compares weight, then altitude, then temperature, and reports the first
/// dimension outside the table's range.
fn check(table: &DataTable, inputs: &DerivedInputs) -> BoundsStatus {
    let dimensions = [inputs.weight, inputs.altitude, inputs.temperature];
    for (dim, x) in dimensions.into_iter().enumerate() {
        let (Some(lo), Some(hi)) = (table.min(dim), table.max(dim)) else {
            continue;
        };
        if x < lo {
            tracing::trace!(dim, x, lo, "input below charted range");
            return BoundsStatus::BelowMinimum;
        }
        if x > hi {
            tracing::trace!(dim, x, hi, "input above charted range");
            return BoundsStatus::AboveMaximum;
        }
    }
    BoundsStatus::WithinBounds
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart() -> DataTable {
        DataTable::from_csv(
            "weight,altitude,temperature,value\n\
             4500,0,-20,1500\n\
             6000,10000,50,4200\n",
        )
        .unwrap()
    }

    fn inputs(weight: f64, altitude: f64, temperature: f64) -> DerivedInputs {
        DerivedInputs {
            weight,
            altitude,
            temperature,
            headwind: 0.0,
            tailwind: 0.0,
            uphill: 0.0,
            downhill: 0.0,
        }
    }

    #[test]
    fn within_and_outside() {
        let checker = BoundsChecker::new(chart()).unwrap();
        assert_eq!(
            checker.check_takeoff(&inputs(5000.0, 2000.0, 15.0)),
            BoundsStatus::WithinBounds
        );
        assert_eq!(
            checker.check_takeoff(&inputs(4000.0, 2000.0, 15.0)),
            BoundsStatus::BelowMinimum
        );
        assert_eq!(
            checker.check_takeoff(&inputs(5000.0, 12000.0, 15.0)),
            BoundsStatus::AboveMaximum
        );
        assert!(
            checker
                .check_takeoff(&inputs(5000.0, 0.0, -30.0))
                .is_offscale_low()
        );
    }

    #[test]
    fn weight_is_checked_first() {
        let checker = BoundsChecker::new(chart()).unwrap();
        // Too heavy and too cold: the weight violation wins.
        assert_eq!(
            checker.check_takeoff(&inputs(6500.0, 0.0, -40.0)),
            BoundsStatus::AboveMaximum
        );
        // Too low and too hot: the altitude violation wins.
        assert_eq!(
            checker.check_takeoff(&inputs(5000.0, -500.0, 60.0)),
            BoundsStatus::BelowMinimum
        );
    }

    #[test]
    fn landing_selects_chart_by_flaps() {
        let flaps_50 = DataTable::from_csv("5000,0,0,2000\n5500,8000,40,3000\n").unwrap();
        let checker = BoundsChecker::new(chart())
            .unwrap()
            .with_landing(FlapSetting::Flaps50, flaps_50)
            .unwrap();

        let heavy = inputs(5800.0, 1000.0, 20.0);
        assert_eq!(
            checker.check_landing(FlapSetting::Flaps50, &heavy),
            Some(BoundsStatus::AboveMaximum)
        );
        assert_eq!(checker.check_landing(FlapSetting::Flaps100, &heavy), None);
        assert_eq!(checker.takeoff_weight_range(), Some((4500.0, 6000.0)));
    }

    #[test]
    fn rejects_wrong_dimensionality() {
        let one_input = DataTable::from_csv("4500,80\n6000,92\n").unwrap();
        assert!(BoundsChecker::new(one_input).is_err());
    }
}
