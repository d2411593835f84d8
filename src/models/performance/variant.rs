//! Per-aircraft descriptor bundles.
//!
//! A [`Variant`] holds everything that differs between aircraft generations
//! and model kinds: base-value sources, correction factors, contamination
//! data, and (for regression models) the reference charts used for bounds
//! checks. The [`PerformanceModel`](super::PerformanceModel) engine is shared.

use std::{collections::BTreeMap, fmt, sync::Arc};

use crate::support::{regression::RegressionEquation, value::Value};

use super::{
    adjustments::Adjustments,
    bounds::BoundsChecker,
    conditions::{DerivedInputs, Surface},
    contamination::ContaminationCalculator,
    source::{Axis, Source},
};

/// Aircraft generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Generation {
    G1,
    G2Plus,
}

impl Generation {
    /// Directory name used for this generation's reference data.
    #[must_use]
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::G1 => "g1",
            Self::G2Plus => "g2+",
        }
    }

    /// Whether the flight manual supplement includes wet runway landing data.
    #[must_use]
    pub fn has_wet_runway_data(self) -> bool {
        matches!(self, Self::G2Plus)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// How the reference data is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    /// Digitized charts, interpolated and never extrapolated.
    Tabular,
    /// Equations fitted to the charts, with residual uncertainty.
    Regression,
}

/// Landing flap configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FlapSetting {
    Flaps100,
    Flaps50,
    /// Flaps 50 with ice protection on and ice accumulated.
    Flaps50Ice,
}

impl FlapSetting {
    pub const ALL: [Self; 3] = [Self::Flaps100, Self::Flaps50, Self::Flaps50Ice];

    #[must_use]
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Flaps100 => "100",
            Self::Flaps50 => "50",
            Self::Flaps50Ice => "50 ice",
        }
    }
}

/// Enroute climb configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Icing {
    Normal,
    /// Ice protection on with ice accumulated.
    Ice,
}

impl Icing {
    pub const ALL: [Self; 2] = [Self::Normal, Self::Ice];

    #[must_use]
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Ice => "ice contaminated",
        }
    }
}

/// A corrected distance: a base value followed by its adjustments.
#[derive(Debug, Clone)]
pub struct Distance {
    pub base: Source,
    pub adjustments: Adjustments,
}

impl Distance {
    #[must_use]
    pub fn new(base: Source) -> Self {
        Self {
            base,
            adjustments: Adjustments::default(),
        }
    }

    #[must_use]
    pub fn with_adjustments(mut self, adjustments: Adjustments) -> Self {
        self.adjustments = adjustments;
        self
    }

    /// Evaluates the base value and applies the adjustments.
    pub(super) fn evaluate(&self, inputs: &DerivedInputs, surface: Surface) -> Value<f64> {
        self.adjust(self.base.evaluate(inputs), inputs, surface)
    }

    /// Applies the adjustments to an already evaluated base value.
    pub(super) fn adjust(&self, base: Value<f64>, inputs: &DerivedInputs, surface: Surface) -> Value<f64> {
        self.adjustments.apply(base, inputs, surface)
    }
}

/// Takeoff data: distances in feet, gradient in ft/nmi, rate in ft/min.
#[derive(Debug, Clone)]
pub struct TakeoffData {
    pub ground_run: Distance,
    pub total_distance: Distance,
    pub climb_gradient: Option<Source>,
    pub climb_rate: Option<Source>,
}

/// How the go-around climb gradient requirement is assessed.
#[derive(Debug, Clone)]
pub enum GoAround {
    /// A logistic classifier over the derived inputs.
    Classifier(Arc<RegressionEquation>),
    /// Met wherever the landing chart is defined.
    ///
    /// The landing charts end where the go-around gradient can no longer be
    /// met, so an [`OffscaleHigh`](Value::OffscaleHigh) landing distance
    /// means the requirement is not met.
    FromLandingChart,
}

/// Landing data for one flap setting: speed in knots, distances in feet.
#[derive(Debug, Clone)]
pub struct LandingData {
    pub vref: Option<Source>,
    pub ground_run: Distance,
    pub total_distance: Distance,
    pub go_around: GoAround,
}

/// Enroute climb data: gradient in ft/nmi, rate in ft/min, speed in knots.
#[derive(Debug, Clone)]
pub struct EnrouteData {
    pub gradient: Source,
    pub rate: Source,
    pub speed: Source,
}

/// The descriptor bundle for one aircraft generation and model kind.
#[derive(Debug, Clone)]
pub struct Variant {
    pub generation: Generation,
    pub kind: ModelKind,
    pub takeoff: TakeoffData,
    pub landing: BTreeMap<FlapSetting, LandingData>,
    pub contamination: ContaminationCalculator,
    pub enroute: BTreeMap<Icing, EnrouteData>,
    /// Reference charts for advisory bounds checks; regression models only.
    pub bounds: Option<BoundsChecker>,
}

impl Variant {
    /// Weight range covered by the takeoff data, in pounds.
    pub fn takeoff_weight_range(&self) -> Option<(f64, f64)> {
        match &self.bounds {
            Some(bounds) => bounds.takeoff_weight_range(),
            None => self.takeoff.total_distance.base.range(Axis::Weight),
        }
    }
}
