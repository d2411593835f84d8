//! Takeoff, landing, and climb performance.
//!
//! A [`PerformanceModel`] evaluates one aircraft [`Variant`]: a bundle of
//! reference charts or regression equations, correction factors, and
//! contamination data, usually loaded through a [`DataDirectory`].
//!
//! Each evaluation derives the chart inputs from the [`Conditions`] once,
//! then composes every output as
//!
//! 1. the base value from a chart lookup or regression equation,
//! 2. the runway contamination correction (landing distances only),
//! 3. wind, slope, and surface corrections, in that order.
//!
//! Outputs are [`Value`](crate::support::value::Value)s wrapping `uom`
//! quantities. Tabular models refuse to extrapolate; regression models always
//! compute and report an advisory [`BoundsStatus`] instead.
//!
//! [`max_takeoff_weight`] inverts the takeoff distance to find the heaviest
//! weight a runway allows.

mod adjustments;
mod bounds;
mod conditions;
mod contamination;
mod dataset;
mod limiting_weight;
mod model;
mod source;
mod variant;

pub use adjustments::{Adjustments, Factor};
pub use bounds::{BoundsChecker, BoundsStatus};
pub use conditions::{
    Conditions, Contamination, ContaminationKind, DerivedInputs, Notam, Runway, Surface,
};
pub use contamination::{ContaminationCalculator, WET_RUNWAY_FACTOR};
pub use dataset::{DataDirectory, DatasetError};
pub use limiting_weight::{
    DistanceSample, DistanceUnavailable, LimitingWeight, LimitingWeightConfig,
    LimitingWeightError, max_takeoff_weight,
};
pub use model::{
    EnrouteClimbPerformance, LandingPerformance, PerformanceModel, TakeoffDistance,
    TakeoffPerformance,
};
pub use source::{Axis, Source};
pub use variant::{
    Distance, EnrouteData, FlapSetting, Generation, GoAround, Icing, LandingData, ModelKind,
    TakeoffData, Variant,
};
