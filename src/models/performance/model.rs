//! The performance engine and its results.
//!
//! [`PerformanceModel`] evaluates a [`Variant`] for one set of [`Conditions`].
//! Distances, speeds, and gradients come back as `uom` quantities wrapped in
//! [`Value`].

use std::sync::Arc;

use uom::si::{
    f64::{Length, Ratio, Velocity},
    length::foot,
    velocity::{foot_per_minute, knot},
};

use crate::support::{units::gradient_from_feet_per_nautical_mile, value::Value};

use super::{
    bounds::BoundsStatus,
    conditions::{Conditions, DerivedInputs},
    source::Source,
    variant::{FlapSetting, GoAround, Icing, ModelKind, Variant},
};

/// Takeoff performance for one set of conditions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TakeoffPerformance {
    pub ground_run: Value<Length>,
    /// Distance to clear a 50 ft obstacle.
    pub total_distance: Value<Length>,
    pub climb_gradient: Value<Ratio>,
    pub climb_rate: Value<Velocity>,
    /// Advisory bounds check, for regression models.
    pub bounds: Option<BoundsStatus>,
}

impl TakeoffPerformance {
    /// Whether a regression model was evaluated below the charted domain.
    #[must_use]
    pub fn inputs_offscale_low(&self) -> bool {
        self.bounds.is_some_and(BoundsStatus::is_offscale_low)
    }

    /// Whether a regression model was evaluated above the charted domain.
    #[must_use]
    pub fn inputs_offscale_high(&self) -> bool {
        self.bounds.is_some_and(BoundsStatus::is_offscale_high)
    }
}

/// Landing performance for one set of conditions and flap setting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandingPerformance {
    pub vref: Value<Velocity>,
    pub ground_run: Value<Length>,
    /// Distance from 50 ft above the threshold.
    pub total_distance: Value<Length>,
    /// Whether the go-around climb gradient requirement is met.
    pub meets_go_around_gradient: Value<bool>,
    /// Advisory bounds check, for regression models.
    pub bounds: Option<BoundsStatus>,
}

impl LandingPerformance {
    fn not_available() -> Self {
        Self {
            vref: Value::NotAvailable,
            ground_run: Value::NotAvailable,
            total_distance: Value::NotAvailable,
            meets_go_around_gradient: Value::NotAvailable,
            bounds: None,
        }
    }

    /// Whether a regression model was evaluated below the charted domain.
    #[must_use]
    pub fn inputs_offscale_low(&self) -> bool {
        self.bounds.is_some_and(BoundsStatus::is_offscale_low)
    }

    /// Whether a regression model was evaluated above the charted domain.
    #[must_use]
    pub fn inputs_offscale_high(&self) -> bool {
        self.bounds.is_some_and(BoundsStatus::is_offscale_high)
    }
}

/// Enroute climb performance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnrouteClimbPerformance {
    pub gradient: Value<Ratio>,
    pub rate: Value<Velocity>,
    pub speed: Value<Velocity>,
}

/// Which takeoff distance a runway length is compared against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TakeoffDistance {
    GroundRun,
    #[default]
    TotalDistance,
}

/// The performance engine for one aircraft variant.
///
/// Evaluation is side-effect free and never fails: inputs outside the
/// reference data, missing data, and unapproved operations are reported
/// through [`Value`] states. Cloning is cheap; clones share the variant.
///
/// Safety factors are not applied.
#[derive(Debug, Clone)]
pub struct PerformanceModel {
    variant: Arc<Variant>,
}

impl PerformanceModel {
    #[must_use]
    pub fn new(variant: Variant) -> Self {
        Self {
            variant: Arc::new(variant),
        }
    }

    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    pub fn kind(&self) -> ModelKind {
        self.variant.kind
    }

    /// Takeoff distances and climb performance.
    ///
    /// Runway contamination does not affect takeoff.
    pub fn takeoff(&self, conditions: &Conditions) -> TakeoffPerformance {
        let inputs = DerivedInputs::from_conditions(conditions);
        let takeoff = &self.variant.takeoff;
        tracing::trace!(?inputs, "takeoff");

        TakeoffPerformance {
            ground_run: to_length(takeoff.ground_run.evaluate(&inputs, conditions.surface)),
            total_distance: to_length(takeoff.total_distance.evaluate(&inputs, conditions.surface)),
            climb_gradient: evaluate(takeoff.climb_gradient.as_ref(), &inputs)
                .map_each(gradient_from_feet_per_nautical_mile),
            climb_rate: evaluate(takeoff.climb_rate.as_ref(), &inputs)
                .map_each(Velocity::new::<foot_per_minute>),
            bounds: self
                .variant
                .bounds
                .as_ref()
                .map(|bounds| bounds.check_takeoff(&inputs)),
        }
    }

    /// One takeoff distance, in feet, without building the full result.
    pub(super) fn takeoff_distance(&self, conditions: &Conditions, which: TakeoffDistance) -> Value<f64> {
        let inputs = DerivedInputs::from_conditions(conditions);
        let distance = match which {
            TakeoffDistance::GroundRun => &self.variant.takeoff.ground_run,
            TakeoffDistance::TotalDistance => &self.variant.takeoff.total_distance,
        };
        distance.evaluate(&inputs, conditions.surface)
    }

    /// Landing distances, reference speed, and go-around capability.
    ///
    /// Contamination corrects the dry ground run, and the total distance by
    /// the same amount, before the wind, slope, and surface corrections. Flap
    /// settings without data are [`Value::NotAvailable`].
    pub fn landing(&self, conditions: &Conditions, flaps: FlapSetting) -> LandingPerformance {
        let Some(landing) = self.variant.landing.get(&flaps) else {
            tracing::trace!(?flaps, "no landing data");
            return LandingPerformance::not_available();
        };
        let inputs = DerivedInputs::from_conditions(conditions);
        let contamination = conditions.contamination.as_ref();
        tracing::trace!(?inputs, ?flaps, ?contamination, "landing");

        let dry_run = landing.ground_run.base.evaluate(&inputs);
        let dry_total = landing.total_distance.base.evaluate(&inputs);

        let meets_go_around_gradient = match &landing.go_around {
            GoAround::Classifier(equation) => equation.evaluate_bool(&inputs.variables()),
            GoAround::FromLandingChart => match dry_total {
                Value::OffscaleHigh => Value::Computed(false),
                value => value.terminal().unwrap_or(Value::Computed(true)),
            },
        };

        let (ground_run, total_distance) = self
            .variant
            .contamination
            .apply_landing(dry_run, dry_total, contamination);

        LandingPerformance {
            vref: evaluate(landing.vref.as_ref(), &inputs).map_each(Velocity::new::<knot>),
            ground_run: to_length(landing.ground_run.adjust(ground_run, &inputs, conditions.surface)),
            total_distance: to_length(landing.total_distance.adjust(
                total_distance,
                &inputs,
                conditions.surface,
            )),
            meets_go_around_gradient,
            bounds: self
                .variant
                .bounds
                .as_ref()
                .and_then(|bounds| bounds.check_landing(flaps, &inputs)),
        }
    }

    /// Enroute climb gradient, rate, and speed.
    pub fn enroute_climb(&self, conditions: &Conditions, icing: Icing) -> EnrouteClimbPerformance {
        let Some(enroute) = self.variant.enroute.get(&icing) else {
            tracing::trace!(?icing, "no enroute climb data");
            return EnrouteClimbPerformance {
                gradient: Value::NotAvailable,
                rate: Value::NotAvailable,
                speed: Value::NotAvailable,
            };
        };
        let inputs = DerivedInputs::from_conditions(conditions);

        EnrouteClimbPerformance {
            gradient: enroute
                .gradient
                .evaluate(&inputs)
                .map_each(gradient_from_feet_per_nautical_mile),
            rate: enroute
                .rate
                .evaluate(&inputs)
                .map_each(Velocity::new::<foot_per_minute>),
            speed: enroute.speed.evaluate(&inputs).map_each(Velocity::new::<knot>),
        }
    }
}

fn evaluate(source: Option<&Source>, inputs: &DerivedInputs) -> Value<f64> {
    source.map_or(Value::NotAvailable, |source| source.evaluate(inputs))
}

fn to_length(feet: Value<f64>) -> Value<Length> {
    feet.map_each(Length::new::<foot>)
}
