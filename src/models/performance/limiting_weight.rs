//! Maximum takeoff weight for an available runway length.
//!
//! Bisects over weight until the takeoff distance matches the available
//! length. The performance model is exposed to the solver through a
//! [`twine_core::Model`] adapter with weight as its sole input.

use std::convert::Infallible;

use thiserror::Error;
use twine_core::{EquationProblem, Model};
use twine_solvers::equation::bisection;
use uom::si::{
    f64::{Length, Mass},
    length::foot,
    mass::pound,
};

use crate::support::{
    constraint::{Constrained, StrictlyPositive},
    value::Value,
};

use super::{
    conditions::Conditions,
    model::{PerformanceModel, TakeoffDistance},
};

/// Solver configuration for the limiting weight search.
#[derive(Debug, Clone, Copy)]
pub struct LimitingWeightConfig {
    /// Maximum iteration count for the bisection solve.
    pub max_iters: usize,

    /// Which takeoff distance must fit within the runway.
    pub distance: TakeoffDistance,

    /// Absolute tolerance for the weight search variable.
    pub weight_tol: Mass,

    /// Margin below the available length within which the search may stop.
    pub distance_tol: Length,
}

impl Default for LimitingWeightConfig {
    fn default() -> Self {
        Self {
            max_iters: 100,
            distance: TakeoffDistance::TotalDistance,
            weight_tol: Mass::new::<pound>(0.5),
            distance_tol: Length::new::<foot>(0.5),
        }
    }
}

impl LimitingWeightConfig {
    fn bisection(&self) -> bisection::Config {
        bisection::Config {
            max_iters: self.max_iters,
            x_abs_tol: self.weight_tol.get::<pound>(),
            x_rel_tol: 0.0,
            residual_tol: self.distance_tol.get::<foot>(),
        }
    }
}

/// Errors that can occur while searching for the limiting weight.
#[derive(Debug, Error)]
pub enum LimitingWeightError {
    /// The takeoff data has no weight axis to search over.
    #[error("takeoff data has no charted weight range")]
    NoWeightRange,

    /// Even the lightest charted weight needs more runway than is available.
    #[error("runway too short at the minimum weight ({minimum:?})")]
    RunwayTooShort {
        minimum: Mass,
        required: Value<Length>,
    },

    /// The bisection solver encountered an error.
    #[error("bisection solver error")]
    Bisection(#[from] bisection::Error),

    /// The solver reached the iteration limit without converging.
    #[error("solver hit iteration limit: residual={residual:?}")]
    MaxIters {
        /// Best distance residual achieved.
        residual: Length,

        /// Iteration count performed by the solver.
        iters: usize,
    },
}

/// The heaviest weight whose takeoff distance fits the runway.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimitingWeight {
    pub weight: Mass,
    /// Takeoff distance at `weight`.
    pub distance: Length,
    /// Whether the runway, rather than the charted maximum weight, limits.
    pub runway_limited: bool,
}

/// Finds the maximum takeoff weight for an available runway length.
///
/// All conditions except the weight are taken from `conditions`. The search
/// covers the charted weight range; if the maximum charted weight fits, it
/// is returned with `runway_limited == false`. The returned distance never
/// exceeds `available`.
///
/// # Errors
///
/// Returns [`LimitingWeightError`] if the data has no weight range, if the
/// runway is too short at the minimum weight, or if the solver fails.
pub fn max_takeoff_weight(
    model: &PerformanceModel,
    conditions: &Conditions,
    available: Constrained<Length, StrictlyPositive>,
    config: LimitingWeightConfig,
) -> Result<LimitingWeight, LimitingWeightError> {
    let available = available.into_inner();
    let (lightest, heaviest) = model
        .variant()
        .takeoff_weight_range()
        .ok_or(LimitingWeightError::NoWeightRange)?;

    let adapter = TakeoffDistanceModel {
        model,
        conditions,
        distance: config.distance,
    };

    match adapter.call(&Mass::new::<pound>(heaviest)) {
        Ok(sample) if sample.distance <= available => {
            return Ok(LimitingWeight {
                weight: sample.weight,
                distance: sample.distance,
                runway_limited: false,
            });
        }
        _ => {}
    }

    let minimum = Mass::new::<pound>(lightest);
    let mut fit = match adapter.call(&minimum) {
        Ok(sample) if sample.distance <= available => sample,
        Ok(sample) => {
            return Err(LimitingWeightError::RunwayTooShort {
                minimum,
                required: Value::Computed(sample.distance),
            });
        }
        Err(DistanceUnavailable(required)) => {
            return Err(LimitingWeightError::RunwayTooShort { minimum, required });
        }
    };

    // Target one tolerance short of the runway.
    let target = available - config.distance_tol;
    if fit.distance >= target {
        return Ok(LimitingWeight {
            weight: fit.weight,
            distance: fit.distance,
            runway_limited: true,
        });
    }
    let problem = LimitingWeightProblem { target };

    let solution = bisection::solve(
        &adapter,
        &problem,
        [lightest, heaviest],
        &config.bisection(),
        |event: &bisection::Event<'_, TakeoffDistanceModel<'_>, LimitingWeightProblem>| match event.result() {
            Ok(evaluation) => {
                let sample = evaluation.snapshot.output;
                if sample.distance <= available && sample.weight > fit.weight {
                    fit = sample;
                }
                None
            }
            // Distances go offscale at heavy weights. Treat an unavailable
            // distance as too long.
            Err(_) => Some(bisection::Action::assume_positive()),
        },
    )?;

    if solution.status != bisection::Status::Converged {
        return Err(LimitingWeightError::MaxIters {
            residual: Length::new::<foot>(solution.residual),
            iters: solution.iters,
        });
    }

    // Report the heaviest evaluated weight whose distance fits.
    tracing::debug!(
        weight = fit.weight.get::<pound>(),
        distance = fit.distance.get::<foot>(),
        estimate = solution.x,
        iters = solution.iters,
        "limiting takeoff weight"
    );
    Ok(LimitingWeight {
        weight: fit.weight,
        distance: fit.distance,
        runway_limited: true,
    })
}

/// Takeoff distance at one weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceSample {
    pub weight: Mass,
    pub distance: Length,
}

/// The takeoff distance was not computed at the requested weight.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("takeoff distance unavailable: {0:?}")]
pub struct DistanceUnavailable(pub Value<Length>);

/// Model adapter exposing takeoff distance as a function of weight.
struct TakeoffDistanceModel<'a> {
    model: &'a PerformanceModel,
    conditions: &'a Conditions,
    distance: TakeoffDistance,
}

impl Model for TakeoffDistanceModel<'_> {
    type Input = Mass;
    type Output = DistanceSample;
    type Error = DistanceUnavailable;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        let weight = StrictlyPositive::new(*input).map_err(|_| DistanceUnavailable(Value::Invalid))?;
        let conditions = self.conditions.with_weight(weight);
        let distance = self.model.takeoff_distance(&conditions, self.distance);
        match distance.value() {
            Some(&feet) => Ok(DistanceSample {
                weight: *input,
                distance: Length::new::<foot>(feet),
            }),
            None => Err(DistanceUnavailable(distance.map_each(Length::new::<foot>))),
        }
    }
}

/// Computes the residual as `required - target`.
struct LimitingWeightProblem {
    target: Length,
}

impl EquationProblem<1> for LimitingWeightProblem {
    type Input = Mass;
    type Output = DistanceSample;
    type Error = Infallible;

    fn input(&self, x: &[f64; 1]) -> Result<Self::Input, Self::Error> {
        Ok(Mass::new::<pound>(x[0]))
    }

    fn residuals(&self, _input: &Self::Input, output: &Self::Output) -> Result<[f64; 1], Self::Error> {
        Ok([(output.distance - self.target).get::<foot>()])
    }
}
