//! Inputs to a performance calculation.
//!
//! [`Conditions`] is what a caller knows about a departure or arrival: the
//! aircraft weight and the runway, weather and surface conditions.
//! [`DerivedInputs`] is the same information reduced once, per evaluation, to
//! the engineering quantities the flight manual charts are indexed by.

use uom::si::{
    f64::{Length, Mass, Ratio, ThermodynamicTemperature, Velocity},
    length::{foot, inch},
    mass::pound,
    ratio::ratio,
    thermodynamic_temperature::degree_celsius,
    velocity::knot,
};

use crate::support::{
    constraint::{Constrained, NonNegative, StrictlyPositive},
    regression::Variables,
    units::isa_celsius,
};

/// Runway surface type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Surface {
    #[default]
    Paved,
    Unpaved,
}

/// Runway contaminant reported for a landing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContaminationKind {
    StandingWater,
    Slush,
    DrySnow,
    CompactSnow,
    /// A wet (not flooded) runway, corrected by a fixed factor rather than by depth.
    WetRunway,
}

impl ContaminationKind {
    /// The kinds corrected from contamination charts or formulas.
    pub const CHARTED: [Self; 4] = [
        Self::StandingWater,
        Self::Slush,
        Self::DrySnow,
        Self::CompactSnow,
    ];

    /// File stem used for this kind's reference data.
    #[must_use]
    pub fn file_stem(self) -> &'static str {
        match self {
            Self::StandingWater => "water",
            Self::Slush => "slush, wet snow",
            Self::DrySnow => "dry snow",
            Self::CompactSnow => "compact snow",
            Self::WetRunway => "wet runway",
        }
    }
}

/// A runway contaminant and its depth, if reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contamination {
    pub kind: ContaminationKind,
    pub depth: Option<Constrained<Length, NonNegative>>,
}

impl Contamination {
    #[must_use]
    pub fn new(kind: ContaminationKind) -> Self {
        Self { kind, depth: None }
    }

    #[must_use]
    pub fn with_depth(mut self, depth: Constrained<Length, NonNegative>) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Reported depth in inches; zero when no depth was reported.
    #[must_use]
    pub fn depth_inches(&self) -> f64 {
        self.depth.map_or(0.0, |depth| depth.into_inner().get::<inch>())
    }
}

/// Runway information from an airport data provider.
pub trait Runway {
    /// Field elevation, used as the pressure altitude.
    fn elevation(&self) -> Length;

    /// Runway gradient in the direction of travel; positive is uphill.
    fn gradient(&self) -> Ratio;

    /// Wind component along the runway; positive is a headwind.
    fn headwind(&self) -> Velocity;

    fn surface(&self) -> Surface {
        Surface::Paved
    }
}

/// Runway condition reports.
pub trait Notam {
    fn contamination(&self) -> Option<Contamination>;
}

/// Conditions for a takeoff, landing, or climb calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conditions {
    pub weight: Constrained<Mass, StrictlyPositive>,
    pub pressure_altitude: Length,
    /// Outside air temperature; ISA at the pressure altitude when unreported.
    pub temperature: Option<ThermodynamicTemperature>,
    /// Wind component along the runway; negative is a tailwind.
    pub headwind: Velocity,
    /// Runway gradient; negative is downhill.
    pub gradient: Ratio,
    pub surface: Surface,
    pub contamination: Option<Contamination>,
}

impl Conditions {
    /// Sea level, standard temperature, calm wind, level paved dry runway.
    #[must_use]
    pub fn new(weight: Constrained<Mass, StrictlyPositive>) -> Self {
        Self {
            weight,
            pressure_altitude: Length::new::<foot>(0.0),
            temperature: None,
            headwind: Velocity::new::<knot>(0.0),
            gradient: Ratio::new::<ratio>(0.0),
            surface: Surface::Paved,
            contamination: None,
        }
    }

    /// Builds conditions from the runway and condition-report collaborators.
    #[must_use]
    pub fn from_sources(
        weight: Constrained<Mass, StrictlyPositive>,
        temperature: Option<ThermodynamicTemperature>,
        runway: &impl Runway,
        notam: Option<&dyn Notam>,
    ) -> Self {
        Self {
            weight,
            pressure_altitude: runway.elevation(),
            temperature,
            headwind: runway.headwind(),
            gradient: runway.gradient(),
            surface: runway.surface(),
            contamination: notam.and_then(Notam::contamination),
        }
    }

    #[must_use]
    pub fn with_pressure_altitude(mut self, altitude: Length) -> Self {
        self.pressure_altitude = altitude;
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: ThermodynamicTemperature) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn with_headwind(mut self, headwind: Velocity) -> Self {
        self.headwind = headwind;
        self
    }

    #[must_use]
    pub fn with_gradient(mut self, gradient: Ratio) -> Self {
        self.gradient = gradient;
        self
    }

    #[must_use]
    pub fn with_surface(mut self, surface: Surface) -> Self {
        self.surface = surface;
        self
    }

    #[must_use]
    pub fn with_contamination(mut self, contamination: Contamination) -> Self {
        self.contamination = Some(contamination);
        self
    }

    #[must_use]
    pub fn with_weight(mut self, weight: Constrained<Mass, StrictlyPositive>) -> Self {
        self.weight = weight;
        self
    }
}

/// Chart-unit quantities derived from [`Conditions`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedInputs {
    /// Pounds.
    pub weight: f64,
    /// Feet.
    pub altitude: f64,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Knots, zero or positive.
    pub headwind: f64,
    /// Knots, zero or positive.
    pub tailwind: f64,
    /// Gradient as a fraction, zero or positive.
    pub uphill: f64,
    /// Gradient as a fraction, zero or positive.
    pub downhill: f64,
}

impl DerivedInputs {
    #[must_use]
    pub fn from_conditions(conditions: &Conditions) -> Self {
        let altitude = conditions.pressure_altitude.get::<foot>();
        let temperature = conditions
            .temperature
            .map_or_else(|| isa_celsius(altitude), |t| t.get::<degree_celsius>());
        let wind = conditions.headwind.get::<knot>();
        let gradient = conditions.gradient.get::<ratio>();

        Self {
            weight: conditions.weight.as_ref().get::<pound>(),
            altitude,
            temperature,
            headwind: wind.max(0.0),
            tailwind: (-wind).max(0.0),
            uphill: gradient.max(0.0),
            downhill: (-gradient).max(0.0),
        }
    }

    /// The derived inputs as named equation variables.
    #[must_use]
    pub fn variables(&self) -> Variables {
        Variables::new()
            .with("weight", self.weight)
            .with("altitude", self.altitude)
            .with("temperature", self.temperature)
            .with("headwind", self.headwind)
            .with("tailwind", self.tailwind)
            .with("uphill", self.uphill)
            .with("downhill", self.downhill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::ratio::percent;

    struct TestRunway;

    impl Runway for TestRunway {
        fn elevation(&self) -> Length {
            Length::new::<foot>(5000.0)
        }

        fn gradient(&self) -> Ratio {
            Ratio::new::<percent>(-1.5)
        }

        fn headwind(&self) -> Velocity {
            Velocity::new::<knot>(-7.0)
        }

        fn surface(&self) -> Surface {
            Surface::Unpaved
        }
    }

    struct Snowed;

    impl Notam for Snowed {
        fn contamination(&self) -> Option<Contamination> {
            Some(Contamination::new(ContaminationKind::CompactSnow))
        }
    }

    fn weight(lb: f64) -> Constrained<Mass, StrictlyPositive> {
        StrictlyPositive::new(Mass::new::<pound>(lb)).unwrap()
    }

    #[test]
    fn standard_temperature_when_unreported() {
        let conditions =
            Conditions::new(weight(5500.0)).with_pressure_altitude(Length::new::<foot>(5000.0));
        let derived = DerivedInputs::from_conditions(&conditions);
        assert_relative_eq!(derived.temperature, 5.094, epsilon = 1e-9);

        let conditions =
            conditions.with_temperature(ThermodynamicTemperature::new::<degree_celsius>(30.0));
        assert_relative_eq!(DerivedInputs::from_conditions(&conditions).temperature, 30.0);
    }

    #[test]
    fn wind_and_slope_split_into_halves() {
        let conditions = Conditions::new(weight(6000.0))
            .with_headwind(Velocity::new::<knot>(12.0))
            .with_gradient(Ratio::new::<percent>(2.0));
        let derived = DerivedInputs::from_conditions(&conditions);
        assert_relative_eq!(derived.headwind, 12.0, epsilon = 1e-9);
        assert_relative_eq!(derived.tailwind, 0.0);
        assert_relative_eq!(derived.uphill, 0.02, epsilon = 1e-12);
        assert_relative_eq!(derived.downhill, 0.0);
        assert_relative_eq!(derived.weight, 6000.0, epsilon = 1e-9);
    }

    #[test]
    fn conditions_from_collaborators() {
        let conditions =
            Conditions::from_sources(weight(5000.0), None, &TestRunway, Some(&Snowed));
        assert_eq!(conditions.surface, Surface::Unpaved);
        assert_eq!(
            conditions.contamination.map(|c| c.kind),
            Some(ContaminationKind::CompactSnow)
        );

        let derived = DerivedInputs::from_conditions(&conditions);
        assert_relative_eq!(derived.altitude, 5000.0, epsilon = 1e-9);
        assert_relative_eq!(derived.tailwind, 7.0, epsilon = 1e-9);
        assert_relative_eq!(derived.headwind, 0.0);
        assert_relative_eq!(derived.downhill, 0.015, epsilon = 1e-12);

        let variables = derived.variables();
        assert_eq!(variables.get("tailwind"), Some(derived.tailwind));
        assert_eq!(variables.get("weight"), Some(derived.weight));
    }

    #[test]
    fn depth_defaults_to_zero() {
        let dry_snow = Contamination::new(ContaminationKind::DrySnow);
        assert_relative_eq!(dry_snow.depth_inches(), 0.0);

        let depth = NonNegative::new(Length::new::<inch>(0.5)).unwrap();
        assert_relative_eq!(dry_snow.with_depth(depth).depth_inches(), 0.5, epsilon = 1e-12);
    }
}
