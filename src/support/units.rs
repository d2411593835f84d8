//! Extensions to [`uom`] for flight manual quantities.
//!
//! This crate uses [`uom`] for every physical quantity that crosses its
//! public API. Flight manual charts, however, are digitized in aviation
//! engineering units (pounds, feet, degrees Celsius, knots). This module holds
//! the few conversions [`uom`] does not provide directly.

use uom::si::{
    f64::{Length, Ratio, ThermodynamicTemperature},
    length::{foot, nautical_mile},
    ratio::ratio,
    thermodynamic_temperature::degree_celsius,
};

/// Sea-level temperature of the International Standard Atmosphere, in °C.
pub const ISA_SEA_LEVEL_CELSIUS: f64 = 15.0;

/// ISA temperature lapse rate, in °C per foot.
pub const ISA_LAPSE_RATE_CELSIUS_PER_FOOT: f64 = 0.001_981_2;

/// Returns the ISA standard temperature at a pressure altitude.
///
/// ```
/// use told_models::support::units::isa_temperature;
/// use uom::si::{f64::Length, length::foot, thermodynamic_temperature::degree_celsius};
///
/// let t = isa_temperature(Length::new::<foot>(5000.0));
/// assert!((t.get::<degree_celsius>() - 5.094).abs() < 1e-9);
/// ```
#[must_use]
pub fn isa_temperature(pressure_altitude: Length) -> ThermodynamicTemperature {
    ThermodynamicTemperature::new::<degree_celsius>(isa_celsius(pressure_altitude.get::<foot>()))
}

/// ISA temperature in °C at a pressure altitude in feet.
#[must_use]
pub fn isa_celsius(altitude_ft: f64) -> f64 {
    ISA_SEA_LEVEL_CELSIUS - ISA_LAPSE_RATE_CELSIUS_PER_FOOT * altitude_ft
}

/// Converts a climb gradient in feet per nautical mile to a ratio.
#[must_use]
pub fn gradient_from_feet_per_nautical_mile(feet_per_nm: f64) -> Ratio {
    Length::new::<foot>(feet_per_nm) / Length::new::<nautical_mile>(1.0)
}

/// Converts a climb gradient ratio to feet per nautical mile.
#[must_use]
pub fn feet_per_nautical_mile(gradient: Ratio) -> f64 {
    gradient.get::<ratio>() * Length::new::<nautical_mile>(1.0).get::<foot>()
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn isa_at_sea_level_and_altitude() {
        assert_relative_eq!(isa_celsius(0.0), 15.0);
        assert_relative_eq!(isa_celsius(10_000.0), -4.812, epsilon = 1e-12);
        assert_relative_eq!(
            isa_temperature(Length::new::<foot>(1000.0)).get::<degree_celsius>(),
            13.0188,
            epsilon = 1e-9
        );
    }

    #[test]
    fn gradient_conversions() {
        // 6076.12 ft in a nautical mile.
        let gradient = gradient_from_feet_per_nautical_mile(607.611_548_556_430_4);
        assert_relative_eq!(gradient.get::<ratio>(), 0.1, epsilon = 1e-9);
        assert_relative_eq!(
            feet_per_nautical_mile(gradient),
            607.611_548_556_430_4,
            epsilon = 1e-6
        );
    }
}
