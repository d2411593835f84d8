//! Terminal-state results for performance calculations.
//!
//! Every evaluation in this crate returns a [`Value`] rather than a `Result`.
//! A value is either computed (optionally carrying a one-sigma uncertainty) or
//! in one of several terminal states describing why no number is available.
//!
//! Terminal states are absorbing: scaling, [`Value::map`], and
//! [`Value::flat_map`] pass them through unchanged, so a chain of operations
//! never needs per-step error handling.
//!
//! ```
//! use told_models::support::value::Value;
//!
//! let run = Value::with_uncertainty(2000.0, 40.0) * 1.1;
//! assert!(run.contains(2200.0, 0.95));
//!
//! let refused = Value::<f64>::OffscaleHigh * 1.1;
//! assert_eq!(refused, Value::OffscaleHigh);
//! ```

mod confidence;

use std::ops::Mul;

use num_traits::{Float, NumCast};

pub use confidence::z_score;

/// The result of a performance calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<T> {
    /// A computed value without an uncertainty estimate.
    Computed(T),

    /// A computed value with a one-sigma uncertainty.
    Uncertain { value: T, uncertainty: T },

    /// The inputs lie below the domain covered by the reference data.
    OffscaleLow,

    /// The inputs lie above the domain covered by the reference data.
    OffscaleHigh,

    /// The reference data does not provide this output.
    NotAvailable,

    /// The requested operation is not approved for this aircraft.
    NotAuthorized,

    /// The inputs or intermediate results are malformed.
    Invalid,
}

impl<T> Value<T> {
    /// Creates a computed value with a one-sigma uncertainty.
    pub fn with_uncertainty(value: T, uncertainty: T) -> Self {
        Self::Uncertain { value, uncertainty }
    }

    /// Returns `true` for [`Value::Computed`] and [`Value::Uncertain`].
    pub fn is_computed(&self) -> bool {
        matches!(self, Self::Computed(_) | Self::Uncertain { .. })
    }

    /// Returns the computed value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Computed(value) | Self::Uncertain { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Returns the uncertainty, if the value carries one.
    pub fn uncertainty(&self) -> Option<&T> {
        match self {
            Self::Uncertain { uncertainty, .. } => Some(uncertainty),
            _ => None,
        }
    }

    /// Rewrites the `(value, uncertainty)` pair of a computed value.
    ///
    /// Terminal states are returned unchanged.
    /// If the closure drops the uncertainty the result is [`Value::Computed`].
    pub fn map<U>(self, f: impl FnOnce(T, Option<T>) -> (U, Option<U>)) -> Value<U> {
        let (value, uncertainty) = match self {
            Self::Computed(value) => f(value, None),
            Self::Uncertain { value, uncertainty } => f(value, Some(uncertainty)),
            state => return state.retype(),
        };
        match uncertainty {
            Some(uncertainty) => Value::Uncertain { value, uncertainty },
            None => Value::Computed(value),
        }
    }

    /// Applies `f` to both the value and its uncertainty.
    ///
    /// Use this for unit conversions, where the uncertainty transforms with
    /// the value.
    pub fn map_each<U>(self, f: impl Fn(T) -> U) -> Value<U> {
        self.map(|value, uncertainty| (f(value), uncertainty.map(&f)))
    }

    /// Chains a step that can itself fail.
    ///
    /// A terminal receiver propagates. Otherwise `f` is invoked on the value
    /// and its result, including any terminal state, is the final result.
    pub fn flat_map<U>(self, f: impl FnOnce(T) -> Value<U>) -> Value<U> {
        match self {
            Self::Computed(value) | Self::Uncertain { value, .. } => f(value),
            state => state.retype(),
        }
    }

    /// Carries a terminal state over to another payload type.
    ///
    /// Computed values become [`Value::Invalid`]; callers only use this on
    /// states already known to be terminal.
    fn retype<U>(self) -> Value<U> {
        match self {
            Self::OffscaleLow => Value::OffscaleLow,
            Self::OffscaleHigh => Value::OffscaleHigh,
            Self::NotAvailable => Value::NotAvailable,
            Self::NotAuthorized => Value::NotAuthorized,
            Self::Computed(_) | Self::Uncertain { .. } | Self::Invalid => Value::Invalid,
        }
    }

    /// Returns the terminal state of `self` with a new payload type, or `None`
    /// if `self` is computed.
    pub fn terminal<U>(&self) -> Option<Value<U>> {
        match self {
            Self::Computed(_) | Self::Uncertain { .. } => None,
            Self::OffscaleLow => Some(Value::OffscaleLow),
            Self::OffscaleHigh => Some(Value::OffscaleHigh),
            Self::NotAvailable => Some(Value::NotAvailable),
            Self::NotAuthorized => Some(Value::NotAuthorized),
            Self::Invalid => Some(Value::Invalid),
        }
    }
}

impl<T: Float> Value<T> {
    /// Creates a computed value, mapping non-finite numbers to [`Value::Invalid`].
    pub fn finite(value: T) -> Self {
        if value.is_finite() {
            Self::Computed(value)
        } else {
            Self::Invalid
        }
    }

    /// Checks whether `expected` lies within the confidence interval of this value.
    ///
    /// The uncertainty is treated as one Gaussian standard deviation, so the
    /// check is `|expected - value| <= z(confidence_level) * sigma`.
    /// A value without uncertainty must match to within a relative `1e-9`.
    /// Terminal states never contain anything.
    pub fn contains(&self, expected: T, confidence_level: f64) -> bool {
        match *self {
            Self::Computed(value) => {
                let tolerance = <T as NumCast>::from(1e-9).unwrap_or_else(T::epsilon)
                    * value.abs().max(T::one());
                (expected - value).abs() <= tolerance
            }
            Self::Uncertain { value, uncertainty } => {
                match <T as NumCast>::from(z_score(confidence_level)) {
                    Some(z) => (expected - value).abs() <= z * uncertainty.abs(),
                    None => false,
                }
            }
            _ => false,
        }
    }
}

/// Scales a computed value and its uncertainty.
///
/// The uncertainty is scaled by the magnitude of the factor so it stays
/// non-negative.
impl<T: Float> Mul<T> for Value<T> {
    type Output = Self;

    fn mul(self, factor: T) -> Self {
        self.map(|value, uncertainty| (value * factor, uncertainty.map(|u| u * factor.abs())))
    }
}

/// Multiplies two values, propagating uncertainty to first order.
///
/// A terminal state on the left takes precedence over one on the right.
impl<T: Float> Mul for Value<T> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        if let Some(state) = self.terminal() {
            return state;
        }
        if let Some(state) = rhs.terminal() {
            return state;
        }
        let (a, sa) = self.parts();
        let (b, sb) = rhs.parts();
        match (sa, sb) {
            (None, None) => Self::Computed(a * b),
            (sa, sb) => {
                let sa = sa.unwrap_or_else(T::zero);
                let sb = sb.unwrap_or_else(T::zero);
                Self::Uncertain {
                    value: a * b,
                    uncertainty: (b * sa).hypot(a * sb),
                }
            }
        }
    }
}

impl<T: Float> Value<T> {
    /// Splits a computed value into value and optional uncertainty.
    ///
    /// Only called on computed values.
    fn parts(self) -> (T, Option<T>) {
        match self {
            Self::Computed(value) => (value, None),
            Self::Uncertain { value, uncertainty } => (value, Some(uncertainty)),
            _ => (T::nan(), None),
        }
    }
}

impl<T> From<T> for Value<T> {
    fn from(value: T) -> Self {
        Self::Computed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn terminal_states() -> [Value<f64>; 5] {
        [
            Value::OffscaleLow,
            Value::OffscaleHigh,
            Value::NotAvailable,
            Value::NotAuthorized,
            Value::Invalid,
        ]
    }

    #[test]
    fn scaling_computed_values() {
        assert_eq!(Value::Computed(100.0) * 1.5, Value::Computed(150.0));

        let scaled = Value::with_uncertainty(100.0, 10.0) * 1.1;
        assert_relative_eq!(*scaled.value().unwrap(), 110.0);
        assert_relative_eq!(*scaled.uncertainty().unwrap(), 11.0);

        let negated = Value::with_uncertainty(2.0, 0.5) * -2.0;
        assert_relative_eq!(*negated.uncertainty().unwrap(), 1.0);
    }

    #[test]
    fn map_drops_or_keeps_uncertainty() {
        let value = Value::with_uncertainty(10.0, 2.0);
        assert_eq!(value.map(|v, _| (v + 1.0, None)), Value::Computed(11.0));
        assert_eq!(
            Value::Computed(10.0).map(|v, _| (v, Some(3.0))),
            Value::with_uncertainty(10.0, 3.0)
        );
        assert_eq!(Value::<f64>::OffscaleLow.map(|v, u| (v, u)), Value::OffscaleLow);
    }

    #[test]
    fn flat_map_takes_the_weakest_link() {
        let chained = Value::Computed(1000.0).flat_map(|_| Value::<f64>::OffscaleHigh);
        assert_eq!(chained, Value::OffscaleHigh);

        let chained = Value::<f64>::NotAuthorized.flat_map(|v| Value::Computed(v * 2.0));
        assert_eq!(chained, Value::NotAuthorized);

        let chained = Value::with_uncertainty(3.0, 1.0).flat_map(|v| Value::Computed(v > 2.0));
        assert_eq!(chained, Value::Computed(true));
    }

    #[test]
    fn value_products() {
        let product = Value::Computed(2.0) * Value::Computed(3.0);
        assert_eq!(product, Value::Computed(6.0));

        let product = Value::with_uncertainty(100.0, 3.0) * Value::with_uncertainty(2.0, 0.02);
        assert_relative_eq!(*product.value().unwrap(), 200.0);
        assert_relative_eq!(*product.uncertainty().unwrap(), 6.0_f64.hypot(2.0));

        assert_eq!(Value::<f64>::OffscaleLow * Value::OffscaleHigh, Value::OffscaleLow);
        assert_eq!(Value::Computed(1.0) * Value::Invalid, Value::Invalid);
    }

    #[test]
    fn confidence_interval_membership() {
        let value = Value::with_uncertainty(1000.0, 50.0);
        assert!(value.contains(1090.0, 0.95));
        assert!(!value.contains(1110.0, 0.95));
        assert!(value.contains(1110.0, 0.99));

        assert!(Value::Computed(150.0).contains(150.0, 0.95));
        assert!(!Value::Computed(150.0).contains(150.1, 0.95));
        assert!(!Value::<f64>::OffscaleHigh.contains(0.0, 0.95));
    }

    #[test]
    fn non_finite_values_are_invalid() {
        assert_eq!(Value::finite(f64::NAN), Value::Invalid);
        assert_eq!(Value::finite(f64::INFINITY), Value::Invalid);
        assert_eq!(Value::finite(1.0), Value::Computed(1.0));
    }

    proptest! {
        #[test]
        fn terminal_states_absorb_scaling(factor in -1e6_f64..1e6) {
            for state in terminal_states() {
                prop_assert_eq!(state * factor, state);
                prop_assert_eq!(state.map_each(|v| v * factor), state);
            }
        }
    }
}
