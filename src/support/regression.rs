//! Regression equations fitted to flight manual charts.
//!
//! A [`RegressionEquation`] is a typed formula loaded from a versioned JSON
//! document:
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "name": "takeoff ground run",
//!   "type": "polynomial",
//!   "variables": ["weight", "altitude", "temperature"],
//!   "uncertainty_key": "g2/takeoff/ground run",
//!   "equation": { "intercept": 120.0, "terms": [{ "coefficient": 0.3, "powers": [1, 0, 0] }] }
//! }
//! ```
//!
//! Unlike table interpolation, equations evaluate anywhere their inputs are
//! defined, including outside the data they were fitted to. Consumers that
//! care about extrapolation check bounds separately.
//!
//! Equations with an `uncertainty_key` attach the residual RMSE for the
//! evaluated inputs, producing [`Value::Uncertain`].

mod document;
mod error;
mod logistic;
mod piecewise;
mod polynomial;

use std::{collections::BTreeMap, fs, path::Path, sync::Arc};

use serde::Deserialize;

use crate::support::{
    residual::{ResidualData, ResidualErrorCalculator},
    value::Value,
};

pub use document::Operator;
pub use error::EquationError;

use document::{
    ConstantDoc, EquationDocument, LinearDoc, LogisticDoc, PiecewiseDoc, PolynomialDoc,
    SUPPORTED_VERSION,
};
use logistic::Logistic;
use piecewise::Piecewise;
use polynomial::Polynomial;

/// The form of a regression equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquationType {
    Polynomial,
    Linear,
    Constant,
    Piecewise,
    Logistic,
}

/// Named inputs for equation evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables(BTreeMap<String, f64>);

impl Variables {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a variable.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    /// Iterates over variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, &value)| (name.as_str(), value))
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for Variables {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(name, x)| (name.into(), x)).collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Formula {
    Polynomial(Polynomial),
    Linear { slope: f64, intercept: f64 },
    Constant(f64),
    Piecewise(Piecewise),
    Logistic(Logistic),
}

/// A typed regression formula with optional residual uncertainty.
///
/// Equations are immutable after construction and safe to share.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionEquation {
    name: String,
    kind: EquationType,
    variables: Vec<String>,
    uncertainty_key: Option<String>,
    residuals: Option<Arc<ResidualData>>,
    formula: Formula,
}

impl RegressionEquation {
    /// Parses an equation document.
    ///
    /// If the document declares an `uncertainty_key`, the residual data is
    /// resolved from `residuals` now so evaluation cannot fail later.
    ///
    /// # Errors
    ///
    /// Returns an [`EquationError`] if the document is malformed, has an
    /// unsupported version, is internally inconsistent, or refers to missing
    /// residual data.
    pub fn from_json(
        text: &str,
        residuals: &ResidualErrorCalculator,
    ) -> Result<Self, EquationError> {
        let doc: EquationDocument = serde_json::from_str(text).map_err(EquationError::Parse)?;
        Self::from_document(doc, residuals)
    }

    /// Reads and parses an equation file.
    ///
    /// # Errors
    ///
    /// Returns an [`EquationError`] if the file cannot be read or parsed.
    pub fn load(
        path: impl AsRef<Path>,
        residuals: &ResidualErrorCalculator,
    ) -> Result<Self, EquationError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| EquationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let equation = Self::from_json(&text, residuals)?;
        tracing::debug!(?path, name = %equation.name, kind = ?equation.kind, "loaded equation");
        Ok(equation)
    }

    fn from_document(
        doc: EquationDocument,
        residuals: &ResidualErrorCalculator,
    ) -> Result<Self, EquationError> {
        let EquationDocument {
            version,
            name,
            kind,
            variables,
            uncertainty_key,
            equation,
        } = doc;

        if version != SUPPORTED_VERSION {
            return Err(EquationError::UnsupportedVersion { name, version });
        }

        let formula = match kind {
            EquationType::Polynomial => {
                let doc: PolynomialDoc = parse_payload(&name, kind, equation)?;
                Formula::Polynomial(Polynomial::from_doc(&name, variables.len(), doc)?)
            }
            EquationType::Linear => {
                if variables.is_empty() {
                    return Err(EquationError::NoVariables { name });
                }
                let LinearDoc { slope, intercept } = parse_payload(&name, kind, equation)?;
                Formula::Linear { slope, intercept }
            }
            EquationType::Constant => {
                let ConstantDoc { value } = parse_payload(&name, kind, equation)?;
                Formula::Constant(value)
            }
            EquationType::Piecewise => {
                let doc: PiecewiseDoc = parse_payload(&name, kind, equation)?;
                Formula::Piecewise(Piecewise::from_doc(&name, &variables, doc)?)
            }
            EquationType::Logistic => {
                let doc: LogisticDoc = parse_payload(&name, kind, equation)?;
                Formula::Logistic(Logistic::from_doc(&name, &variables, doc)?)
            }
        };

        let residuals = uncertainty_key
            .as_deref()
            .map(|key| residuals.table(key))
            .transpose()
            .map_err(|source| EquationError::Residual {
                name: name.clone(),
                source,
            })?;

        Ok(Self {
            name,
            kind,
            variables,
            uncertainty_key,
            residuals,
            formula,
        })
    }

    /// Creates a constant equation with no variables or uncertainty.
    #[must_use]
    pub fn constant(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            kind: EquationType::Constant,
            variables: Vec::new(),
            uncertainty_key: None,
            residuals: None,
            formula: Formula::Constant(value),
        }
    }

    /// Creates `slope × variable + intercept` with no uncertainty.
    #[must_use]
    pub fn linear(
        name: impl Into<String>,
        variable: impl Into<String>,
        slope: f64,
        intercept: f64,
    ) -> Self {
        Self {
            name: name.into(),
            kind: EquationType::Linear,
            variables: vec![variable.into()],
            uncertainty_key: None,
            residuals: None,
            formula: Formula::Linear { slope, intercept },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EquationType {
        self.kind
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn uncertainty_key(&self) -> Option<&str> {
        self.uncertainty_key.as_deref()
    }

    /// Evaluates the equation.
    ///
    /// Returns [`Value::Invalid`] if a declared variable is missing, no
    /// piecewise breakpoint matches, or the result is not finite. Logistic
    /// equations evaluate to their probability.
    pub fn evaluate(&self, inputs: &Variables) -> Value<f64> {
        let Some(values) = self.declared_values(inputs) else {
            return Value::Invalid;
        };

        let result = match &self.formula {
            Formula::Polynomial(polynomial) => polynomial.evaluate(&values),
            Formula::Linear { slope, intercept } => slope * values[0] + intercept,
            Formula::Constant(value) => *value,
            Formula::Piecewise(piecewise) => match piecewise.evaluate(&values) {
                Some(result) => result,
                None => return Value::Invalid,
            },
            Formula::Logistic(logistic) => logistic.probability(&values),
        };

        match (Value::finite(result), &self.residuals) {
            (Value::Computed(result), Some(residuals)) => {
                Value::with_uncertainty(result, residuals.rmse(inputs.iter()))
            }
            (value, _) => value,
        }
    }

    /// Evaluates a logistic equation as a classification.
    ///
    /// Returns [`Value::Invalid`] for other equation types or if a declared
    /// variable is missing.
    pub fn evaluate_bool(&self, inputs: &Variables) -> Value<bool> {
        let Formula::Logistic(logistic) = &self.formula else {
            return Value::Invalid;
        };
        match self.declared_values(inputs) {
            Some(values) if values.iter().all(|x| x.is_finite()) => {
                Value::Computed(logistic.classify(&values))
            }
            _ => Value::Invalid,
        }
    }

    /// Collects the declared variables in order, or `None` if any is missing.
    fn declared_values(&self, inputs: &Variables) -> Option<Vec<f64>> {
        self.variables.iter().map(|name| inputs.get(name)).collect()
    }
}

fn parse_payload<T: serde::de::DeserializeOwned>(
    name: &str,
    kind: EquationType,
    equation: serde_json::Value,
) -> Result<T, EquationError> {
    serde_json::from_value(equation).map_err(|source| EquationError::Payload {
        name: name.to_owned(),
        kind,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::support::residual::ResidualDataset;

    const RESIDUALS: &str = r#"{
        "g2/takeoff/ground run": {
            "overall_rmse": 40.0,
            "overall_max_error": 120.0,
            "bins": {
                "weight": [{"range": [5000, 6500], "rmse": 30.0, "max_error": 90.0}],
                "temperature": [{"range": [0, 50], "rmse": 40.0, "max_error": 100.0}]
            }
        }
    }"#;

    fn residuals() -> ResidualErrorCalculator {
        ResidualErrorCalculator::new(Arc::new(ResidualDataset::from_json(RESIDUALS).unwrap()))
    }

    const GROUND_RUN: &str = r#"{
        "version": "1.0",
        "name": "takeoff ground run",
        "type": "polynomial",
        "variables": ["weight", "altitude", "temperature"],
        "uncertainty_key": "g2/takeoff/ground run",
        "equation": {
            "intercept": -1500.0,
            "terms": [
                {"coefficient": 0.5, "powers": [1, 0, 0]},
                {"coefficient": 0.05, "powers": [0, 1, 0]},
                {"coefficient": 0.2, "powers": [0, 0, 2]}
            ]
        }
    }"#;

    fn inputs(weight: f64, altitude: f64, temperature: f64) -> Variables {
        Variables::new()
            .with("weight", weight)
            .with("altitude", altitude)
            .with("temperature", temperature)
    }

    #[test]
    fn polynomial_with_uncertainty() {
        let eq = RegressionEquation::from_json(GROUND_RUN, &residuals()).unwrap();
        assert_eq!(eq.kind(), EquationType::Polynomial);
        assert_eq!(eq.uncertainty_key(), Some("g2/takeoff/ground run"));

        let value = eq.evaluate(&inputs(6000.0, 2000.0, 20.0));
        // −1500 + 3000 + 100 + 80
        assert_relative_eq!(*value.value().unwrap(), 1680.0);
        assert_relative_eq!(*value.uncertainty().unwrap(), 50.0);
    }

    #[test]
    fn extrapolates_without_refusing() {
        let eq = RegressionEquation::from_json(GROUND_RUN, &residuals()).unwrap();
        let value = eq.evaluate(&inputs(7000.0, 2000.0, 60.0));
        assert_relative_eq!(*value.value().unwrap(), -1500.0 + 3500.0 + 100.0 + 720.0);
        // Neither bin matches, so the overall RMSE applies.
        assert_relative_eq!(*value.uncertainty().unwrap(), 40.0);
    }

    #[test]
    fn missing_variable_is_invalid() {
        let eq = RegressionEquation::from_json(GROUND_RUN, &residuals()).unwrap();
        let partial = Variables::new().with("weight", 6000.0).with("altitude", 0.0);
        assert_eq!(eq.evaluate(&partial), Value::Invalid);
    }

    #[test]
    fn linear_and_constant_without_uncertainty() {
        let linear = RegressionEquation::from_json(
            r#"{"version": "1.0", "name": "headwind factor", "type": "linear",
                "variables": ["weight", "altitude"],
                "equation": {"slope": 1e-5, "intercept": 0.05}}"#,
            &ResidualErrorCalculator::default(),
        )
        .unwrap();
        assert_relative_eq!(
            *linear.evaluate(&inputs(5000.0, 1000.0, 0.0)).value().unwrap(),
            0.1,
            epsilon = 1e-12
        );
        assert!(linear.evaluate(&inputs(5000.0, 0.0, 0.0)).uncertainty().is_none());

        let constant = RegressionEquation::constant("unpaved factor", 0.2);
        assert_eq!(constant.evaluate(&Variables::new()), Value::Computed(0.2));
    }

    #[test]
    fn piecewise_document() {
        let eq = RegressionEquation::from_json(
            r#"{"version": "1.0", "name": "tailwind factor", "type": "piecewise",
                "variables": ["weight"],
                "equation": {"pieces": [
                    {"condition": {"variable": "weight", "operator": "<=", "value": 5000},
                     "result": {"type": "constant", "value": 0.4}},
                    {"condition": {"variable": "weight", "operator": ">", "value": 5000},
                     "result": {"type": "linear", "variable": "weight", "slope": 0.0002, "intercept": -0.6}}
                ]}}"#,
            &ResidualErrorCalculator::default(),
        )
        .unwrap();
        let factor = |w| *eq.evaluate(&Variables::new().with("weight", w)).value().unwrap();
        assert_relative_eq!(factor(4500.0), 0.4);
        assert_relative_eq!(factor(6000.0), 0.6, epsilon = 1e-12);
    }

    #[test]
    fn logistic_classification() {
        let eq = RegressionEquation::from_json(
            r#"{"version": "1.0", "name": "go around", "type": "logistic",
                "variables": ["weight", "altitude", "temperature"],
                "equation": {
                    "normalization": [
                        {"variable": "weight", "symbol": "w", "offset": 5500, "scale": 500},
                        {"variable": "altitude", "symbol": "a", "offset": 5000, "scale": 5000},
                        {"variable": "temperature", "symbol": "t", "offset": 15, "scale": 25}
                    ],
                    "coefficients": {"w": -3.0, "a": -2.0, "t": -2.0, "w a": -1.0},
                    "intercept": 2.0,
                    "threshold": 0.5
                }}"#,
            &ResidualErrorCalculator::default(),
        )
        .unwrap();

        assert_eq!(
            eq.evaluate_bool(&inputs(5000.0, 0.0, 15.0)),
            Value::Computed(true)
        );
        assert_eq!(
            eq.evaluate_bool(&inputs(6000.0, 10000.0, 40.0)),
            Value::Computed(false)
        );
        assert_eq!(
            eq.evaluate_bool(&Variables::new().with("weight", 5000.0)),
            Value::Invalid
        );

        let probability = eq.evaluate(&inputs(5500.0, 5000.0, 15.0));
        assert_relative_eq!(
            *probability.value().unwrap(),
            1.0 / (1.0 + (-2.0_f64).exp())
        );
    }

    #[test]
    fn evaluate_bool_requires_logistic() {
        let eq = RegressionEquation::constant("c", 1.0);
        assert_eq!(eq.evaluate_bool(&Variables::new()), Value::Invalid);
    }

    #[test]
    fn construction_errors() {
        let calc = residuals();

        let wrong_version = GROUND_RUN.replace("\"1.0\"", "\"2.0\"");
        assert!(matches!(
            RegressionEquation::from_json(&wrong_version, &calc),
            Err(EquationError::UnsupportedVersion { version, .. }) if version == "2.0"
        ));

        let missing_key = GROUND_RUN.replace("g2/takeoff/ground run", "g2/takeoff/total");
        assert!(matches!(
            RegressionEquation::from_json(&missing_key, &calc),
            Err(EquationError::Residual { .. })
        ));

        let missing_field = r#"{"version": "1.0", "name": "x", "type": "linear",
            "variables": ["weight"], "equation": {"slope": 1.0}}"#;
        assert!(matches!(
            RegressionEquation::from_json(missing_field, &calc),
            Err(EquationError::Payload {
                kind: EquationType::Linear,
                ..
            })
        ));

        let no_variables = r#"{"version": "1.0", "name": "x", "type": "linear",
            "variables": [], "equation": {"slope": 1.0, "intercept": 0.0}}"#;
        assert!(matches!(
            RegressionEquation::from_json(no_variables, &calc),
            Err(EquationError::NoVariables { .. })
        ));

        assert!(matches!(
            RegressionEquation::from_json("{", &calc),
            Err(EquationError::Parse(_))
        ));

        let unknown_type = r#"{"version": "1.0", "name": "x", "type": "spline",
            "variables": [], "equation": {}}"#;
        assert!(matches!(
            RegressionEquation::from_json(unknown_type, &calc),
            Err(EquationError::Parse(_))
        ));
    }

    #[test]
    fn negative_powers_are_rejected() {
        let inverse = r#"{"version": "1.0", "name": "inverse", "type": "polynomial",
            "variables": ["weight"],
            "equation": {"intercept": 0.0, "terms": [{"coefficient": 1.0, "powers": [-1]}]}}"#;
        assert!(matches!(
            RegressionEquation::from_json(inverse, &residuals()),
            Err(EquationError::Payload {
                kind: EquationType::Polynomial,
                ..
            })
        ));
    }

    #[test]
    fn variables_collect_from_pairs() {
        let vars: Variables = [("weight", 5000.0), ("altitude", 0.0)].into_iter().collect();
        assert_eq!(vars.get("weight"), Some(5000.0));
        assert_eq!(vars.get("temperature"), None);
        assert_eq!(
            vars.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            ["altitude", "weight"]
        );
    }
}
