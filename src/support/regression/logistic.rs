use super::{
    EquationError,
    document::{LogisticDoc, NormalizationDoc},
    polynomial::Term,
};

/// Logistic classifier over normalized polynomial features.
///
/// Each input is normalized as `(x - offset) / scale` and referred to by a
/// short symbol. Feature names such as `"w a^2"` or `"w*a"` are products of
/// symbol powers.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Logistic {
    /// `(variable index, offset, scale)` for each symbol, in symbol order.
    normalization: Vec<(usize, f64, f64)>,
    terms: Vec<Term>,
    intercept: f64,
    threshold: f64,
}

impl Logistic {
    pub(super) fn from_doc(
        name: &str,
        variables: &[String],
        doc: LogisticDoc,
    ) -> Result<Self, EquationError> {
        let normalization = doc
            .normalization
            .iter()
            .map(
                |NormalizationDoc {
                     variable,
                     offset,
                     scale,
                     ..
                 }| {
                    let index = variables.iter().position(|v| v == variable).ok_or_else(|| {
                        EquationError::UndeclaredVariable {
                            name: name.to_owned(),
                            variable: variable.clone(),
                        }
                    })?;
                    if *scale == 0.0 || !scale.is_finite() {
                        return Err(EquationError::Normalization {
                            name: name.to_owned(),
                            variable: variable.clone(),
                        });
                    }
                    Ok((index, *offset, *scale))
                },
            )
            .collect::<Result<Vec<_>, _>>()?;

        let symbols: Vec<&str> = doc.normalization.iter().map(|n| n.symbol.as_str()).collect();
        let terms = doc
            .coefficients
            .iter()
            .map(|(feature, &coefficient)| {
                parse_feature(feature, &symbols)
                    .map(|powers| Term::new(coefficient, powers))
                    .ok_or_else(|| EquationError::Feature {
                        name: name.to_owned(),
                        feature: feature.clone(),
                    })
            })
            .collect::<Result<_, _>>()?;

        Ok(Self {
            normalization,
            terms,
            intercept: doc.intercept,
            threshold: doc.threshold,
        })
    }

    /// Probability of the positive class, in `(0, 1)`.
    pub(super) fn probability(&self, values: &[f64]) -> f64 {
        let features: Vec<f64> = self
            .normalization
            .iter()
            .map(|&(index, offset, scale)| (values[index] - offset) / scale)
            .collect();

        let z = self.intercept + self.terms.iter().map(|t| t.evaluate(&features)).sum::<f64>();
        1.0 / (1.0 + (-z).exp())
    }

    pub(super) fn classify(&self, values: &[f64]) -> bool {
        self.probability(values) > self.threshold
    }
}

/// Parses a product of symbol powers into a power per symbol.
///
/// Factors are separated by whitespace or `*`; each factor is `sym` or
/// `sym^p`. Returns `None` for unknown symbols or malformed powers.
fn parse_feature(feature: &str, symbols: &[&str]) -> Option<Vec<u32>> {
    let mut powers = vec![0; symbols.len()];
    let mut any = false;

    for factor in feature
        .split(|c: char| c.is_whitespace() || c == '*')
        .filter(|f| !f.is_empty())
    {
        let (symbol, power) = match factor.split_once('^') {
            Some((symbol, power)) => (symbol, power.parse::<u32>().ok()?),
            None => (factor, 1),
        };
        let index = symbols.iter().position(|s| *s == symbol)?;
        powers[index] += power;
        any = true;
    }

    any.then_some(powers)
}
