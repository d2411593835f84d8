use super::{EquationError, document::PolynomialDoc};

/// `intercept + Σ coefficient × Π x_i^power_i` over the declared variables.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Polynomial {
    intercept: f64,
    terms: Vec<Term>,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Term {
    coefficient: f64,
    powers: Vec<u32>,
}

impl Term {
    pub(super) fn new(coefficient: f64, powers: Vec<u32>) -> Self {
        Self {
            coefficient,
            powers,
        }
    }

    pub(super) fn evaluate(&self, values: &[f64]) -> f64 {
        self.powers
            .iter()
            .zip(values)
            .filter(|(power, _)| **power != 0)
            .fold(self.coefficient, |product, (&power, &x)| {
                product * i32::try_from(power).map_or(f64::NAN, |power| x.powi(power))
            })
    }
}

impl Polynomial {
    pub(super) fn from_doc(
        name: &str,
        n_variables: usize,
        doc: PolynomialDoc,
    ) -> Result<Self, EquationError> {
        let terms = doc
            .terms
            .into_iter()
            .enumerate()
            .map(|(index, term)| {
                if term.powers.len() == n_variables {
                    Ok(Term::new(term.coefficient, term.powers))
                } else {
                    Err(EquationError::Dimensionality {
                        name: name.to_owned(),
                        term: index,
                        expected: n_variables,
                        actual: term.powers.len(),
                    })
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self {
            intercept: doc.intercept,
            terms,
        })
    }

    pub(super) fn evaluate(&self, values: &[f64]) -> f64 {
        self.intercept + self.terms.iter().map(|term| term.evaluate(values)).sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::support::regression::document::TermDoc;

    #[test]
    fn quadratic_in_two_variables() {
        let doc = PolynomialDoc {
            intercept: 1.0,
            terms: vec![
                TermDoc {
                    coefficient: 2.0,
                    powers: vec![1, 0],
                },
                TermDoc {
                    coefficient: 0.5,
                    powers: vec![1, 1],
                },
                TermDoc {
                    coefficient: -3.0,
                    powers: vec![0, 2],
                },
            ],
        };
        let poly = Polynomial::from_doc("p", 2, doc).unwrap();

        // 1 + 2·4 + 0.5·4·3 − 3·9
        assert_relative_eq!(poly.evaluate(&[4.0, 3.0]), -12.0);
    }

    #[test]
    fn zero_power_ignores_value() {
        let term = Term::new(5.0, vec![0, 2]);
        assert_relative_eq!(term.evaluate(&[f64::NAN, 3.0]), 45.0);
    }

    #[test]
    fn powers_must_match_variables() {
        let doc = PolynomialDoc {
            intercept: 0.0,
            terms: vec![TermDoc {
                coefficient: 1.0,
                powers: vec![1],
            }],
        };
        assert!(matches!(
            Polynomial::from_doc("p", 3, doc),
            Err(EquationError::Dimensionality {
                term: 0,
                expected: 3,
                actual: 1,
                ..
            })
        ));
    }
}
