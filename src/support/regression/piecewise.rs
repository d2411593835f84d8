use super::{
    EquationError,
    document::{ConditionDoc, Operator, PieceResultDoc, PiecewiseDoc},
};

/// Guarded breakpoints evaluated in declared order.
///
/// The first piece whose condition holds supplies the result, so the order
/// of pieces is part of the equation's meaning.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Piecewise {
    pieces: Vec<Piece>,
}

#[derive(Debug, Clone, PartialEq)]
struct Piece {
    condition: Option<Condition>,
    result: PieceResult,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Condition {
    variable: usize,
    operator: Operator,
    value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PieceResult {
    Constant(f64),
    Linear {
        variable: usize,
        slope: f64,
        intercept: f64,
        min: Option<f64>,
        max: Option<f64>,
    },
}

impl Piecewise {
    pub(super) fn from_doc(
        name: &str,
        variables: &[String],
        doc: PiecewiseDoc,
    ) -> Result<Self, EquationError> {
        let index_of = |variable: &str| {
            variables
                .iter()
                .position(|v| v == variable)
                .ok_or_else(|| EquationError::UndeclaredVariable {
                    name: name.to_owned(),
                    variable: variable.to_owned(),
                })
        };

        let pieces = doc
            .pieces
            .into_iter()
            .map(|piece| {
                let condition = piece
                    .condition
                    .map(|ConditionDoc { variable, operator, value }| {
                        Ok::<_, EquationError>(Condition {
                            variable: index_of(&variable)?,
                            operator,
                            value,
                        })
                    })
                    .transpose()?;

                let result = match piece.result {
                    PieceResultDoc::Constant { value } => PieceResult::Constant(value),
                    PieceResultDoc::Linear {
                        variable,
                        slope,
                        intercept,
                        min,
                        max,
                    } => PieceResult::Linear {
                        variable: index_of(&variable)?,
                        slope,
                        intercept,
                        min,
                        max,
                    },
                };

                Ok(Piece { condition, result })
            })
            .collect::<Result<_, EquationError>>()?;

        Ok(Self { pieces })
    }

    /// Returns the first matching piece's result, or `None` if no piece matches.
    pub(super) fn evaluate(&self, values: &[f64]) -> Option<f64> {
        let piece = self.pieces.iter().find(|piece| {
            piece.condition.is_none_or(|condition| {
                condition
                    .operator
                    .holds(values[condition.variable], condition.value)
            })
        })?;

        Some(match piece.result {
            PieceResult::Constant(value) => value,
            PieceResult::Linear {
                variable,
                slope,
                intercept,
                min,
                max,
            } => {
                let y = slope * values[variable] + intercept;
                let y = min.map_or(y, |min| y.max(min));
                max.map_or(y, |max| y.min(max))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn piecewise(json: &str) -> Result<Piecewise, EquationError> {
        let doc: PiecewiseDoc = serde_json::from_str(json).unwrap();
        Piecewise::from_doc("factor", &["weight".to_owned()], doc)
    }

    #[test]
    fn first_matching_piece_wins() {
        // Both pieces hold at 4000 lb; declared order decides.
        let eq = piecewise(
            r#"{"pieces": [
                {"condition": {"variable": "weight", "operator": "<", "value": 5000},
                 "result": {"type": "linear", "variable": "weight", "slope": 0.0001, "intercept": 0.1}},
                {"condition": {"variable": "weight", "operator": "<", "value": 6000},
                 "result": {"type": "constant", "value": 0.9}},
                {"result": {"type": "constant", "value": 0.6}}
            ]}"#,
        )
        .unwrap();

        assert_relative_eq!(eq.evaluate(&[4000.0]).unwrap(), 0.5);
        assert_relative_eq!(eq.evaluate(&[5000.0]).unwrap(), 0.9);
        assert_relative_eq!(eq.evaluate(&[7000.0]).unwrap(), 0.6);
    }

    #[test]
    fn linear_piece_is_clamped() {
        let eq = piecewise(
            r#"{"pieces": [
                {"condition": {"variable": "weight", "operator": ">=", "value": 0},
                 "result": {"type": "linear", "variable": "weight", "slope": 0.001,
                            "intercept": 0.0, "min": 2.0, "max": 5.0}}
            ]}"#,
        )
        .unwrap();

        assert_relative_eq!(eq.evaluate(&[1000.0]).unwrap(), 2.0);
        assert_relative_eq!(eq.evaluate(&[3000.0]).unwrap(), 3.0);
        assert_relative_eq!(eq.evaluate(&[9000.0]).unwrap(), 5.0);
        assert_eq!(eq.evaluate(&[-1.0]), None);
    }

    #[test]
    fn undeclared_condition_variable() {
        let result = piecewise(
            r#"{"pieces": [
                {"condition": {"variable": "altitude", "operator": "<=", "value": 0},
                 "result": {"type": "constant", "value": 1.0}}
            ]}"#,
        );
        assert!(matches!(
            result,
            Err(EquationError::UndeclaredVariable { variable, .. }) if variable == "altitude"
        ));
    }
}
