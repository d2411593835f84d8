//! Versioned JSON schema for equation files.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::EquationType;

/// The only schema version accepted.
pub(super) const SUPPORTED_VERSION: &str = "1.0";

#[derive(Debug, Deserialize)]
pub(super) struct EquationDocument {
    pub(super) version: String,
    pub(super) name: String,
    #[serde(rename = "type")]
    pub(super) kind: EquationType,
    pub(super) variables: Vec<String>,
    #[serde(default)]
    pub(super) uncertainty_key: Option<String>,
    pub(super) equation: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub(super) struct PolynomialDoc {
    pub(super) intercept: f64,
    pub(super) terms: Vec<TermDoc>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TermDoc {
    pub(super) coefficient: f64,
    pub(super) powers: Vec<u32>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LinearDoc {
    pub(super) slope: f64,
    pub(super) intercept: f64,
}

#[derive(Debug, Deserialize)]
pub(super) struct ConstantDoc {
    pub(super) value: f64,
}

#[derive(Debug, Deserialize)]
pub(super) struct PiecewiseDoc {
    pub(super) pieces: Vec<PieceDoc>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PieceDoc {
    #[serde(default)]
    pub(super) condition: Option<ConditionDoc>,
    pub(super) result: PieceResultDoc,
}

#[derive(Debug, Deserialize)]
pub(super) struct ConditionDoc {
    pub(super) variable: String,
    pub(super) operator: Operator,
    pub(super) value: f64,
}

/// Comparison used by a piecewise breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Operator {
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterOrEqual,
}

impl Operator {
    pub(super) fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Self::Less => lhs < rhs,
            Self::LessOrEqual => lhs <= rhs,
            Self::Greater => lhs > rhs,
            Self::GreaterOrEqual => lhs >= rhs,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub(super) enum PieceResultDoc {
    Constant {
        value: f64,
    },
    Linear {
        variable: String,
        slope: f64,
        intercept: f64,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
}

#[derive(Debug, Deserialize)]
pub(super) struct LogisticDoc {
    pub(super) normalization: Vec<NormalizationDoc>,
    pub(super) coefficients: BTreeMap<String, f64>,
    pub(super) intercept: f64,
    pub(super) threshold: f64,
}

#[derive(Debug, Deserialize)]
pub(super) struct NormalizationDoc {
    pub(super) variable: String,
    pub(super) symbol: String,
    pub(super) offset: f64,
    pub(super) scale: f64,
}
