//! Evaluated values and evaluation errors.

use std::fmt;

use thiserror::Error;

/// Display token for [`EvalError::Invalid`].
pub const INVALID_TOKEN: &str = "#ERR";
/// Display token for [`EvalError::Cycle`].
pub const CYCLE_TOKEN: &str = "#CYCLE";

/// A successfully evaluated cell or formula value.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Text(_) => None,
        }
    }

    /// Numeric view used by arithmetic and aggregates: text counts as 0.
    pub fn to_number_or_zero(&self) -> f64 {
        match self {
            Scalar::Number(n) => *n,
            Scalar::Text(s) => parse_number(s).unwrap_or(0.0),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => f.write_str(&super::format::format_number(*n)),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

/// Failure states of an evaluation. Both are ordinary values from the
/// caller's point of view and render as sentinel tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum EvalError {
    /// The formula reached a cell already being evaluated on the same path.
    #[error("#CYCLE")]
    Cycle,
    /// Malformed formula, non-arithmetic result or non-finite number.
    #[error("#ERR")]
    Invalid,
}

impl EvalError {
    pub fn token(&self) -> &'static str {
        match self {
            EvalError::Cycle => CYCLE_TOKEN,
            EvalError::Invalid => INVALID_TOKEN,
        }
    }
}

/// Result of evaluating a formula or resolving a cell.
pub type EvalResult = Result<Scalar, EvalError>;

/// Parse numeric-looking text. Surrounding whitespace is ignored and only
/// finite values are accepted, so "inf" and "NaN" stay text.
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}
