//! Built-in spreadsheet functions and their metadata.
//!
//! Conventions:
//! - Spreadsheet-facing names are matched case-insensitively (`sum`, `Sum`, `SUM`).
//! - Aggregates never fail on bad input: text, words, unparsable arguments
//!   and invalid values count as 0. Only a cycle reached through an argument
//!   escapes a call.
//! - If you add a function, add it to [`BUILTINS`] and to [`Function::apply`].

use tracing::trace;

use super::ast::{Expr, UnaryOperator};
use super::cell::CellSource;
use super::cell_ref::CellRef;
use super::eval::Evaluator;
use super::value::{EvalError, EvalResult, Scalar, parse_number};
use super::visiting::VisitingSet;

/// A recognized function name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Sum,
    Avg,
    Min,
    Max,
    Product,
    Count,
    If,
}

pub struct Builtin {
    pub name: &'static str,
    pub function: Function,
    pub description: &'static str,
}

pub const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "SUM",
        function: Function::Sum,
        description: "Sum of the arguments and ranges",
    },
    Builtin {
        name: "AVG",
        function: Function::Avg,
        description: "Average of the arguments and ranges",
    },
    Builtin {
        name: "MIN",
        function: Function::Min,
        description: "Smallest value among the arguments and ranges",
    },
    Builtin {
        name: "MAX",
        function: Function::Max,
        description: "Largest value among the arguments and ranges",
    },
    Builtin {
        name: "PRODUCT",
        function: Function::Product,
        description: "Product of the arguments and ranges",
    },
    Builtin {
        name: "COUNT",
        function: Function::Count,
        description: "Number of finite numeric values among the arguments and ranges",
    },
    Builtin {
        name: "IF",
        function: Function::If,
        description: "IF(condition, then, else): pick a branch by a comparison",
    },
];

impl Function {
    pub fn from_name(name: &str) -> Option<Function> {
        BUILTINS
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name))
            .map(|b| b.function)
    }

    pub fn name(&self) -> &'static str {
        BUILTINS
            .iter()
            .find(|b| b.function == *self)
            .map_or("?", |b| b.name)
    }

    /// Reduce collected values. An empty argument set yields 0 for every
    /// aggregate, and non-finite results are clamped to 0.
    pub fn apply(&self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let sum: f64 = values.iter().sum();
        let result = match self {
            Function::Sum => sum,
            Function::Avg => sum / values.len() as f64,
            Function::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Function::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Function::Product => values.iter().product(),
            Function::Count => values.iter().filter(|v| v.is_finite()).count() as f64,
            Function::If => 0.0,
        };
        if result.is_finite() { result } else { 0.0 }
    }
}

impl<S: CellSource + ?Sized> Evaluator<'_, S> {
    /// Evaluate a call whose arguments are still unevaluated syntax. Nested
    /// calls inside the arguments are evaluated first.
    pub(crate) fn eval_call(
        &self,
        function: Function,
        args: &[Expr],
        visiting: &VisitingSet,
    ) -> EvalResult {
        let result = match function {
            Function::If => self.eval_if(args, visiting),
            _ => {
                let values = self.collect_numbers(args, visiting)?;
                Ok(Scalar::Number(function.apply(&values)))
            }
        };
        trace!(function = function.name(), result = ?result, "function evaluated");
        result
    }

    /// Gather aggregate inputs: ranges expand, references resolve, anything
    /// else is evaluated and coerced to a number (0 on failure).
    fn collect_numbers(&self, args: &[Expr], visiting: &VisitingSet) -> Result<Vec<f64>, EvalError> {
        let mut values = Vec::new();
        for arg in args {
            match arg {
                Expr::Range(start, end) => {
                    values.extend(self.expand_range(start, end, visiting)?);
                }
                Expr::Ref(cell) => values.push(numeric_or_zero(self.reference_value(cell, visiting))?),
                other => values.push(numeric_or_zero(self.eval_expr(other, visiting))?),
            }
        }
        Ok(values)
    }

    /// `IF(condition, then, else)`. Fewer than two arguments yields 0, as does
    /// a missing else branch.
    fn eval_if(&self, args: &[Expr], visiting: &VisitingSet) -> EvalResult {
        if args.len() < 2 {
            return Ok(Scalar::Number(0.0));
        }
        let branch = if self.condition_holds(&args[0], visiting) {
            args.get(1)
        } else {
            args.get(2)
        };
        match branch {
            Some(expr) => self.eval_branch(expr, visiting),
            None => Ok(Scalar::Number(0.0)),
        }
    }

    /// Conditions accept only numbers, references, calls, arithmetic and
    /// comparisons. Anything else makes the condition false.
    fn condition_holds(&self, condition: &Expr, visiting: &VisitingSet) -> bool {
        match self.condition_value(condition, visiting) {
            Some(n) => n != 0.0 && !n.is_nan(),
            None => false,
        }
    }

    fn condition_value(&self, expr: &Expr, visiting: &VisitingSet) -> Option<f64> {
        match expr {
            Expr::Number(n) => Some(*n),
            Expr::Ref(cell) => Some(self.reference_value(cell, visiting).map_or(0.0, |v| v.to_number_or_zero())),
            Expr::Unary { op, operand } => {
                let n = self.condition_value(operand, visiting)?;
                Some(match op {
                    UnaryOperator::Negate => -n,
                    UnaryOperator::Plus => n,
                })
            }
            Expr::Binary { op, left, right } => {
                let l = self.condition_value(left, visiting)?;
                let r = self.condition_value(right, visiting)?;
                Some(op.apply(l, r))
            }
            Expr::Call { function, args } => self
                .eval_call(*function, args, visiting)
                .ok()
                .and_then(|v| v.as_number()),
            Expr::Text(_) | Expr::Word(_) | Expr::Malformed(_) | Expr::Range(..) => None,
        }
    }

    /// Resolve the chosen IF branch: quoted text stays text, a reference
    /// yields its number or its text, a bare word or unparsable argument is
    /// opaque text.
    fn eval_branch(&self, branch: &Expr, visiting: &VisitingSet) -> EvalResult {
        match branch {
            Expr::Text(s) | Expr::Word(s) | Expr::Malformed(s) => Ok(Scalar::Text(s.clone())),
            Expr::Ref(cell) => self.branch_reference(cell, visiting),
            other => self.eval_expr(other, visiting),
        }
    }

    fn branch_reference(&self, cell: &CellRef, visiting: &VisitingSet) -> EvalResult {
        if !self.extent().contains(cell) {
            return Ok(Scalar::Number(0.0));
        }
        match self.resolve(cell, visiting)? {
            Scalar::Text(t) => Ok(match parse_number(&t) {
                Some(n) => Scalar::Number(n),
                None => Scalar::Text(t),
            }),
            number => Ok(number),
        }
    }
}

/// Aggregate view of an argument: a cycle escapes, everything else that is
/// not a number becomes 0.
fn numeric_or_zero(value: EvalResult) -> Result<f64, EvalError> {
    match value {
        Ok(v) => Ok(v.to_number_or_zero()),
        Err(EvalError::Cycle) => Err(EvalError::Cycle),
        Err(EvalError::Invalid) => Ok(0.0),
    }
}
