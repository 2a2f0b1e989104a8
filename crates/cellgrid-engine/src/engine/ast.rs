//! Formula syntax tree.

use super::cell_ref::CellRef;
use super::functions::Function;

/// Formula expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // === Literals ===
    /// Numeric literal
    Number(f64),
    /// Quoted string literal, quotes removed
    Text(String),
    /// Bare identifier that is neither a reference nor a call
    Word(String),
    /// Call argument that failed to parse, as written
    Malformed(String),

    // === References ===
    /// Single cell reference
    Ref(CellRef),
    /// Rectangular block, corners as written
    Range(CellRef, CellRef),

    // === Operators ===
    Unary {
        op: UnaryOperator,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    // === Function call ===
    Call {
        function: Function,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// The single reference this expression denotes, looking through a unary
    /// plus. Parentheses leave no node behind, so `(A1)` also qualifies.
    pub fn as_ref_target(&self) -> Option<&CellRef> {
        match self {
            Expr::Ref(cell) => Some(cell),
            Expr::Unary {
                op: UnaryOperator::Plus,
                operand,
            } => operand.as_ref_target(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,

    // Comparison
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
}

impl BinaryOperator {
    pub fn is_comparison(&self) -> bool {
        !matches!(
            self,
            BinaryOperator::Add
                | BinaryOperator::Subtract
                | BinaryOperator::Multiply
                | BinaryOperator::Divide
        )
    }

    pub fn apply(&self, left: f64, right: f64) -> f64 {
        let truth = |b: bool| if b { 1.0 } else { 0.0 };
        match self {
            BinaryOperator::Add => left + right,
            BinaryOperator::Subtract => left - right,
            BinaryOperator::Multiply => left * right,
            BinaryOperator::Divide => left / right,
            BinaryOperator::Equal => truth(left == right),
            BinaryOperator::NotEqual => truth(left != right),
            BinaryOperator::LessThan => truth(left < right),
            BinaryOperator::LessEqual => truth(left <= right),
            BinaryOperator::GreaterThan => truth(left > right),
            BinaryOperator::GreaterEqual => truth(left >= right),
        }
    }
}
