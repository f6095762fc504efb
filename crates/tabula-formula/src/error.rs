//! Formula error types

use crate::token::AggregateFunction;
use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during formula parsing or evaluation
///
/// The `Display` text of each variant is the detail a host shows next to the
/// `"Error"` placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// Syntax error found while tokenizing
    #[error("Parse error: {0}")]
    Parse(String),

    /// The formula references the cell it lives in
    #[error("Circular reference")]
    SelfReference,

    /// A cell was reached again while it was still being resolved
    #[error("Circular reference: {0}")]
    CircularReference(String),

    /// Division by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// The result overflowed or is not a number
    #[error("Result is infinite")]
    NonFinite,

    /// AVG, MIN or MAX over a range with no values
    #[error("No values for {0}")]
    NoValues(AggregateFunction),

    /// Tokens that do not form a valid expression
    #[error("Invalid expression")]
    InvalidExpression,
}

impl FormulaError {
    /// Whether this error is a reference cycle
    pub fn is_circular(&self) -> bool {
        matches!(
            self,
            FormulaError::SelfReference | FormulaError::CircularReference(_)
        )
    }
}
