//! Formula token types

use std::fmt;
use std::str::FromStr;
use tabula_core::{CellAddress, CellRange};

/// Aggregate functions callable as `NAME(range)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AggregateFunction {
    Sum,
    Avg,
    Count,
    Min,
    Max,
}

impl AggregateFunction {
    /// All functions, longest name first so scanning can take the longest match
    pub const ALL: [AggregateFunction; 5] = [
        AggregateFunction::Count,
        AggregateFunction::Sum,
        AggregateFunction::Avg,
        AggregateFunction::Min,
        AggregateFunction::Max,
    ];

    /// Uppercase function name
    pub fn name(self) -> &'static str {
        match self {
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AggregateFunction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|func| func.name().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

/// Arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    /// Map an operator character
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Subtract),
            '*' => Some(Operator::Multiply),
            '/' => Some(Operator::Divide),
            _ => None,
        }
    }
}

/// A formula token
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Single cell reference like B3
    CellRef(CellAddress),
    /// Normalized range reference like A1:C4
    RangeRef(CellRange),
    /// Aggregate function name (the `(` that follows is its own token)
    Function(AggregateFunction),
    /// Arithmetic operator
    Operator(Operator),
    /// Numeric literal, already divided by 100 if written with `%`
    Number(f64),
    LParen,
    RParen,
}

/// Coarse classification of a formula
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FormulaKind {
    /// No references and no functions, e.g. `=100*15%`
    Constant,
    /// Arithmetic over cell references
    Expression,
    /// Contains an aggregate function call
    Function,
}

/// A tokenized formula with the references it mentions
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFormula {
    /// Tokens in source order
    pub tokens: Vec<Token>,
    /// Distinct cell references, first-seen order
    pub cell_refs: Vec<CellAddress>,
    /// Distinct range references, first-seen order
    pub range_refs: Vec<CellRange>,
    /// Classification
    pub kind: FormulaKind,
}

impl ParsedFormula {
    /// Whether the formula mentions the given cell as a standalone reference
    pub fn references_cell(&self, addr: &CellAddress) -> bool {
        self.cell_refs.contains(addr)
    }
}
