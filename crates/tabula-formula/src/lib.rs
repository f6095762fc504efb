//! # tabula-formula
//!
//! Formula engine for tabula tables.
//!
//! This crate provides:
//! - Formula tokenizing (text → tokens plus the references they mention)
//! - Table snapshots (host grid → immutable numeric [`TableData`])
//! - Memoized, cycle-safe evaluation of arithmetic and `SUM`/`AVG`/`COUNT`/`MIN`/`MAX`
//! - Result formatting (thousands separators, fixed decimals, currency prefixes)
//!
//! ## Example
//!
//! ```rust
//! use tabula_core::{CellAddress, Table};
//! use tabula_formula::{evaluate, extract, format_result, EvaluationContext};
//!
//! let table = Table::from_rows(&[
//!     &["Apples", "3", "1.5", "=B1*C1"],
//!     &["Pears", "2", "2.25", "=B2*C2"],
//! ]);
//! let data = extract(&table);
//! let mut ctx = EvaluationContext::new();
//!
//! let result = evaluate("=SUM(D1:D2)", &data, CellAddress::new(3, 2), Some(&mut ctx));
//! assert_eq!(format_result(&result, Some("USD"), None), "$9.00");
//! ```

pub mod aggregate;
pub mod error;
pub mod evaluator;
pub mod format;
pub mod parser;
pub mod snapshot;
pub mod token;

pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, EvaluationContext, EvaluationResult};
pub use format::{currency_symbol, format_result, FormatOptions};
pub use parser::parse_formula;
pub use snapshot::{extract, parse_cell_number, TableData};
pub use token::{AggregateFunction, FormulaKind, Operator, ParsedFormula, Token};
