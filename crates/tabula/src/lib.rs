//! # tabula
//!
//! Spreadsheet-style formulas for plain tables.
//!
//! Tabula evaluates formulas such as `=B2*C2` or `=SUM(D1:D10)` stored in the cells of
//! a simple row/column table, the way a document editor's table feature would.
//!
//! ## Features
//!
//! - A1 references, ranges and reference shifting for row/column insert and delete
//! - Arithmetic with `+ - * /`, parentheses and `%` literals
//! - `SUM`, `AVG`, `COUNT`, `MIN` and `MAX` over ranges
//! - Memoized evaluation with circular reference detection
//! - Total rows that aggregate data rows without feeding back into them
//! - Formatted results with thousands separators and currency prefixes
//! - CSV input and output (`csv` feature, on by default)
//!
//! ## Example
//!
//! ```rust
//! use tabula::prelude::*;
//!
//! let mut table = Table::from_rows(&[
//!     &["Rent", "1200"],
//!     &["Food", "=B1/4"],
//! ]);
//! table.push_row(TableRow::total(vec![
//!     TableCell::text("Total"),
//!     TableCell::formula("=SUM(B1:B2)"),
//! ]));
//!
//! let stats = table.calculate_with_options(&CalculationOptions {
//!     currency: Some("USD".into()),
//!     ..Default::default()
//! });
//! assert_eq!(stats.errors, 0);
//! assert_eq!(table.cell(1, 2).unwrap().display_text(), "$1,500.00");
//! ```

pub mod calculation;
pub mod prelude;

// Re-export calculation types
pub use calculation::{
    recalculate, CalculationOptions, CalculationReport, CalculationStats, CellCalculation,
    TableCalculationExt,
};

// Re-export core types
pub use tabula_core::{
    reference, CellAddress, CellRange, CellRangeIterator, ContentNode, Error, Result, Table,
    TableCell, TableRow, TableSource,
};

// Re-export formula types
pub use tabula_formula::{
    currency_symbol, evaluate, extract, format_result, parse_formula, AggregateFunction,
    EvaluationContext, EvaluationResult, FormatOptions, FormulaError, FormulaKind,
    FormulaResult, ParsedFormula, TableData, Token,
};

// Re-export I/O types
#[cfg(feature = "csv")]
pub use tabula_csv::{CsvError, CsvReadOptions, CsvReader, CsvTable, CsvWriteOptions, CsvWriter};

#[cfg(feature = "csv")]
mod file;
#[cfg(feature = "csv")]
pub use file::{FileError, TableFileExt};
