//! Prelude module - common imports for tabula users
//!
//! ```rust
//! use tabula::prelude::*;
//! ```

pub use crate::{
    // Calculation types
    CalculationOptions,
    CalculationReport,
    CalculationStats,
    // Cell addressing
    CellAddress,
    CellRange,
    // Formula types
    EvaluationContext,
    EvaluationResult,
    FormulaError,
    // Table model
    Table,
    // Extension traits
    TableCalculationExt,
    TableCell,
    TableData,
    TableRow,
    TableSource,
};

#[cfg(feature = "csv")]
pub use crate::{CsvReader, CsvTable, CsvWriter, TableFileExt};
