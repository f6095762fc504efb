//! Table recalculation
//!
//! Runs one recalculation pass over a table: take a snapshot, evaluate every formula
//! cell (total rows included) and format each result for display.
//!
//! # Example
//!
//! ```rust
//! use tabula::prelude::*;
//!
//! let mut table = Table::from_rows(&[&["10", "=A1*2"], &["20", "=A2*2"]]);
//! table.push_row(TableRow::total(vec![
//!     TableCell::text("Total"),
//!     TableCell::formula("=SUM(B1:B2)"),
//! ]));
//!
//! let stats = table.calculate();
//! assert_eq!(stats.cells_calculated, 3);
//! assert_eq!(table.cell(1, 2).unwrap().display_text(), "60.00");
//! ```

use crate::{
    evaluate, extract, format_result, CellAddress, EvaluationContext, EvaluationResult, Table,
    TableSource,
};

/// Options for a recalculation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculationOptions {
    /// Currency code or symbol prefixed to every displayed result
    pub currency: Option<String>,
    /// Decimal places of displayed results (default: 2)
    pub decimals: u32,
    /// Share one memo cache across all formulas of the pass (default: true)
    ///
    /// Results are the same either way; sharing only avoids recomputation.
    pub share_context: bool,
}

impl Default for CalculationOptions {
    fn default() -> Self {
        Self {
            currency: None,
            decimals: 2,
            share_context: true,
        }
    }
}

/// Statistics from a calculation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculationStats {
    /// Total number of formula cells
    pub formula_count: usize,
    /// Number of formulas that produced a value (or no data)
    pub cells_calculated: usize,
    /// Number of formulas that failed
    pub errors: usize,
    /// Number of failures caused by circular references
    pub circular_references: usize,
}

/// Outcome for one formula cell
#[derive(Debug, Clone, PartialEq)]
pub struct CellCalculation {
    /// Position of the cell in the host table (document coordinates)
    pub address: CellAddress,
    /// Whether the cell sits in a total row
    pub is_total: bool,
    /// Formula source
    pub formula: String,
    /// Evaluation result
    pub result: EvaluationResult,
    /// Formatted display text, never empty
    pub display: String,
}

/// Results of a recalculation pass, in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculationReport {
    pub cells: Vec<CellCalculation>,
    pub stats: CalculationStats,
}

impl CalculationReport {
    /// Result for the formula cell at document coordinates `(col, row)`
    pub fn cell(&self, col: u32, row: u32) -> Option<&CellCalculation> {
        let address = CellAddress::new(col, row);
        self.cells.iter().find(|c| c.address == address)
    }

    /// Formula cells that failed
    pub fn errors(&self) -> impl Iterator<Item = &CellCalculation> + '_ {
        self.cells.iter().filter(|c| c.result.is_err())
    }

    /// Write every display text into the table
    ///
    /// The formula source of each cell is kept, so a later pass recomputes from it.
    pub fn apply(&self, table: &mut Table) {
        for cell in &self.cells {
            let (col, row) = (cell.address.col as usize, cell.address.row as usize);
            if let Some(target) = table.cell_mut(col, row) {
                target.set_display_text(cell.display.as_str());
            }
        }
    }
}

/// Evaluate every formula cell of a table
///
/// Data rows are addressed by their position among data rows, which is what formula
/// references point at. Total rows are numbered after the last data row, so a total
/// formula never shares a coordinate with a snapshot cell and never sees itself inside
/// the ranges it aggregates. Reported addresses are always document coordinates.
pub fn recalculate<T: TableSource + ?Sized>(
    source: &T,
    options: &CalculationOptions,
) -> CalculationReport {
    let data = extract(source);
    let mut report = CalculationReport::default();
    let mut shared = EvaluationContext::new();
    let mut data_row = 0usize;
    let mut total_row = data.row_count();

    for doc_row in 0..source.row_count() {
        let is_total = source.is_total_row(doc_row);
        let eval_row = if is_total { total_row } else { data_row };

        for col in 0..source.cell_count(doc_row) {
            let formula = match source.cell_formula(col, doc_row) {
                Some(f) if f.starts_with('=') => f,
                _ => continue,
            };
            report.stats.formula_count += 1;

            let at = CellAddress::new(col as u32, eval_row as u32);
            let mut isolated = EvaluationContext::new();
            let context = if options.share_context {
                &mut shared
            } else {
                &mut isolated
            };
            let result = evaluate(formula, &data, at, Some(context));

            match &result {
                Ok(_) => report.stats.cells_calculated += 1,
                Err(e) => {
                    log::warn!(
                        "formula {:?} in row {}, column {} failed: {}",
                        formula,
                        doc_row + 1,
                        col + 1,
                        e
                    );
                    report.stats.errors += 1;
                    if e.is_circular() {
                        report.stats.circular_references += 1;
                    }
                }
            }

            let display =
                format_result(&result, options.currency.as_deref(), Some(options.decimals));
            report.cells.push(CellCalculation {
                address: CellAddress::new(col as u32, doc_row as u32),
                is_total,
                formula: formula.to_string(),
                result,
                display,
            });
        }

        if is_total {
            total_row += 1;
        } else {
            data_row += 1;
        }
    }

    log::debug!(
        "recalculated {} formulas: {} ok, {} errors",
        report.stats.formula_count,
        report.stats.cells_calculated,
        report.stats.errors
    );
    report
}

/// Extension trait for Table to add calculation methods
pub trait TableCalculationExt {
    /// Recalculate all formulas with default options, writing results back
    fn calculate(&mut self) -> CalculationStats;

    /// Recalculate all formulas with custom options, writing results back
    fn calculate_with_options(&mut self, options: &CalculationOptions) -> CalculationStats;
}

impl TableCalculationExt for Table {
    fn calculate(&mut self) -> CalculationStats {
        self.calculate_with_options(&CalculationOptions::default())
    }

    fn calculate_with_options(&mut self, options: &CalculationOptions) -> CalculationStats {
        let report = recalculate(&*self, options);
        report.apply(self);
        report.stats
    }
}
