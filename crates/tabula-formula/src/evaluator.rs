//! Formula evaluator
//!
//! Evaluates a formula against a [`TableData`] snapshot. Cell references are resolved
//! recursively: a referenced cell that itself holds a formula is evaluated in place,
//! its result memoized in the [`EvaluationContext`] so the rest of the pass reuses it.
//!
//! Grammar (after tokenizing):
//!
//! ```text
//! expr    := muldiv (("+" | "-") muldiv)*
//! muldiv  := primary (("*" | "/") primary)*
//! primary := NUMBER | CELL | "-" primary | "(" expr ")" | FUNC "(" (RANGE | CELL)* ")"
//! ```

use crate::aggregate;
use crate::error::{FormulaError, FormulaResult};
use crate::parser::parse_formula;
use crate::snapshot::TableData;
use crate::token::{AggregateFunction, Operator, Token};
use ahash::{AHashMap, AHashSet};
use tabula_core::{CellAddress, CellRange};

/// Outcome of evaluating one formula
///
/// `Ok(Some(v))` is a finite number, `Ok(None)` means there is no data to show (a
/// formula that is just a reference to an empty cell), `Err` carries the failure.
pub type EvaluationResult = FormulaResult<Option<f64>>;

/// State shared by all evaluations of one recalculation pass
///
/// Create one per pass (or per formula, for full isolation) and drop it afterwards;
/// a context must not outlive the snapshot it was used with.
#[derive(Debug, Clone, Default)]
pub struct EvaluationContext {
    /// Resolved values of formula cells, keyed by A1 reference
    evaluated_cache: AHashMap<String, Option<f64>>,
    /// Bottom of the cycle-detection stack, always empty
    ///
    /// Each recursive step resolves against its own extended copy, so nothing is ever
    /// inserted here and nothing needs unmarking after a formula returns.
    visited_refs: AHashSet<String>,
}

impl EvaluationContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Memoized value of a formula cell, if it has been resolved in this pass
    pub fn cached_value(&self, reference: &str) -> Option<Option<f64>> {
        self.evaluated_cache.get(reference).copied()
    }

    /// Number of memoized formula cells
    pub fn cached_count(&self) -> usize {
        self.evaluated_cache.len()
    }

    /// Forget all memoized values
    pub fn clear(&mut self) {
        self.evaluated_cache.clear();
    }
}

/// Evaluate a formula located at `at` against a table snapshot
///
/// Pass a context to share memoized results across the formulas of one pass; with
/// `None` a throwaway context is used.
///
/// # Example
/// ```rust
/// use tabula_core::{CellAddress, Table};
/// use tabula_formula::{evaluate, extract};
///
/// let table = Table::from_rows(&[&["10"], &["20"], &["30"]]);
/// let data = extract(&table);
///
/// let result = evaluate("=SUM(A1:A3)", &data, CellAddress::new(3, 0), None);
/// assert_eq!(result, Ok(Some(60.0)));
/// ```
pub fn evaluate(
    formula: &str,
    table: &TableData,
    at: CellAddress,
    context: Option<&mut EvaluationContext>,
) -> EvaluationResult {
    let mut scratch = EvaluationContext::default();
    let context = context.unwrap_or(&mut scratch);

    let visited = context.visited_refs.clone();
    let mut evaluator = Evaluator {
        table,
        cache: &mut context.evaluated_cache,
    };

    let result = evaluator.evaluate_formula(formula, at, &visited);
    if let Err(e) = &result {
        log::debug!("formula {:?} at {} failed: {}", formula, at, e);
    }
    result
}

/// Recursive resolver over one snapshot
struct Evaluator<'a> {
    table: &'a TableData,
    cache: &'a mut AHashMap<String, Option<f64>>,
}

/// Read position in a token stream
struct Cursor<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Cursor<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}

impl<'a> Evaluator<'a> {
    fn evaluate_formula(
        &mut self,
        formula: &str,
        at: CellAddress,
        visited: &AHashSet<String>,
    ) -> EvaluationResult {
        let parsed = parse_formula(formula)?;

        if parsed.references_cell(&at) {
            return Err(FormulaError::SelfReference);
        }

        let mut cursor = Cursor {
            tokens: &parsed.tokens,
            pos: 0,
        };
        let value = self.parse_additive(&mut cursor, visited)?;

        // Make sure we consumed all tokens
        if !cursor.is_at_end() {
            return Err(FormulaError::InvalidExpression);
        }

        match value {
            Some(v) if !v.is_finite() => Err(FormulaError::NonFinite),
            other => Ok(other),
        }
    }

    // === Expression grammar ===

    fn parse_additive(
        &mut self,
        cursor: &mut Cursor<'_>,
        visited: &AHashSet<String>,
    ) -> EvaluationResult {
        let mut left = self.parse_multiplicative(cursor, visited)?;

        while let Some(Token::Operator(op @ (Operator::Add | Operator::Subtract))) = cursor.peek() {
            cursor.next();
            let right = self.parse_multiplicative(cursor, visited)?;
            left = Some(apply_operator(*op, left, right)?);
        }

        Ok(left)
    }

    fn parse_multiplicative(
        &mut self,
        cursor: &mut Cursor<'_>,
        visited: &AHashSet<String>,
    ) -> EvaluationResult {
        let mut left = self.parse_primary(cursor, visited)?;

        while let Some(Token::Operator(op @ (Operator::Multiply | Operator::Divide))) =
            cursor.peek()
        {
            cursor.next();
            let right = self.parse_primary(cursor, visited)?;
            left = Some(apply_operator(*op, left, right)?);
        }

        Ok(left)
    }

    fn parse_primary(
        &mut self,
        cursor: &mut Cursor<'_>,
        visited: &AHashSet<String>,
    ) -> EvaluationResult {
        match cursor.next() {
            Some(Token::Number(n)) => Ok(Some(*n)),

            Some(Token::CellRef(addr)) => self.resolve_cell(*addr, visited),

            Some(Token::Operator(Operator::Subtract)) => {
                let operand = self.parse_primary(cursor, visited)?;
                Ok(Some(0.0 - operand.unwrap_or(0.0)))
            }

            Some(Token::LParen) => {
                let value = self.parse_additive(cursor, visited)?;
                match cursor.next() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err(FormulaError::InvalidExpression),
                }
            }

            Some(Token::Function(func)) => self.evaluate_aggregate(*func, cursor, visited),

            _ => Err(FormulaError::InvalidExpression),
        }
    }

    /// `FUNC ( args )` where each argument is a range or a single cell
    fn evaluate_aggregate(
        &mut self,
        func: AggregateFunction,
        cursor: &mut Cursor<'_>,
        visited: &AHashSet<String>,
    ) -> EvaluationResult {
        if !matches!(cursor.next(), Some(Token::LParen)) {
            return Err(FormulaError::InvalidExpression);
        }

        let mut values = Vec::new();
        loop {
            match cursor.next() {
                Some(Token::RangeRef(range)) => {
                    self.collect_range(range, visited, &mut values)?;
                }
                Some(Token::CellRef(addr)) => {
                    values.extend(self.resolve_cell(*addr, visited)?);
                }
                Some(Token::RParen) => break,
                _ => return Err(FormulaError::InvalidExpression),
            }
        }

        aggregate::apply(func, &values).map(Some)
    }

    /// Resolve every in-bounds cell of a range, row-major, keeping non-empty values
    fn collect_range(
        &mut self,
        range: &CellRange,
        visited: &AHashSet<String>,
        values: &mut Vec<f64>,
    ) -> FormulaResult<()> {
        if self.table.row_count() == 0 || self.table.col_count() == 0 {
            return Ok(());
        }

        // Cells outside the snapshot are empty, so the walk stops at its edges
        let last_row = range.end.row.min(self.table.row_count() as u32 - 1);
        let last_col = range.end.col.min(self.table.col_count() as u32 - 1);

        for row in range.start.row..=last_row {
            for col in range.start.col..=last_col {
                values.extend(self.resolve_cell(CellAddress::new(col, row), visited)?);
            }
        }

        Ok(())
    }

    // === Cell resolution ===

    fn resolve_cell(&mut self, addr: CellAddress, visited: &AHashSet<String>) -> EvaluationResult {
        let reference = addr.to_a1_string();

        if let Some(value) = self.cache.get(&reference) {
            return Ok(*value);
        }

        if visited.contains(&reference) {
            return Err(FormulaError::CircularReference(reference));
        }

        if !self.table.contains(&addr) {
            return Ok(None);
        }

        if let Some(value) = self.table.value(&addr) {
            return Ok(Some(value));
        }

        let table = self.table;
        if let Some(formula) = table.formula_by_ref(&reference) {
            // Each branch of the recursion extends its own copy of the stack
            let mut extended = visited.clone();
            extended.insert(reference.clone());

            log::trace!("resolving {} = {}", reference, formula);
            let value = self.evaluate_formula(formula, addr, &extended)?;
            self.cache.insert(reference, value);
            return Ok(value);
        }

        Ok(None)
    }
}

/// Apply a binary operator; empty operands count as 0
fn apply_operator(op: Operator, left: Option<f64>, right: Option<f64>) -> FormulaResult<f64> {
    let left = left.unwrap_or(0.0);
    let right = right.unwrap_or(0.0);

    match op {
        Operator::Add => Ok(left + right),
        Operator::Subtract => Ok(left - right),
        Operator::Multiply => Ok(left * right),
        Operator::Divide => {
            if right == 0.0 {
                Err(FormulaError::DivisionByZero)
            } else {
                Ok(left / right)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::extract;
    use tabula_core::Table;

    fn addr(reference: &str) -> CellAddress {
        CellAddress::parse(reference).unwrap()
    }

    fn eval_at(rows: &[&[&str]], formula: &str, at: &str) -> EvaluationResult {
        let data = extract(&Table::from_rows(rows));
        evaluate(formula, &data, addr(at), None)
    }

    fn eval(formula: &str) -> EvaluationResult {
        eval_at(&[], formula, "Z99")
    }

    #[test]
    fn test_operator_precedence() {
        assert_eq!(eval("=2+3*4"), Ok(Some(14.0)));
        assert_eq!(eval("=(2+3)*4"), Ok(Some(20.0)));
        assert_eq!(eval("=10-4-3"), Ok(Some(3.0)));
        assert_eq!(eval("=12/4/3"), Ok(Some(1.0)));
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(eval("=-5+2"), Ok(Some(-3.0)));
        assert_eq!(eval("=-(2+3)*2"), Ok(Some(-10.0)));
        assert_eq!(eval("=4--2"), Ok(Some(6.0)));
    }

    #[test]
    fn test_percentages() {
        assert_eq!(eval("=100*15%"), Ok(Some(15.0)));
        assert_eq!(
            eval_at(&[&["100"]], "=A1+A1*15%", "B1"),
            Ok(Some(115.0))
        );
    }

    #[test]
    fn test_division_by_zero() {
        let result = eval_at(&[&["10", "0"]], "=A1/B1", "C1");
        assert_eq!(result, Err(FormulaError::DivisionByZero));
        assert!(result.unwrap_err().to_string().contains("zero"));

        // An empty divisor counts as 0 as well
        assert_eq!(
            eval_at(&[&["10"]], "=A1/B1", "C1"),
            Err(FormulaError::DivisionByZero)
        );
    }

    #[test]
    fn test_non_finite_result() {
        let huge = format!("=1{}*1000", "0".repeat(308));
        assert_eq!(eval(&huge), Err(FormulaError::NonFinite));
    }

    #[test]
    fn test_empty_cells_in_arithmetic() {
        assert_eq!(eval_at(&[&["", "5"]], "=A1+B1", "C1"), Ok(Some(5.0)));
        assert_eq!(eval_at(&[&["5"]], "=A1*Q40", "C1"), Ok(Some(0.0)));
        // A bare reference to an empty cell has no value
        assert_eq!(eval_at(&[&["", "5"]], "=A1", "C1"), Ok(None));
        assert_eq!(eval_at(&[&["", "5"]], "=(A1)", "C1"), Ok(None));
    }

    #[test]
    fn test_invalid_expressions() {
        assert_eq!(eval("=1 2"), Err(FormulaError::InvalidExpression));
        assert_eq!(eval("=1+"), Err(FormulaError::InvalidExpression));
        assert_eq!(eval("=*2"), Err(FormulaError::InvalidExpression));
        assert_eq!(eval("=()"), Err(FormulaError::InvalidExpression));
        assert_eq!(eval("=A1:A3"), Err(FormulaError::InvalidExpression));
        assert_eq!(eval("=SUM(1)"), Err(FormulaError::InvalidExpression));
        assert_eq!(eval("="), Err(FormulaError::InvalidExpression));
    }

    #[test]
    fn test_parse_errors_pass_through() {
        assert!(matches!(eval("1+1"), Err(FormulaError::Parse(_))));
        assert!(matches!(eval("=(1"), Err(FormulaError::Parse(_))));
    }

    #[test]
    fn test_aggregates_over_ranges() {
        let rows: &[&[&str]] = &[&["10"], &["20"], &["30"]];
        assert_eq!(eval_at(rows, "=SUM(A1:A3)", "D1"), Ok(Some(60.0)));
        assert_eq!(eval_at(rows, "=AVG(A1:A3)", "D1"), Ok(Some(20.0)));
        assert_eq!(eval_at(rows, "=MIN(A3:A1)", "D1"), Ok(Some(10.0)));
        assert_eq!(eval_at(rows, "=MAX(A1:A3)", "D1"), Ok(Some(30.0)));
        assert_eq!(eval_at(rows, "=COUNT(A1:A100)", "D1"), Ok(Some(3.0)));
    }

    #[test]
    fn test_aggregates_over_cell_lists() {
        let rows: &[&[&str]] = &[&["1", "2", "", "4"]];
        assert_eq!(eval_at(rows, "=SUM(A1, B1, D1)", "E1"), Ok(Some(7.0)));
        assert_eq!(eval_at(rows, "=COUNT(A1,C1)", "E1"), Ok(Some(1.0)));
    }

    #[test]
    fn test_aggregate_empty_ranges() {
        let rows: &[&[&str]] = &[&["", ""], &["", ""]];
        assert_eq!(eval_at(rows, "=SUM(A1:B2)", "C1"), Ok(Some(0.0)));
        assert_eq!(eval_at(rows, "=COUNT(A1:B2)", "C1"), Ok(Some(0.0)));
        for func in ["AVG", "MIN", "MAX"] {
            let result = eval_at(rows, &format!("={}(A1:B2)", func), "C1");
            assert!(matches!(result, Err(FormulaError::NoValues(_))), "{}", func);
        }
    }

    #[test]
    fn test_count_skips_empty_cells() {
        let rows: &[&[&str]] = &[&["5"], &[""], &["7"], &["n/a"]];
        assert_eq!(eval_at(rows, "=COUNT(A1:A4)", "B1"), Ok(Some(2.0)));
        assert_eq!(eval_at(rows, "=AVG(A1:A4)", "B1"), Ok(Some(6.0)));
    }

    #[test]
    fn test_aggregates_in_expressions() {
        let rows: &[&[&str]] = &[&["1", "10"], &["2", "20"]];
        assert_eq!(
            eval_at(rows, "=SUM(A1:A2)+SUM(B1:B2)", "C1"),
            Ok(Some(33.0))
        );
        assert_eq!(eval_at(rows, "=MAX(B1:B2)*10%", "C1"), Ok(Some(2.0)));
    }

    #[test]
    fn test_self_reference() {
        let result = eval_at(&[&["1", "2"]], "=A1+B1", "A1");
        assert_eq!(result, Err(FormulaError::SelfReference));
        assert!(result.unwrap_err().to_string().contains("Circular"));
    }

    #[test]
    fn test_indirect_cycle() {
        let rows: &[&[&str]] = &[&["=B1+1", "=A1+1"]];
        for formula in ["=A1", "=B1*2", "=SUM(A1:B1)"] {
            let result = eval_at(rows, formula, "C1");
            let err = result.unwrap_err();
            assert!(err.is_circular(), "{}: {}", formula, err);
            assert!(err.to_string().contains("Circular"));
        }
    }

    #[test]
    fn test_range_covering_own_cell_is_circular() {
        let rows: &[&[&str]] = &[&["1"], &["2"], &["=SUM(A1:A3)"]];
        let result = eval_at(rows, "=A3", "B1");
        assert_eq!(
            result,
            Err(FormulaError::CircularReference("A3".to_string()))
        );
    }

    #[test]
    fn test_siblings_are_not_cycles() {
        // B1 is reached through two branches; neither blocks the other
        let rows: &[&[&str]] = &[&["2", "=A1*3", "=B1+B1", "=B1*C1"]];
        assert_eq!(eval_at(rows, "=D1", "E1"), Ok(Some(72.0)));
    }

    #[test]
    fn test_memoized_chain() {
        let rows: &[&[&str]] = &[&["10", "=A1*2", "=B1+5", "=C1*2"]];
        let data = extract(&Table::from_rows(rows));
        let mut ctx = EvaluationContext::new();

        assert_eq!(
            evaluate("=C1*2", &data, addr("D1"), Some(&mut ctx)),
            Ok(Some(50.0))
        );
        assert_eq!(ctx.cached_value("C1"), Some(Some(25.0)));
        assert_eq!(ctx.cached_value("B1"), Some(Some(20.0)));
        assert_eq!(ctx.cached_value("A1"), None);

        assert_eq!(
            evaluate("=C1+C1", &data, addr("E1"), Some(&mut ctx)),
            Ok(Some(50.0))
        );
        assert_eq!(
            evaluate("=D1", &data, addr("F1"), Some(&mut ctx)),
            Ok(Some(50.0))
        );
        assert_eq!(ctx.cached_count(), 3);
    }

    #[test]
    fn test_nested_errors_propagate() {
        let rows: &[&[&str]] = &[&["0", "=1/A1", "=AVG(Z1:Z2)"]];
        assert_eq!(
            eval_at(rows, "=B1+1", "D1"),
            Err(FormulaError::DivisionByZero)
        );
        assert_eq!(
            eval_at(rows, "=C1", "D1"),
            Err(FormulaError::NoValues(AggregateFunction::Avg))
        );
    }

    #[test]
    fn test_context_clear() {
        let data = extract(&Table::from_rows(&[&["1", "=A1+1"]]));
        let mut ctx = EvaluationContext::new();
        evaluate("=B1", &data, addr("C1"), Some(&mut ctx)).unwrap();
        assert_eq!(ctx.cached_count(), 1);
        assert!(ctx.visited_refs.is_empty());
        ctx.clear();
        assert_eq!(ctx.cached_count(), 0);
    }
}
