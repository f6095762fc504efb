//! End-to-end tests for formula evaluation over tables

use pretty_assertions::assert_eq;
use tabula::prelude::*;
use tabula::reference::{extract_cell_refs, shift_references};
use tabula::{evaluate, extract, format_result, parse_formula, FormulaKind};

fn at(reference: &str) -> CellAddress {
    CellAddress::parse(reference).unwrap()
}

/// Evaluate with a fresh snapshot and a throwaway context
fn eval(table: &Table, formula: &str, cell: &str) -> EvaluationResult {
    evaluate(formula, &extract(table), at(cell), None)
}

#[test]
fn test_sum_and_avg_over_column() {
    let table = Table::from_rows(&[&["10"], &["20"], &["30"]]);
    assert_eq!(eval(&table, "=SUM(A1:A3)", "A4"), Ok(Some(60.0)));
    assert_eq!(eval(&table, "=AVG(A1:A3)", "A4"), Ok(Some(20.0)));
}

#[test]
fn test_cross_row_reference() {
    let table = Table::from_rows(&[&["10", "20", "=A1+B1"], &["", "", "=C1*2"]]);
    assert_eq!(eval(&table, "=C1*2", "C2"), Ok(Some(60.0)));
}

#[test]
fn test_chain_with_shared_context() {
    let table = Table::from_rows(&[&["10", "=A1*2", "=B1+5", "=C1*2"]]);
    let data = extract(&table);
    let mut ctx = EvaluationContext::new();

    assert_eq!(
        evaluate("=C1*2", &data, at("D1"), Some(&mut ctx)),
        Ok(Some(50.0))
    );
    assert_eq!(
        evaluate("=C1+C1", &data, at("E1"), Some(&mut ctx)),
        Ok(Some(50.0))
    );
}

#[test]
fn test_precedence_and_percentages() {
    let table = Table::from_rows(&[&["100"]]);
    assert_eq!(eval(&table, "=2+3*4", "B1"), Ok(Some(14.0)));
    assert_eq!(eval(&table, "=(2+3)*4", "B1"), Ok(Some(20.0)));
    assert_eq!(eval(&table, "=100*15%", "B1"), Ok(Some(15.0)));
    assert_eq!(eval(&table, "=A1+A1*15%", "B1"), Ok(Some(115.0)));
}

#[test]
fn test_error_cases_format_as_error() {
    let table = Table::from_rows(&[&["10", "0", "=D1", "=C1"]]);

    let results = [
        eval(&table, "=A1/B1", "E1"),
        eval(&table, "=A1+E1", "E1"),
        eval(&table, "=C1", "E1"),
        eval(&table, "=AVG(F1:F9)", "E1"),
        eval(&table, "A1+1", "E1"),
    ];

    assert_eq!(results[0], Err(FormulaError::DivisionByZero));
    assert_eq!(results[1], Err(FormulaError::SelfReference));
    assert!(results[2].as_ref().unwrap_err().is_circular());
    assert_eq!(
        results[3].as_ref().unwrap_err().to_string(),
        "No values for AVG"
    );
    for result in &results {
        assert_eq!(format_result(result, None, None), "Error");
    }
}

#[test]
fn test_aggregate_edge_cases() {
    let table = Table::from_rows(&[&["", "4"], &["x", "6"]]);
    assert_eq!(eval(&table, "=SUM(A1:A2)", "C1"), Ok(Some(0.0)));
    assert!(eval(&table, "=AVG(A1:A2)", "C1").is_err());
    assert_eq!(eval(&table, "=COUNT(A1:B2)", "C1"), Ok(Some(2.0)));
}

#[test]
fn test_parse_then_shift_references() {
    let parsed = parse_formula("=a1+B2").unwrap();
    assert_eq!(parsed.kind, FormulaKind::Expression);
    assert_eq!(extract_cell_refs("=a1+B2"), vec!["A1", "B2"]);

    // Row inserted above row 2
    assert_eq!(shift_references("=A1+A2", 0, 1, -1, 0), "=A1+A3");
    // Row 1 deleted
    assert_eq!(shift_references("=A1", 0, -1, -1, -1), "=#REF!");
}

#[test]
fn test_recalculate_table_with_totals() {
    let mut table = Table::from_rows(&[
        &["Widget", "2", "1,500.00", "=B1*C1"],
        &["Gadget", "3", "$20", "=B2*C2"],
    ]);
    table.push_row(TableRow::total(vec![
        TableCell::text("Total"),
        TableCell::formula("=SUM(B1:B2)"),
        TableCell::formula("=MAX(C1:C2)"),
        TableCell::formula("=SUM(D1:D2)"),
    ]));

    let stats = table.calculate_with_options(&CalculationOptions {
        currency: Some("USD".into()),
        ..Default::default()
    });

    assert_eq!(
        stats,
        CalculationStats {
            formula_count: 5,
            cells_calculated: 5,
            errors: 0,
            circular_references: 0,
        }
    );

    let shown: Vec<String> = table.rows[2]
        .cells
        .iter()
        .map(|c| c.display_text())
        .collect();
    assert_eq!(shown, vec!["Total", "$5.00", "$1,500.00", "$3,060.00"]);
    assert_eq!(table.cell(3, 0).unwrap().display_text(), "$3,000.00");
}

#[test]
fn test_formatting_of_results() {
    assert_eq!(format_result(&Ok(Some(1234567.891)), None, None), "1,234,567.89");
    assert_eq!(format_result(&Ok(Some(0.5)), Some("GBP"), Some(0)), "£1");
    assert_eq!(format_result(&Ok(None), None, None), "—");
}
