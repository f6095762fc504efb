//! Recalculate a small invoice table and print every formula cell
//!
//! Run with: cargo run -p tabula --example recalc_invoice

use tabula::prelude::*;
use tabula::recalculate;

fn main() {
    let mut table = Table::from_rows(&[
        &["Design", "12", "85", "=B1*C1"],
        &["Hosting", "3", "19.99", "=B2*C2"],
        &["Support", "5", "40", "=B3*C3"],
    ]);
    table.push_row(TableRow::total(vec![
        TableCell::text("Subtotal"),
        TableCell::formula("=SUM(B1:B3)"),
        TableCell::formula("=AVG(C1:C3)"),
        TableCell::formula("=SUM(D1:D3)"),
    ]));
    table.push_row(TableRow::total(vec![
        TableCell::text("VAT"),
        TableCell::text(""),
        TableCell::text("20%"),
        TableCell::formula("=SUM(D1:D3)*20%"),
    ]));

    let options = CalculationOptions {
        currency: Some("EUR".into()),
        ..Default::default()
    };
    let report = recalculate(&table, &options);

    for cell in &report.cells {
        let detail = match &cell.result {
            Ok(_) => String::new(),
            Err(e) => format!("  ({})", e),
        };
        println!(
            "{:>4}  {:<18} {}{}",
            cell.address, cell.formula, cell.display, detail
        );
    }
    println!(
        "{} formulas, {} errors",
        report.stats.formula_count, report.stats.errors
    );

    report.apply(&mut table);
}
