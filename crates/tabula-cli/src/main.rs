//! Tabula CLI - recalculate formula tables

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tabula::prelude::*;
use tabula::reference::{extract_cell_refs, extract_range_refs, shift_references};
use tabula::{
    evaluate, parse_formula, recalculate, CsvReadOptions, CsvWriteOptions, FormulaKind,
};

#[derive(Parser)]
#[command(name = "tabula")]
#[command(author, version, about = "Recalculate spreadsheet-style formulas in CSV tables")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recalculate every formula in a CSV/TSV file
    Recalc {
        /// Input table file (csv, tsv)
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Currency code or symbol for displayed results (USD, EUR, $, ...)
        #[arg(long)]
        currency: Option<String>,

        /// Decimal places of displayed results
        #[arg(long, default_value = "2")]
        decimals: u32,

        /// First-field text marking total rows
        #[arg(long)]
        total_marker: Option<String>,

        /// Treat the first record as data instead of a header
        #[arg(long)]
        no_header: bool,

        /// Evaluate every formula with its own memo cache
        #[arg(long)]
        isolate: bool,

        /// Print per-cell results as JSON instead of the table
        #[arg(long)]
        json: bool,
    },

    /// Show information about a table file
    Info {
        /// Input table file
        input: PathBuf,

        /// First-field text marking total rows
        #[arg(long)]
        total_marker: Option<String>,
    },

    /// Parse a formula and report its tokens and references
    Check {
        /// Formula text, e.g. "=SUM(A1:A3)*10%"
        formula: String,
    },

    /// Shift the references of a formula for a row/column insert or delete
    #[command(allow_negative_numbers = true)]
    Shift {
        /// Formula text
        formula: String,

        /// Columns to shift by
        #[arg(long, default_value = "0")]
        cols: i64,

        /// Rows to shift by
        #[arg(long, default_value = "0")]
        rows: i64,

        /// Only shift columns with a 0-based index above this (-1: all)
        #[arg(long, default_value = "-1")]
        after_col: i64,

        /// Only shift rows with a 0-based index above this (-1: all)
        #[arg(long, default_value = "-1")]
        after_row: i64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Recalc {
            input,
            output,
            currency,
            decimals,
            total_marker,
            no_header,
            isolate,
            json,
        } => {
            let read_options = CsvReadOptions {
                has_header: !no_header,
                total_row_marker: total_marker,
                ..Default::default()
            };
            let calc_options = CalculationOptions {
                currency,
                decimals,
                share_context: !isolate,
            };
            recalc(&input, output.as_deref(), &read_options, &calc_options, json)
        }
        Commands::Info {
            input,
            total_marker,
        } => show_info(&input, total_marker),
        Commands::Check { formula } => check(&formula),
        Commands::Shift {
            formula,
            cols,
            rows,
            after_col,
            after_row,
        } => {
            println!(
                "{}",
                shift_references(&formula, cols, rows, after_col, after_row)
            );
            Ok(())
        }
    }
}

/// One formula cell in `--json` output
#[derive(Serialize)]
struct CellOutput<'a> {
    cell: String,
    total_row: bool,
    formula: &'a str,
    value: Option<f64>,
    display: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct RecalcOutput<'a> {
    formulas: usize,
    calculated: usize,
    errors: usize,
    circular_references: usize,
    cells: Vec<CellOutput<'a>>,
}

fn recalc(
    input: &Path,
    output: Option<&Path>,
    read_options: &CsvReadOptions,
    calc_options: &CalculationOptions,
    json: bool,
) -> Result<()> {
    let mut csv = CsvTable::open(input, read_options)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;

    let report = recalculate(&csv.table, calc_options);
    let stats = &report.stats;
    eprintln!(
        "Calculated {} formulas ({} errors, {} circular)",
        stats.formula_count, stats.errors, stats.circular_references
    );
    for cell in report.errors() {
        if let Err(e) = &cell.result {
            eprintln!("  {}: {} -> {}", cell.address, cell.formula, e);
        }
    }

    let mut buffer = Vec::new();
    if json {
        let out = RecalcOutput {
            formulas: stats.formula_count,
            calculated: stats.cells_calculated,
            errors: stats.errors,
            circular_references: stats.circular_references,
            cells: report
                .cells
                .iter()
                .map(|c| CellOutput {
                    cell: c.address.to_a1_string(),
                    total_row: c.is_total,
                    formula: &c.formula,
                    value: c.result.as_ref().ok().copied().flatten(),
                    display: &c.display,
                    error: c.result.as_ref().err().map(|e| e.to_string()),
                })
                .collect(),
        };
        serde_json::to_writer_pretty(&mut buffer, &out).context("Failed to encode JSON")?;
        buffer.push(b'\n');
    } else {
        report.apply(&mut csv.table);
        let write_options = CsvWriteOptions::default();
        match output {
            // Extension decides the delimiter when writing a file
            Some(path) => {
                csv.save(path, &write_options)
                    .with_context(|| format!("Failed to write '{}'", path.display()))?;
                eprintln!("Wrote {} rows to '{}'", csv.table.rows.len(), path.display());
                return Ok(());
            }
            None => CsvWriter::write(&csv, &mut buffer, &write_options)
                .context("Failed to encode CSV")?,
        }
    }

    match output {
        Some(path) => std::fs::write(path, &buffer)
            .with_context(|| format!("Failed to write '{}'", path.display()))?,
        None => io::stdout()
            .write_all(&buffer)
            .context("Failed to write to stdout")?,
    }

    Ok(())
}

fn show_info(input: &Path, total_marker: Option<String>) -> Result<()> {
    let options = CsvReadOptions {
        total_row_marker: total_marker,
        ..Default::default()
    };
    let csv = CsvTable::open(input, &options)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;
    let table = &csv.table;

    let total_rows = table.rows.iter().filter(|r| r.is_total).count();
    let formulas = table
        .rows
        .iter()
        .flat_map(|r| &r.cells)
        .filter(|c| c.formula_source().is_some())
        .count();

    println!("File: {}", input.display());
    if let Some(headers) = &csv.headers {
        println!("Columns: {}", headers.join(", "));
    }
    println!(
        "Rows: {} data, {} total ({} columns)",
        table.rows.len() - total_rows,
        total_rows,
        table.max_cols()
    );
    println!("Formulas: {}", formulas);

    Ok(())
}

fn check(formula: &str) -> Result<()> {
    let parsed = match parse_formula(formula) {
        Ok(parsed) => parsed,
        Err(e) => {
            println!("{}", e);
            return Ok(());
        }
    };

    let kind = match parsed.kind {
        FormulaKind::Constant => "constant",
        FormulaKind::Expression => "expression",
        FormulaKind::Function => "function",
    };
    println!("Kind: {}", kind);
    println!("Tokens: {}", parsed.tokens.len());
    println!("Cells: {}", extract_cell_refs(formula).join(", "));
    println!("Ranges: {}", extract_range_refs(formula).join(", "));

    if parsed.kind == FormulaKind::Constant {
        let empty = TableData::default();
        let result = evaluate(formula, &empty, CellAddress::new(0, 0), None);
        match result {
            Ok(Some(value)) => println!("Value: {}", value),
            Ok(None) => println!("Value: none"),
            Err(e) => println!("Value: {}", e),
        }
    }

    Ok(())
}
