//! CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::options::CsvReadOptions;
use tabula_core::{Table, TableCell, TableRow};

/// A table read from CSV, with its header record kept apart
///
/// The header is not part of the table, so the first data record is row 1 in formulas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    /// Header record, if the file has one
    pub headers: Option<Vec<String>>,
    /// Data and total rows
    pub table: Table,
}

/// CSV file reader
pub struct CsvReader;

impl CsvReader {
    /// Read a CSV file into a table
    pub fn read_file<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> CsvResult<CsvTable> {
        let file = File::open(path)?;
        Self::read(file, options)
    }

    /// Read CSV from a reader into a table
    pub fn read<R: Read>(reader: R, options: &CsvReadOptions) -> CsvResult<CsvTable> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(options.has_header)
            .flexible(true)
            .from_reader(reader);

        let mut headers = None;
        if options.has_header {
            let record = csv_reader.headers()?;
            if !record.is_empty() {
                headers = Some(record.iter().map(String::from).collect());
            }
        }

        let mut table = Table::new();
        let mut formulas = 0usize;

        for (index, result) in csv_reader.records().enumerate() {
            let record = result.map_err(|source| CsvError::Record {
                record: index + 1,
                source,
            })?;

            let cells: Vec<TableCell> = record.iter().map(TableCell::from_input).collect();
            formulas += cells.iter().filter(|c| c.formula_source().is_some()).count();

            let is_total = record.get(0).map_or(false, |f| options.is_total_marker(f));
            table.push_row(if is_total {
                TableRow::total(cells)
            } else {
                TableRow::new(cells)
            });
        }

        log::debug!(
            "read {} CSV rows ({} total rows), {} formulas",
            table.rows.len(),
            table.rows.iter().filter(|r| r.is_total).count(),
            formulas
        );

        Ok(CsvTable { headers, table })
    }
}
