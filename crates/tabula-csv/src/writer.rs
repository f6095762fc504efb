//! CSV writer

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::CsvResult;
use crate::options::{CsvWriteOptions, LineTerminator};
use crate::reader::CsvTable;
use tabula_core::TableCell;

/// CSV file writer
pub struct CsvWriter;

impl CsvWriter {
    /// Write a table to a CSV file
    pub fn write_file<P: AsRef<Path>>(
        table: &CsvTable,
        path: P,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        let file = File::create(path)?;
        Self::write(table, file, options)
    }

    /// Write a table to a writer
    pub fn write<W: Write>(table: &CsvTable, writer: W, options: &CsvWriteOptions) -> CsvResult<()> {
        let terminator = match options.line_terminator {
            LineTerminator::LF => csv::Terminator::Any(b'\n'),
            LineTerminator::CRLF => csv::Terminator::CRLF,
            LineTerminator::CR => csv::Terminator::Any(b'\r'),
        };

        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .terminator(terminator)
            .flexible(true)
            .from_writer(writer);

        if options.write_header {
            if let Some(headers) = &table.headers {
                csv_writer.write_record(headers)?;
            }
        }

        for row in &table.table.rows {
            let record: Vec<String> = row
                .cells
                .iter()
                .map(|cell| cell_field(cell, options.write_formulas))
                .collect();
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

fn cell_field(cell: &TableCell, write_formulas: bool) -> String {
    match cell.formula_source() {
        Some(formula) if write_formulas => formula.to_string(),
        _ => cell.display_text(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::Table;

    fn sample() -> CsvTable {
        let mut table = Table::from_rows(&[&["1", "=A1*2"]]);
        table.rows[0].cells[1].set_display_text("2.00");
        CsvTable {
            headers: Some(vec!["a".into(), "b".into()]),
            table,
        }
    }

    fn write_to_string(table: &CsvTable, options: &CsvWriteOptions) -> String {
        let mut out = Vec::new();
        CsvWriter::write(table, &mut out, options).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_write_display_text() {
        let options = CsvWriteOptions {
            line_terminator: LineTerminator::LF,
            ..Default::default()
        };
        assert_eq!(write_to_string(&sample(), &options), "a,b\n1,2.00\n");
    }

    #[test]
    fn test_write_formulas_without_header() {
        let options = CsvWriteOptions {
            write_header: false,
            write_formulas: true,
            ..Default::default()
        };
        assert_eq!(write_to_string(&sample(), &options), "1,=A1*2\r\n");
    }
}
