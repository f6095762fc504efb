//! # tabula-csv
//!
//! CSV reader and writer for tabula tables.
//!
//! Fields starting with `=` are read as formula cells; rows whose first field matches
//! [`CsvReadOptions::total_row_marker`] become total rows. Writing emits each cell's
//! displayed text, or its formula source when [`CsvWriteOptions::write_formulas`] is set.

mod reader;
mod writer;
mod options;
mod error;

pub use reader::{CsvReader, CsvTable};
pub use writer::CsvWriter;
pub use options::{CsvReadOptions, CsvWriteOptions, LineTerminator};
pub use error::{CsvError, CsvResult};
