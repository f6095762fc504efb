//! Table snapshots
//!
//! A [`TableData`] is an immutable numeric view of a host table taken at the start of
//! a recalculation pass. Total rows are left out, formula cells hold no value, and
//! every row is padded to the same width so ranges can be walked without bounds
//! surprises.

use ahash::AHashMap;
use tabula_core::{CellAddress, TableSource};

/// Immutable numeric snapshot of a table
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TableData {
    /// `values[row][col]`; `None` for empty, non-numeric and formula cells
    values: Vec<Vec<Option<f64>>>,
    row_count: usize,
    col_count: usize,
    /// Formula source keyed by A1 reference
    formulas: AHashMap<String, String>,
}

impl TableData {
    /// Build a snapshot from raw rows and formulas, padding rows to a uniform width
    pub fn new(mut values: Vec<Vec<Option<f64>>>, formulas: AHashMap<String, String>) -> Self {
        let col_count = values.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut values {
            row.resize(col_count, None);
        }

        Self {
            row_count: values.len(),
            col_count,
            values,
            formulas,
        }
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns (the widest row)
    pub fn col_count(&self) -> usize {
        self.col_count
    }

    /// The value grid, `values[row][col]`
    pub fn values(&self) -> &[Vec<Option<f64>>] {
        &self.values
    }

    /// Whether the address lies inside the snapshot
    pub fn contains(&self, addr: &CellAddress) -> bool {
        (addr.row as usize) < self.row_count && (addr.col as usize) < self.col_count
    }

    /// Literal numeric value at the address, if any
    pub fn value(&self, addr: &CellAddress) -> Option<f64> {
        self.values
            .get(addr.row as usize)
            .and_then(|row| row.get(addr.col as usize))
            .copied()
            .flatten()
    }

    /// Formula stored at the address, if any
    pub fn formula(&self, addr: &CellAddress) -> Option<&str> {
        self.formula_by_ref(&addr.to_a1_string())
    }

    /// Formula stored under an A1 reference, if any
    pub fn formula_by_ref(&self, reference: &str) -> Option<&str> {
        self.formulas.get(reference).map(String::as_str)
    }

    /// All formulas as `(reference, formula)` pairs, in no particular order
    pub fn formulas(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.formulas.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of formula cells
    pub fn formula_count(&self) -> usize {
        self.formulas.len()
    }
}

/// Take a snapshot of a host table
///
/// Total rows are skipped, so data rows are numbered consecutively in the snapshot.
/// A cell whose formula starts with `=` is recorded in the formula map and holds no
/// value; any other cell is reduced to digits, `.` and `-` and parsed as a number.
pub fn extract<T: TableSource + ?Sized>(source: &T) -> TableData {
    let mut values = Vec::with_capacity(source.row_count());
    let mut formulas = AHashMap::new();

    for doc_row in 0..source.row_count() {
        if source.is_total_row(doc_row) {
            log::trace!("skipping total row {}", doc_row);
            continue;
        }

        let data_row = values.len();
        let cell_count = source.cell_count(doc_row);
        let mut row_values = Vec::with_capacity(cell_count);

        for col in 0..cell_count {
            match source.cell_formula(col, doc_row) {
                Some(formula) if formula.starts_with('=') => {
                    let reference = CellAddress::new(col as u32, data_row as u32).to_a1_string();
                    formulas.insert(reference, formula.to_string());
                    row_values.push(None);
                }
                _ => row_values.push(parse_cell_number(&source.cell_text(col, doc_row))),
            }
        }

        values.push(row_values);
    }

    let data = TableData::new(values, formulas);
    log::debug!(
        "extracted table snapshot: {} rows x {} cols, {} formulas",
        data.row_count(),
        data.col_count(),
        data.formula_count()
    );
    data
}

/// Read a number out of displayed cell text such as `"$1,234.50"`
///
/// Everything except digits, `.` and `-` is dropped, then the longest leading
/// decimal number is parsed (`"1.2.3"` reads as `1.2`).
pub fn parse_cell_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    let bytes = cleaned.as_bytes();
    let mut end = 0;
    if bytes.first() == Some(&b'-') {
        end = 1;
    }

    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > digits_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            has_digits = true;
            end = frac_end;
        }
    }

    if !has_digits {
        return None;
    }

    cleaned[..end].parse().ok()
}
