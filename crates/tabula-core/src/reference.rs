//! Text-level A1 reference codec
//!
//! Lenient helpers over [`CellAddress`] and [`CellRange`] for hosts that work with
//! formula text directly: conversions that report failure as `None` or an empty value
//! instead of an error, scanners that pull references out of a formula, and the
//! reference shift applied when rows or columns are inserted or deleted.

use crate::cell::{CellAddress, CellRange};
use lazy_regex::regex;

/// Literal inserted in place of a reference that no longer points into the grid
pub const REF_ERROR: &str = "#REF!";

/// Convert 0-based column/row indices to A1 text.
///
/// Returns an empty string when either index is negative or too large.
pub fn coord_to_text(col: i64, row: i64) -> String {
    match (u32::try_from(col), u32::try_from(row)) {
        (Ok(col), Ok(row)) => CellAddress::new(col, row).to_a1_string(),
        _ => String::new(),
    }
}

/// Convert A1 text (case-insensitive) to a cell address
pub fn text_to_coord(text: &str) -> Option<CellAddress> {
    CellAddress::parse(text).ok()
}

/// Convert column letters to a 0-based index (A = 0, AA = 26)
pub fn column_letter_to_index(letters: &str) -> Option<u32> {
    CellAddress::letters_to_column(letters).ok()
}

/// Convert a 0-based column index to letters (0 = A, 26 = AA)
pub fn column_index_to_letter(index: u32) -> String {
    CellAddress::column_to_letters(index)
}

/// Parse "A1:C4" into a normalized range
pub fn parse_range(text: &str) -> Option<CellRange> {
    CellRange::parse(text).ok()
}

/// Expand a range into its cell references, row-major.
///
/// Invalid input yields an empty vector.
pub fn expand_range(text: &str) -> Vec<String> {
    parse_range(text)
        .map(|range| range.cells().map(|addr| addr.to_a1_string()).collect())
        .unwrap_or_default()
}

/// Distinct standalone cell references in a formula, first-seen order, uppercased.
///
/// Endpoints of a range (`A1:B2`) are not reported here; see [`extract_range_refs`].
pub fn extract_cell_refs(formula: &str) -> Vec<String> {
    let mut refs: Vec<String> = Vec::new();

    for caps in regex!(r"(?i)\b([A-Z]+[0-9]+)(?::([A-Z]+[0-9]+))?\b").captures_iter(formula) {
        if caps.get(2).is_some() {
            continue;
        }
        if let Some(addr) = text_to_coord(&caps[1]) {
            let text = addr.to_a1_string();
            if !refs.contains(&text) {
                refs.push(text);
            }
        }
    }

    refs
}

/// Distinct range references in a formula, first-seen order, uppercased
pub fn extract_range_refs(formula: &str) -> Vec<String> {
    let mut refs: Vec<String> = Vec::new();

    for caps in regex!(r"(?i)\b([A-Z]+[0-9]+):([A-Z]+[0-9]+)\b").captures_iter(formula) {
        let text = caps[0].to_ascii_uppercase();
        if parse_range(&text).is_some() && !refs.contains(&text) {
            refs.push(text);
        }
    }

    refs
}

/// Shift cell references in a formula for a row/column insertion or deletion.
///
/// A reference's column moves by `col_delta` when its index is greater than
/// `after_col`, and its row moves by `row_delta` when its index is greater than
/// `after_row`; pass `-1` to shift unconditionally. A reference pushed to a negative
/// coordinate is replaced by `#REF!`. Range endpoints are shifted individually.
///
/// # Examples
/// ```
/// use tabula_core::reference::shift_references;
///
/// assert_eq!(shift_references("=A1+A2", 0, 1, -1, -1), "=A2+A3");
/// assert_eq!(shift_references("=A1", -1, 0, -1, -1), "=#REF!");
/// ```
pub fn shift_references(
    formula: &str,
    col_delta: i64,
    row_delta: i64,
    after_col: i64,
    after_row: i64,
) -> String {
    regex!(r"(?i)\b([A-Z]+)([0-9]+)\b")
        .replace_all(formula, |caps: &lazy_regex::Captures| {
            let addr = match text_to_coord(&caps[0]) {
                Some(addr) => addr,
                // Not a usable reference (row 0, oversized column); leave the text alone
                None => return caps[0].to_string(),
            };

            let col = i64::from(addr.col);
            let row = i64::from(addr.row);
            let new_col = if col > after_col {
                col.checked_add(col_delta)
            } else {
                Some(col)
            };
            let new_row = if row > after_row {
                row.checked_add(row_delta)
            } else {
                Some(row)
            };

            match (new_col, new_row) {
                (Some(c), Some(r)) if c >= 0 && r >= 0 => match coord_to_text(c, r) {
                    text if text.is_empty() => REF_ERROR.to_string(),
                    text => text,
                },
                _ => {
                    log::debug!("reference {} shifted out of the grid", &caps[0]);
                    REF_ERROR.to_string()
                }
            }
        })
        .into_owned()
}
