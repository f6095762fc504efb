//! CSV options

/// Options for reading CSV files
#[derive(Debug, Clone)]
pub struct CsvReadOptions {
    /// Field delimiter (default: comma)
    pub delimiter: u8,
    /// Quote character (default: double quote)
    pub quote: u8,
    /// Whether the first record is a header, kept apart from the table (default: true)
    pub has_header: bool,
    /// First-field text (case-insensitive, trimmed) that marks a total row
    pub total_row_marker: Option<String>,
}

impl Default for CsvReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            has_header: true,
            total_row_marker: None,
        }
    }
}

impl CsvReadOptions {
    /// Whether a row starting with `first_field` is a total row
    pub fn is_total_marker(&self, first_field: &str) -> bool {
        self.total_row_marker
            .as_deref()
            .map_or(false, |marker| first_field.trim().eq_ignore_ascii_case(marker.trim()))
    }
}

/// Options for writing CSV files
#[derive(Debug, Clone)]
pub struct CsvWriteOptions {
    /// Field delimiter (default: comma)
    pub delimiter: u8,
    /// Quote character (default: double quote)
    pub quote: u8,
    /// Write the header record, if the table has one (default: true)
    pub write_header: bool,
    /// Write formula source instead of displayed text for formula cells
    pub write_formulas: bool,
    /// Line terminator
    pub line_terminator: LineTerminator,
}

impl Default for CsvWriteOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            write_header: true,
            write_formulas: false,
            line_terminator: LineTerminator::CRLF,
        }
    }
}

/// Line terminator type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTerminator {
    /// Unix-style (LF)
    LF,
    /// Windows-style (CRLF)
    CRLF,
    /// Mac classic (CR)
    CR,
}
