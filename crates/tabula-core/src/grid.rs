//! Host table model
//!
//! A table as the editor hands it to the formula engine: rows of cells, each cell
//! holding rich-text content and optionally a formula. Rows can be flagged as total
//! rows, which only ever receive output.

/// Rich-text content of a cell
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContentNode {
    /// A run of text
    Text(String),
    /// A node that only groups other nodes (paragraph, mark, ...)
    Container(Vec<ContentNode>),
}

impl ContentNode {
    /// Create a text leaf
    pub fn text<S: Into<String>>(text: S) -> Self {
        ContentNode::Text(text.into())
    }

    /// Concatenate all text leaves in document order
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            ContentNode::Text(text) => out.push_str(text),
            ContentNode::Container(children) => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }
}

impl Default for ContentNode {
    fn default() -> Self {
        ContentNode::Container(Vec::new())
    }
}

/// A single table cell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableCell {
    /// Displayed content
    pub content: ContentNode,
    /// Formula source, if the cell is computed (e.g. "=A1*2")
    pub formula: Option<String>,
}

impl TableCell {
    /// Create a plain cell holding `text`
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self {
            content: ContentNode::text(text),
            formula: None,
        }
    }

    /// Create a formula cell with no rendered content yet
    pub fn formula<S: Into<String>>(formula: S) -> Self {
        Self {
            content: ContentNode::default(),
            formula: Some(formula.into()),
        }
    }

    /// Create a cell from raw input: text starting with `=` becomes a formula
    pub fn from_input(input: &str) -> Self {
        if input.trim_start().starts_with('=') {
            Self::formula(input.trim())
        } else {
            Self::text(input)
        }
    }

    /// Formula source, if it is a formula (starts with `=`)
    pub fn formula_source(&self) -> Option<&str> {
        self.formula.as_deref().filter(|f| f.starts_with('='))
    }

    /// Displayed text, flattened
    pub fn display_text(&self) -> String {
        self.content.plain_text()
    }

    /// Replace the displayed content with a single text run
    pub fn set_display_text<S: Into<String>>(&mut self, text: S) {
        self.content = ContentNode::text(text);
    }
}

/// A table row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableRow {
    /// Cells in column order
    pub cells: Vec<TableCell>,
    /// Whether this row is reserved for aggregate output
    pub is_total: bool,
}

impl TableRow {
    /// Create a data row
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self {
            cells,
            is_total: false,
        }
    }

    /// Create a total row
    pub fn total(cells: Vec<TableCell>) -> Self {
        Self {
            cells,
            is_total: true,
        }
    }
}

/// An in-memory table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Table {
    /// Rows in document order
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a data table from raw cell input, one slice per row
    ///
    /// ```
    /// use tabula_core::Table;
    ///
    /// let table = Table::from_rows(&[&["10", "20", "=A1+B1"]]);
    /// assert_eq!(table.rows[0].cells[2].formula_source(), Some("=A1+B1"));
    /// ```
    pub fn from_rows(rows: &[&[&str]]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|row| TableRow::new(row.iter().map(|c| TableCell::from_input(c)).collect()))
                .collect(),
        }
    }

    /// Append a row
    pub fn push_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Get a cell by 0-based column and document row index
    pub fn cell(&self, col: usize, row: usize) -> Option<&TableCell> {
        self.rows.get(row).and_then(|r| r.cells.get(col))
    }

    /// Get a mutable cell by 0-based column and document row index
    pub fn cell_mut(&mut self, col: usize, row: usize) -> Option<&mut TableCell> {
        self.rows.get_mut(row).and_then(|r| r.cells.get_mut(col))
    }

    /// Widest row
    pub fn max_cols(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }
}

/// Read-only view of a host table
///
/// Row and column indices are positions in the host document.
pub trait TableSource {
    /// Number of rows, total rows included
    fn row_count(&self) -> usize;

    /// Whether the row is an output-only total row
    fn is_total_row(&self, row: usize) -> bool;

    /// Number of cells in the row
    fn cell_count(&self, row: usize) -> usize;

    /// Formula source of the cell, if it holds one
    fn cell_formula(&self, col: usize, row: usize) -> Option<&str>;

    /// Plain text of the cell
    fn cell_text(&self, col: usize, row: usize) -> String;
}

impl TableSource for Table {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn is_total_row(&self, row: usize) -> bool {
        self.rows.get(row).map_or(false, |r| r.is_total)
    }

    fn cell_count(&self, row: usize) -> usize {
        self.rows.get(row).map_or(0, |r| r.cells.len())
    }

    fn cell_formula(&self, col: usize, row: usize) -> Option<&str> {
        self.cell(col, row).and_then(TableCell::formula_source)
    }

    fn cell_text(&self, col: usize, row: usize) -> String {
        self.cell(col, row)
            .map(|c| c.content.plain_text())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_walks_nested_content() {
        let node = ContentNode::Container(vec![
            ContentNode::text("$1,"),
            ContentNode::Container(vec![ContentNode::text("234"), ContentNode::text(".5")]),
        ]);
        assert_eq!(node.plain_text(), "$1,234.5");
        assert_eq!(ContentNode::default().plain_text(), "");
    }

    #[test]
    fn test_from_input_detects_formulas() {
        assert_eq!(TableCell::from_input("=A1*2").formula_source(), Some("=A1*2"));
        assert_eq!(TableCell::from_input(" =A1 ").formula_source(), Some("=A1"));
        assert_eq!(TableCell::from_input("42").formula_source(), None);

        let cell = TableCell {
            content: ContentNode::default(),
            formula: Some("A1*2".into()),
        };
        assert_eq!(cell.formula_source(), None);
    }

    #[test]
    fn test_table_source() {
        let mut table = Table::from_rows(&[&["1", "2"], &["3"]]);
        table.push_row(TableRow::total(vec![TableCell::formula("=SUM(A1:A2)")]));

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.cell_count(1), 1);
        assert!(table.is_total_row(2));
        assert!(!table.is_total_row(0));
        assert!(!table.is_total_row(99));
        assert_eq!(table.cell_text(1, 0), "2");
        assert_eq!(table.cell_text(5, 5), "");
        assert_eq!(table.cell_formula(0, 2), Some("=SUM(A1:A2)"));
        assert_eq!(table.max_cols(), 2);
    }
}
