//! Rectangular cell ranges

use super::CellAddress;
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A rectangle of cells such as `A1:C4`
///
/// `start` is always the top-left corner and `end` the bottom-right one; ranges
/// written back to front (`C4:A1`) are corrected on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRange {
    pub start: CellAddress,
    pub end: CellAddress,
}

impl CellRange {
    /// Range spanning two corners given in any order
    pub fn new(a: CellAddress, b: CellAddress) -> Self {
        Self {
            start: CellAddress::new(a.col.min(b.col), a.row.min(b.row)),
            end: CellAddress::new(a.col.max(b.col), a.row.max(b.row)),
        }
    }

    pub fn from_indices(start_col: u32, start_row: u32, end_col: u32, end_row: u32) -> Self {
        Self::new(
            CellAddress::new(start_col, start_row),
            CellAddress::new(end_col, end_row),
        )
    }

    /// Parse `A1:C4`; exactly one `:` separates two cell addresses
    pub fn parse(s: &str) -> Result<Self> {
        let (first, second) = s
            .split_once(':')
            .filter(|(_, rest)| !rest.contains(':'))
            .ok_or_else(|| Error::InvalidRange(format!("'{}' needs exactly one ':'", s)))?;

        let corner = |text: &str| {
            CellAddress::parse(text).map_err(|e| Error::InvalidRange(format!("'{}': {}", s, e)))
        };
        Ok(Self::new(corner(first)?, corner(second)?))
    }

    pub fn contains(&self, addr: &CellAddress) -> bool {
        (self.start.col..=self.end.col).contains(&addr.col)
            && (self.start.row..=self.end.row).contains(&addr.row)
    }

    pub fn row_count(&self) -> u64 {
        u64::from(self.end.row - self.start.row) + 1
    }

    pub fn col_count(&self) -> u64 {
        u64::from(self.end.col - self.start.col) + 1
    }

    pub fn cell_count(&self) -> u64 {
        self.row_count() * self.col_count()
    }

    /// Every address in the range, left to right then top to bottom
    pub fn cells(&self) -> CellRangeIterator {
        CellRangeIterator {
            range: *self,
            next: 0,
            len: self.cell_count(),
        }
    }

    /// `A1:B2` text; a single-cell range still prints both corners
    pub fn to_a1_string(&self) -> String {
        format!("{}:{}", self.start, self.end)
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Row-major walk over a [`CellRange`]
#[derive(Debug, Clone)]
pub struct CellRangeIterator {
    range: CellRange,
    /// Offset of the next cell from the top-left corner
    next: u64,
    len: u64,
}

impl Iterator for CellRangeIterator {
    type Item = CellAddress;

    fn next(&mut self) -> Option<CellAddress> {
        if self.next >= self.len {
            return None;
        }
        let width = self.range.col_count();
        let col = self.range.start.col as u64 + self.next % width;
        let row = self.range.start.row as u64 + self.next / width;
        self.next += 1;
        Some(CellAddress::new(col as u32, row as u32))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = usize::try_from(self.len - self.next).unwrap_or(usize::MAX);
        (left, Some(left))
    }
}

impl ExactSizeIterator for CellRangeIterator {}
