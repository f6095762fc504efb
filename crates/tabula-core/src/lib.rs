//! # tabula-core
//!
//! Core data structures for the tabula formula engine.
//!
//! This crate provides:
//! - [`CellAddress`] and [`CellRange`] - A1-style cell addressing and ranges
//! - [`reference`] - Text-level reference codec (scanning, expansion, shifting)
//! - [`Table`] and [`TableSource`] - The host table model the engine reads from
//!
//! ## Example
//!
//! ```rust
//! use tabula_core::{CellAddress, CellRange};
//!
//! let addr = CellAddress::parse("B3").unwrap();
//! assert_eq!((addr.col, addr.row), (1, 2));
//!
//! let range = CellRange::parse("A5:A1").unwrap();
//! assert_eq!(range.to_string(), "A1:A5");
//! ```

pub mod cell;
pub mod error;
pub mod grid;
pub mod reference;

// Re-exports for convenience
pub use cell::{CellAddress, CellRange, CellRangeIterator};
pub use error::{Error, Result};
pub use grid::{ContentNode, Table, TableCell, TableRow, TableSource};
