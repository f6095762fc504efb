//! Cell addressing

mod address;
mod range;

pub use address::CellAddress;
pub use range::{CellRange, CellRangeIterator};
