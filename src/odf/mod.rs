//! OpenDocument table support.
//!
//! - [`coordinates`]: A1 addresses and ranges
//! - [`elements`]: the element tree and typed table element wrappers
//! - [`table`]: the dense table model built on top of them

pub mod coordinates;
pub mod elements;
pub mod table;

pub use coordinates::{CellCoord, CellRange};
pub use elements::element::{Element, ElementBase};
pub use elements::table::{CellValue, SpanSize, TableCell, TableColumn, TableNode, TableRow, ValueType};
pub use table::{CellSpanController, ExpandStrategy, Table, TableOptions};
