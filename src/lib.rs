//! Litchi Table - a dense grid model over OpenDocument tables
//!
//! OpenDocument stores tables compactly: runs of identical rows, column
//! definitions and cells are written once with a repeat count, merged
//! regions are recorded on one anchor cell plus "covered" placeholders,
//! and a table's children follow a fixed prelude / data / epilogue order.
//! This crate turns such a `table:table` element into an addressable,
//! rectangular grid and keeps those encodings intact while it is edited.
//!
//! # Features
//!
//! - **Expansion**: repeated rows, columns and cells become real elements,
//!   with strategies that cap or skip the huge trailing runs office suites
//!   write
//! - **Normalization**: every row is right-padded to the widest one
//! - **Dual addressing**: `(row, col)` pairs with negative indices, or
//!   spreadsheet addresses like `"AA100"`
//! - **Structural edits**: insert, append and delete rows and columns,
//!   including rows inside header and group containers
//! - **Merged cells**: span, unspan and list merged regions with the
//!   covered-cell bookkeeping done for you
//! - **XML in and out**: load from a `content.xml` fragment, serialize back
//!
//! # Example
//!
//! ```
//! use litchi_table::{CellValue, Table};
//!
//! # fn main() -> litchi_table::Result<()> {
//! let mut table = Table::from_xml(
//!     r#"<table:table table:name="Sheet1">
//!          <table:table-column table:number-columns-repeated="3"/>
//!          <table:table-row table:number-rows-repeated="4">
//!            <table:table-cell table:number-columns-repeated="3"/>
//!          </table:table-row>
//!        </table:table>"#,
//! )?;
//! assert_eq!(table.size(), (4, 3));
//!
//! table.set_cell_value("A1", "Total")?;
//! table.set_cell_value((0, -1), 42.0)?;
//! table.spans().set_span("A2", (2, 2))?;
//! table.insert_rows(-1, 1)?;
//!
//! assert_eq!(table.get_cell("C1")?.value(), CellValue::Float(42.0));
//! assert!(table.get_cell("B3")?.is_covered());
//! assert_eq!(table.nrows(), 5);
//!
//! let xml = table.to_xml_string();
//! assert!(xml.contains("table:number-rows-spanned=\"2\""));
//! # Ok(())
//! # }
//! ```

/// Common types shared across the crate
pub mod common;
/// OpenDocument table model
pub mod odf;

pub use common::{Error, Result};
pub use odf::{
    CellCoord, CellRange, CellSpanController, CellValue, Element, ExpandStrategy, SpanSize, Table,
    TableCell, TableOptions, ValueType,
};
