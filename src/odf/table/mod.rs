//! The dense table model.
//!
//! Loading runs [`normalize`] (expansion of repeated rows, columns and
//! cells, then right-padding to a rectangle) and hands the result to a
//! [`RowColumnContainer`]. [`Table`] is the public façade over it, and
//! [`CellSpanController`] merges and unmerges cells on a `Table`.
//! [`StructureOrganizer`] decides where structural children go whenever a
//! position matters.

mod cache;
mod container;
mod grid;
mod normalize;
mod options;
mod span;
mod structure;

pub use cache::WrapperCache;
pub use container::RowColumnContainer;
pub use grid::{CellPosition, LineIndex, Table};
pub use normalize::{NormalizeReport, normalize};
pub use options::TableOptions;
pub use span::CellSpanController;
pub use structure::{
    BlockKind, StructureOrganizer, TABLE_EPILOGUE, TABLE_PRELUDE, TagBlock, TagInfo,
};

pub use crate::odf::elements::table_expansion::ExpandStrategy;
