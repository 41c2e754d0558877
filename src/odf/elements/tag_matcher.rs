//! ODF table tag matching using a compile-time perfect hash map.
//!
//! Every structural decision in the table core (is this child a row, a
//! row grouping container, a covered cell ...) goes through [`match_tag`],
//! so tag strings are compared in exactly one place.
//!
//! # Performance Optimizations
//!
//! - **Compile-time tag hashing**: Uses `phf` for O(1) tag lookups
//! - **Zero allocations**: All tag comparisons are done on borrowed slices
use phf::{Map, phf_map};

// ============================================================================
// TAG TYPE ENUMERATION
// ============================================================================

/// Table-related ODF tags the core dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TableTag {
    Table,
    Row,
    Column,
    Cell,
    CoveredCell,
    HeaderRows,
    Rows,
    RowGroup,
    HeaderColumns,
    Columns,
    ColumnGroup,
    Paragraph,
    Heading,

    // Unknown/unsupported tag
    Unknown,
}

/// Qualified names of the tags the core creates.
pub mod names {
    pub const TABLE: &str = "table:table";
    pub const ROW: &str = "table:table-row";
    pub const COLUMN: &str = "table:table-column";
    pub const CELL: &str = "table:table-cell";
    pub const COVERED_CELL: &str = "table:covered-table-cell";
    pub const PARAGRAPH: &str = "text:p";
}

// ============================================================================
// COMPILE-TIME TAG MAPPING
// ============================================================================

static TAG_MAP: Map<&'static [u8], TableTag> = phf_map! {
    b"table:table" => TableTag::Table,
    b"table:table-row" => TableTag::Row,
    b"table:table-column" => TableTag::Column,
    b"table:table-cell" => TableTag::Cell,
    b"table:covered-table-cell" => TableTag::CoveredCell,
    b"table:table-header-rows" => TableTag::HeaderRows,
    b"table:table-rows" => TableTag::Rows,
    b"table:table-row-group" => TableTag::RowGroup,
    b"table:table-header-columns" => TableTag::HeaderColumns,
    b"table:table-columns" => TableTag::Columns,
    b"table:table-column-group" => TableTag::ColumnGroup,
    b"text:p" => TableTag::Paragraph,
    b"text:h" => TableTag::Heading,
};

impl TableTag {
    /// Containers whose `table:table-row` descendants are logical rows
    #[inline]
    pub fn is_row_container(self) -> bool {
        matches!(self, TableTag::HeaderRows | TableTag::Rows | TableTag::RowGroup)
    }

    /// Containers whose `table:table-column` descendants are logical columns
    #[inline]
    pub fn is_column_container(self) -> bool {
        matches!(
            self,
            TableTag::HeaderColumns | TableTag::Columns | TableTag::ColumnGroup
        )
    }

    /// Both cell kinds occupy one grid position
    #[inline]
    pub fn is_cell(self) -> bool {
        matches!(self, TableTag::Cell | TableTag::CoveredCell)
    }

    /// Paragraph-level text content of a cell
    #[inline]
    pub fn is_text_block(self) -> bool {
        matches!(self, TableTag::Paragraph | TableTag::Heading)
    }

    /// Table skeleton elements; whitespace-only text inside them is layout
    #[inline]
    pub fn is_structural(self) -> bool {
        !self.is_text_block() && self != TableTag::Unknown
    }
}

// ============================================================================
// TAG MATCHING API
// ============================================================================

/// Match a tag to its `TableTag` variant
///
/// For tags the core does not dispatch on, returns `TableTag::Unknown`.
///
/// # Examples
///
/// ```
/// # use litchi_table::odf::elements::tag_matcher::{match_tag, TableTag};
/// assert_eq!(match_tag(b"table:table-row"), TableTag::Row);
/// assert_eq!(match_tag(b"table:covered-table-cell"), TableTag::CoveredCell);
/// assert_eq!(match_tag(b"table:title"), TableTag::Unknown);
/// ```
#[inline(always)]
pub fn match_tag(tag: &[u8]) -> TableTag {
    TAG_MAP.get(tag).copied().unwrap_or(TableTag::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_matching() {
        assert_eq!(match_tag(b"table:table"), TableTag::Table);
        assert_eq!(match_tag(b"table:table-cell"), TableTag::Cell);
        assert_eq!(match_tag(b"table:table-header-rows"), TableTag::HeaderRows);
        assert_eq!(match_tag(b"text:p"), TableTag::Paragraph);
        assert_eq!(match_tag(b"unknown:tag"), TableTag::Unknown);
    }

    #[test]
    fn test_names_round_trip() {
        assert_eq!(match_tag(names::TABLE.as_bytes()), TableTag::Table);
        assert_eq!(match_tag(names::ROW.as_bytes()), TableTag::Row);
        assert_eq!(match_tag(names::COLUMN.as_bytes()), TableTag::Column);
        assert_eq!(match_tag(names::CELL.as_bytes()), TableTag::Cell);
        assert_eq!(match_tag(names::COVERED_CELL.as_bytes()), TableTag::CoveredCell);
        assert_eq!(match_tag(names::PARAGRAPH.as_bytes()), TableTag::Paragraph);
    }

    #[test]
    fn test_tag_classes() {
        assert!(TableTag::RowGroup.is_row_container());
        assert!(!TableTag::Row.is_row_container());
        assert!(TableTag::HeaderColumns.is_column_container());
        assert!(TableTag::CoveredCell.is_cell());
        assert!(!TableTag::Column.is_cell());
        assert!(TableTag::Cell.is_structural());
        assert!(!TableTag::Paragraph.is_structural());
        assert!(!TableTag::Unknown.is_structural());
    }
}
