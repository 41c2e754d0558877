//! The table façade: a dense, addressable grid over a table element.
//!
//! [`Table`] wraps a normalized [`RowColumnContainer`] and a
//! [`WrapperCache`]. Cells are addressed either by `(row, col)` pairs, where
//! negative values count from the end, or by spreadsheet addresses such as
//! `"B3"`. Reads and writes go through the cache and the element tree
//! together, so the two never disagree after a successful call.

use super::cache::WrapperCache;
use super::container::{RowColumnContainer, resolve_index};
use super::normalize::normalize;
use super::options::TableOptions;
use super::span::CellSpanController;
use super::structure::StructureOrganizer;
use crate::common::{Axis, Error, Result};
use crate::odf::coordinates::{CellCoord, to_index};
use crate::odf::elements::element::{Element, ElementBase};
use crate::odf::elements::table::{
    CellValue, TableCell, TableColumn, TableNode, TableRow, attrs,
};
use crate::odf::elements::tag_matcher::{TableTag, names};
use std::str::FromStr;
use std::vec;

fn signed(value: usize) -> Result<isize> {
    isize::try_from(value)
        .map_err(|_| Error::invalid_argument(format!("index {} is too large", value)))
}

/// Anything that names one cell of a table
pub trait CellPosition {
    /// Signed `(row, col)`; negative values count from the end
    fn to_signed(&self) -> Result<(isize, isize)>;
}

impl CellPosition for (isize, isize) {
    fn to_signed(&self) -> Result<(isize, isize)> {
        Ok(*self)
    }
}

impl CellPosition for (i32, i32) {
    fn to_signed(&self) -> Result<(isize, isize)> {
        Ok((self.0 as isize, self.1 as isize))
    }
}

impl CellPosition for (usize, usize) {
    fn to_signed(&self) -> Result<(isize, isize)> {
        Ok((signed(self.0)?, signed(self.1)?))
    }
}

impl CellPosition for CellCoord {
    fn to_signed(&self) -> Result<(isize, isize)> {
        Ok((signed(self.row())?, signed(self.column())?))
    }
}

impl CellPosition for &str {
    fn to_signed(&self) -> Result<(isize, isize)> {
        let (row, col) = to_index(self)?;
        Ok((signed(row)?, signed(col)?))
    }
}

impl CellPosition for String {
    fn to_signed(&self) -> Result<(isize, isize)> {
        self.as_str().to_signed()
    }
}

impl CellPosition for &String {
    fn to_signed(&self) -> Result<(isize, isize)> {
        self.as_str().to_signed()
    }
}

/// Anything that names one row or one column.
///
/// Integers name the line directly; an address names the row or the
/// column it lies in.
pub trait LineIndex {
    fn row_index(&self) -> Result<isize>;
    fn column_index(&self) -> Result<isize>;
}

macro_rules! impl_line_index_signed {
    ($($t:ty),*) => {$(
        impl LineIndex for $t {
            fn row_index(&self) -> Result<isize> {
                Ok(*self as isize)
            }
            fn column_index(&self) -> Result<isize> {
                Ok(*self as isize)
            }
        }
    )*};
}

impl_line_index_signed!(isize, i32);

impl LineIndex for usize {
    fn row_index(&self) -> Result<isize> {
        signed(*self)
    }
    fn column_index(&self) -> Result<isize> {
        signed(*self)
    }
}

impl LineIndex for &str {
    fn row_index(&self) -> Result<isize> {
        signed(to_index(self)?.0)
    }
    fn column_index(&self) -> Result<isize> {
        signed(to_index(self)?.1)
    }
}

/// A named grid of cells backed by a `table:table` element.
///
/// # Examples
///
/// ```
/// use litchi_table::odf::table::Table;
/// use litchi_table::odf::elements::table::CellValue;
///
/// let mut table = Table::new("Sheet1", 3, 2).unwrap();
/// table.set_cell_value("B3", 4.5).unwrap();
///
/// assert_eq!(table.get_cell((2, 1)).unwrap().value(), CellValue::Float(4.5));
/// assert_eq!(table.get_cell((-1, -1)).unwrap().value(), CellValue::Float(4.5));
///
/// table.insert_rows(0, 1).unwrap();
/// assert_eq!(table.nrows(), 4);
/// assert_eq!(table.get_cell("B4").unwrap().value(), CellValue::Float(4.5));
/// ```
#[derive(Debug, Clone)]
pub struct Table {
    container: RowColumnContainer,
    cache: WrapperCache,
}

impl Table {
    /// Create a table of `nrows` x `ncols` empty cells
    pub fn new(name: &str, nrows: usize, ncols: usize) -> Result<Self> {
        let element = Element::new(names::TABLE).with_attribute(attrs::NAME, name);
        let mut container = RowColumnContainer::new(element, StructureOrganizer::table());
        container.reset(nrows, ncols)?;
        Ok(Self {
            container,
            cache: WrapperCache::new(),
        })
    }

    /// Load a table element with default options
    pub fn from_element(element: Element) -> Result<Self> {
        Self::from_element_with_options(element, TableOptions::default())
    }

    /// Load a table element: expansion, then normalization
    pub fn from_element_with_options(mut element: Element, options: TableOptions) -> Result<Self> {
        if element.tag() != TableTag::Table {
            return Err(Error::invalid_argument(format!(
                "expected <{}>, got <{}>",
                names::TABLE,
                element.tag_name()
            )));
        }
        normalize(&mut element, &options)?;
        Ok(Self {
            container: RowColumnContainer::new(element, options.organizer),
            cache: WrapperCache::new(),
        })
    }

    /// Parse a `table:table` XML fragment and load it
    pub fn from_xml(xml: &str) -> Result<Self> {
        Self::from_element(Element::parse(xml)?)
    }

    // ------------------------------------------------------------------
    // Table-level attributes and the element tree
    // ------------------------------------------------------------------

    pub fn name(&self) -> Option<&str> {
        self.container.element().get_attribute(attrs::NAME)
    }

    pub fn set_name(&mut self, name: &str) {
        self.container.element_mut().set_attribute(attrs::NAME, name);
    }

    pub fn style_name(&self) -> Option<&str> {
        self.container.element().get_attribute(attrs::STYLE_NAME)
    }

    pub fn set_style_name(&mut self, name: &str) {
        self.container
            .element_mut()
            .set_attribute(attrs::STYLE_NAME, name);
    }

    /// The backing element, expanded and normalized
    pub fn element(&self) -> &Element {
        self.container.element()
    }

    pub fn into_element(self) -> Element {
        self.container.into_element()
    }

    pub fn to_xml_string(&self) -> String {
        self.container.element().to_xml_string()
    }

    // ------------------------------------------------------------------
    // Dimensions
    // ------------------------------------------------------------------

    #[inline]
    pub fn nrows(&self) -> usize {
        self.container.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.container.ncols()
    }

    /// `(nrows, ncols)`
    pub fn size(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    pub(crate) fn resolve<P: CellPosition>(&self, position: P) -> Result<(usize, usize)> {
        let (row, col) = position.to_signed()?;
        self.container.resolve(row, col)
    }

    // ------------------------------------------------------------------
    // Cells
    // ------------------------------------------------------------------

    /// The cell at `position`: a `(row, col)` pair, a [`CellCoord`] or an
    /// address string
    pub fn get_cell<P: CellPosition>(&self, position: P) -> Result<TableCell> {
        let (r, c) = self.resolve(position)?;
        self.cell_at(r, c)
    }

    pub fn get_cell_by_index(&self, row: isize, col: isize) -> Result<TableCell> {
        self.get_cell((row, col))
    }

    pub fn get_cell_by_address(&self, address: &str) -> Result<TableCell> {
        self.get_cell(address)
    }

    /// Replace the cell at `position`
    pub fn set_cell<P: CellPosition>(&mut self, position: P, cell: TableCell) -> Result<()> {
        let (r, c) = self.resolve(position)?;
        self.store_cell(r, c, cell)
    }

    pub fn set_cell_by_index(&mut self, row: isize, col: isize, cell: TableCell) -> Result<()> {
        self.set_cell((row, col), cell)
    }

    pub fn set_cell_by_address(&mut self, address: &str, cell: TableCell) -> Result<()> {
        self.set_cell(address, cell)
    }

    /// Modify the cell at `position` in place and write it back
    pub fn update_cell<P, F>(&mut self, position: P, update: F) -> Result<()>
    where
        P: CellPosition,
        F: FnOnce(&mut TableCell),
    {
        let (r, c) = self.resolve(position)?;
        let mut cell = self.cell_at(r, c)?;
        update(&mut cell);
        self.store_cell(r, c, cell)
    }

    /// Set the typed value of the cell at `position`, keeping its style,
    /// formula and span
    pub fn set_cell_value<P, V>(&mut self, position: P, value: V) -> Result<()>
    where
        P: CellPosition,
        V: Into<CellValue>,
    {
        let value = value.into();
        self.update_cell(position, |cell| cell.set_value(value))
    }

    pub(crate) fn cell_at(&self, r: usize, c: usize) -> Result<TableCell> {
        self.cache.get_or_try_insert((r, c), || {
            let element = self.container.get_cell(signed(r)?, signed(c)?)?;
            TableCell::from_element(element.clone())
        })
    }

    pub(crate) fn store_cell(&mut self, r: usize, c: usize, cell: TableCell) -> Result<()> {
        self.container
            .set_cell(signed(r)?, signed(c)?, cell.element().clone())?;
        self.cache.insert((r, c), cell);
        Ok(())
    }

    /// Typed values of every cell, row by row
    pub fn values(&self) -> Result<Vec<Vec<CellValue>>> {
        (0..self.nrows())
            .map(|r| {
                (0..self.ncols())
                    .map(|c| self.cell_at(r, c).map(|cell| cell.value()))
                    .collect()
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Rows and columns
    // ------------------------------------------------------------------

    /// Cells of one row, left to right.
    ///
    /// `index` is a row number (negative counts from the end) or an
    /// address whose row is taken.
    pub fn row<I: LineIndex>(&self, index: I) -> Result<vec::IntoIter<TableCell>> {
        let r = resolve_index(index.row_index()?, self.nrows(), Axis::Row)?;
        let cells = (0..self.ncols())
            .map(|c| self.cell_at(r, c))
            .collect::<Result<Vec<_>>>()?;
        Ok(cells.into_iter())
    }

    /// Cells of one column, top to bottom.
    ///
    /// `index` is a column number (negative counts from the end) or an
    /// address whose column is taken.
    pub fn column<I: LineIndex>(&self, index: I) -> Result<vec::IntoIter<TableCell>> {
        let c = resolve_index(index.column_index()?, self.ncols(), Axis::Column)?;
        let cells = (0..self.nrows())
            .map(|r| self.cell_at(r, c))
            .collect::<Result<Vec<_>>>()?;
        Ok(cells.into_iter())
    }

    /// Row element wrapper with its attributes and cells
    pub fn row_info<I: LineIndex>(&self, index: I) -> Result<TableRow> {
        let element = self.container.row_element(index.row_index()?)?;
        TableRow::from_element(element.clone())
    }

    /// Column definition wrapper
    pub fn column_info<I: LineIndex>(&self, index: I) -> Result<TableColumn> {
        let element = self.container.column_element(index.column_index()?)?;
        TableColumn::from_element(element.clone())
    }

    /// Copy the attributes of `info` onto the row at `index`; its cells are
    /// left alone
    pub fn set_row_info<I: LineIndex>(&mut self, index: I, info: &TableRow) -> Result<()> {
        let row = self.container.row_element_mut(index.row_index()?)?;
        copy_attributes(info.element(), row, attrs::ROWS_REPEATED);
        Ok(())
    }

    /// Copy the attributes of `info` onto the column definition at `index`
    pub fn set_column_info<I: LineIndex>(&mut self, index: I, info: &TableColumn) -> Result<()> {
        let column = self.container.column_element_mut(index.column_index()?)?;
        copy_attributes(info.element(), column, attrs::COLUMNS_REPEATED);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Direct children
    // ------------------------------------------------------------------

    /// Number of direct children of the table element
    pub fn child_count(&self) -> usize {
        self.container.element().child_count()
    }

    /// The `index`-th direct child of the table element, wrapped by kind.
    ///
    /// This addresses the element tree, not the grid: prelude blocks,
    /// column definitions and grouping containers all count.
    pub fn child(&self, index: isize) -> Result<TableNode> {
        let children = self.container.element().children();
        let i = resolve_index(index, children.len(), Axis::Child)?;
        Ok(TableNode::wrap(children[i].clone()))
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    pub fn append_rows(&mut self, count: usize) -> Result<()> {
        self.container.append_rows(count)?;
        self.cache.clear();
        Ok(())
    }

    /// Insert `count` empty rows before row `index`
    pub fn insert_rows(&mut self, index: isize, count: usize) -> Result<()> {
        self.container.insert_rows(index, count)?;
        self.cache.clear();
        Ok(())
    }

    /// Delete `count` rows from row `index`; at least one row must remain
    pub fn delete_rows(&mut self, index: isize, count: usize) -> Result<()> {
        self.container.delete_rows(index, count)?;
        self.cache.clear();
        Ok(())
    }

    pub fn append_columns(&mut self, count: usize) -> Result<()> {
        self.container.append_columns(count)?;
        self.cache.clear();
        Ok(())
    }

    /// Insert `count` empty columns before column `index`
    pub fn insert_columns(&mut self, index: isize, count: usize) -> Result<()> {
        self.container.insert_columns(index, count)?;
        self.cache.clear();
        Ok(())
    }

    /// Delete `count` columns from column `index`; at least one column must
    /// remain
    pub fn delete_columns(&mut self, index: isize, count: usize) -> Result<()> {
        self.container.delete_columns(index, count)?;
        self.cache.clear();
        Ok(())
    }

    /// Drop all rows and columns and rebuild at the given size
    pub fn clear(&mut self, nrows: usize, ncols: usize) -> Result<()> {
        self.container.reset(nrows, ncols)?;
        self.cache.clear();
        Ok(())
    }

    /// Merge and unmerge cells
    pub fn spans(&mut self) -> CellSpanController<'_> {
        CellSpanController::new(self)
    }

    /// Diagnostic check: container paths match the tree, the grid is
    /// rectangular and every cached wrapper equals its cell
    pub fn is_consistent(&self) -> bool {
        self.container.is_consistent()
            && self.cache.entries().into_iter().all(|((r, c), cell)| {
                self.container
                    .get_cell(r as isize, c as isize)
                    .is_ok_and(|el| el == cell.element())
            })
    }
}

impl FromStr for Table {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_xml(s)
    }
}

fn copy_attributes(from: &Element, to: &mut Element, skip: &str) {
    let keep: Vec<(String, String)> = from
        .attributes()
        .iter()
        .filter(|(name, _)| name.as_str() != skip)
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    to.attributes_mut().clear();
    to.attributes_mut().extend(keep);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odf::elements::table::ValueType;
    use crate::odf::elements::table_expansion::ExpandStrategy;

    const SIMPLE: &str = r#"<table:table table:name="Sheet1" table:style-name="ta1">
        <table:table-column table:style-name="co1" table:number-columns-repeated="3"/>
        <table:table-row table:style-name="ro1">
            <table:table-cell office:value-type="string"><text:p>a</text:p></table:table-cell>
            <table:table-cell office:value-type="float" office:value="2"><text:p>2</text:p></table:table-cell>
            <table:table-cell/>
        </table:table-row>
        <table:table-row table:number-rows-repeated="2">
            <table:table-cell table:number-columns-repeated="3"/>
        </table:table-row>
    </table:table>"#;

    fn text(table: &Table, pos: (i32, i32)) -> String {
        table.get_cell(pos).unwrap().plain_text()
    }

    #[test]
    fn test_load_and_read() {
        let table = Table::from_xml(SIMPLE).unwrap();
        assert_eq!(table.name(), Some("Sheet1"));
        assert_eq!(table.style_name(), Some("ta1"));
        assert_eq!(table.size(), (3, 3));
        assert_eq!(table.get_cell("A1").unwrap().value(), CellValue::String("a".into()));
        assert_eq!(table.get_cell((0, 1)).unwrap().value_type(), Some(ValueType::Float));
        assert!(table.get_cell_by_index(2, 2).unwrap().is_empty());
        assert!(table.is_consistent());
    }

    #[test]
    fn test_address_and_index_agree() {
        let table = Table::from_xml(SIMPLE).unwrap();
        assert_eq!(
            table.get_cell_by_address("b1").unwrap(),
            table.get_cell_by_index(0, 1).unwrap()
        );
        assert_eq!(
            table.get_cell(CellCoord::new(0, 1)).unwrap(),
            table.get_cell((0usize, 1usize)).unwrap()
        );
    }

    #[test]
    fn test_header_rows_load_as_seven_by_seven() {
        let table = Table::from_xml(
            r#"<table:table table:name="H">
                <table:table-column table:number-columns-repeated="7"/>
                <table:table-header-rows>
                    <table:table-row table:number-rows-repeated="6">
                        <table:table-cell office:value-type="string" table:number-columns-repeated="7">
                            <text:p>h</text:p>
                        </table:table-cell>
                    </table:table-row>
                </table:table-header-rows>
                <table:table-row><table:table-cell table:number-columns-repeated="7"/></table:table-row>
            </table:table>"#,
        )
        .unwrap();
        assert_eq!(table.size(), (7, 7));
        assert_eq!(table.get_cell("G6").unwrap().plain_text(), "h");
        assert!(table.get_cell("G7").unwrap().is_empty());
        assert!(table.is_consistent());
    }

    #[test]
    fn test_load_with_capped_expansion() {
        let xml = r#"<table:table>
            <table:table-row>
                <table:table-cell/>
                <table:table-cell table:number-columns-repeated="16384"/>
            </table:table-row>
            <table:table-row table:number-rows-repeated="1048575">
                <table:table-cell table:number-columns-repeated="16385"/>
            </table:table-row>
        </table:table>"#;
        let options = TableOptions::new().with_expand_strategy(ExpandStrategy::AllLessMaxCount {
            max_rows: 1000,
            max_cols: 1000,
        });
        let table = Table::from_element_with_options(Element::parse(xml).unwrap(), options).unwrap();
        assert_eq!(table.size(), (2, 2));
    }

    #[test]
    fn test_rejects_non_table_root() {
        let err = Table::from_xml("<table:table-row/>").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_new_rejects_empty_size() {
        assert!(matches!(Table::new("x", 0, 3), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_negative_indexing() {
        let mut table = Table::new("T", 10, 4).unwrap();
        table.set_cell_value((9, 0), "bottom").unwrap();
        assert_eq!(table.get_cell((-1, 0)).unwrap(), table.get_cell((9, 0)).unwrap());
        assert_eq!(text(&table, (-1, -4)), "bottom");
        assert!(matches!(
            table.get_cell((-11, 0)),
            Err(Error::OutOfBounds { axis: Axis::Row, index: -11, len: 10 })
        ));
    }

    #[test]
    fn test_bad_address() {
        let table = Table::new("T", 2, 2).unwrap();
        assert!(matches!(table.get_cell("1A"), Err(Error::InvalidAddress(_))));
        assert!(matches!(table.get_cell("C1"), Err(Error::OutOfBounds { .. })));
    }

    #[test]
    fn test_write_through() {
        let mut table = Table::new("T", 2, 2).unwrap();
        // Populate the cache, then write
        assert!(table.get_cell("A1").unwrap().is_empty());
        table.set_cell("A1", TableCell::with_value(true)).unwrap();
        assert_eq!(table.get_cell((0, 0)).unwrap().value(), CellValue::Boolean(true));
        assert!(table.to_xml_string().contains(r#"office:boolean-value="true""#));

        table
            .update_cell((0, 0), |cell| cell.set_formula("of:=TRUE()"))
            .unwrap();
        assert_eq!(table.get_cell("A1").unwrap().formula(), Some("of:=TRUE()"));
        assert!(table.is_consistent());
    }

    #[test]
    fn test_checkmark_scenario() {
        let mut table = Table::new("Checks", 10, 10).unwrap();
        for i in 0..10 {
            table.set_cell_value((i, i), "✓").unwrap();
        }
        table.insert_rows(5, 1).unwrap();
        table.insert_columns(5, 1).unwrap();
        assert_eq!(table.size(), (11, 11));

        for r in 0..11 {
            for c in 0..11 {
                let expected = (r < 5 && r == c) || (r > 5 && c > 5 && r == c);
                assert_eq!(text(&table, (r, c)) == "✓", expected, "cell ({r}, {c})");
            }
        }
        assert!(table.row(5).unwrap().all(|cell| cell.is_empty()));
        assert!(table.column(5).unwrap().all(|cell| cell.is_empty()));
        assert!(table.is_consistent());
    }

    #[test]
    fn test_structural_edits_clear_cache() {
        let mut table = Table::new("T", 3, 3).unwrap();
        table.set_cell_value((2, 2), 1.0).unwrap();
        assert_eq!(table.get_cell((2, 2)).unwrap().value(), CellValue::Float(1.0));
        assert_eq!(table.cache.get((2, 2)).map(|c| c.value()), Some(CellValue::Float(1.0)));

        table.delete_rows(0, 1).unwrap();
        assert!(table.cache.is_empty());
        assert!(table.get_cell((2, 2)).is_err());
        assert_eq!(table.get_cell((1, 2)).unwrap().value(), CellValue::Float(1.0));

        table.delete_columns(0, 2).unwrap();
        assert_eq!(table.get_cell((1, 0)).unwrap().value(), CellValue::Float(1.0));

        table.append_rows(2).unwrap();
        table.append_columns(3).unwrap();
        assert_eq!(table.size(), (4, 4));
        assert!(table.is_consistent());
    }

    #[test]
    fn test_row_and_column_iterators() {
        let table = Table::from_xml(SIMPLE).unwrap();
        let first: Vec<_> = table.row(0).unwrap().map(|c| c.plain_text()).collect();
        assert_eq!(first, vec!["a", "2", ""]);
        assert_eq!(table.row("C1").unwrap().count(), 3);
        assert_eq!(table.column("B7").unwrap().count(), 3);
        assert_eq!(table.column(-2).unwrap().next().unwrap().plain_text(), "2");
        assert!(table.row(3).is_err());
    }

    #[test]
    fn test_row_and_column_info() {
        let mut table = Table::from_xml(SIMPLE).unwrap();
        assert_eq!(table.row_info(0).unwrap().style_name(), Some("ro1"));
        assert_eq!(table.column_info(2).unwrap().style_name(), Some("co1"));

        let mut info = table.row_info(1).unwrap();
        info.set_style_name("ro2");
        table.set_row_info(1, &info).unwrap();
        assert_eq!(table.row_info(1).unwrap().style_name(), Some("ro2"));
        assert_eq!(table.row_info(1).unwrap().cell_count(), 3);

        let mut col = table.column_info(0).unwrap();
        col.set_default_cell_style_name("ce1");
        table.set_column_info(0, &col).unwrap();
        assert_eq!(table.column_info(0).unwrap().default_cell_style_name(), Some("ce1"));
    }

    #[test]
    fn test_child_access() {
        let table = Table::from_xml(SIMPLE).unwrap();
        // Three column definitions, then three rows
        assert_eq!(table.child_count(), 6);
        assert!(matches!(table.child(0).unwrap(), TableNode::Column(_)));
        assert!(matches!(table.child(-1).unwrap(), TableNode::Row(_)));
        assert!(matches!(
            table.child(6),
            Err(Error::OutOfBounds { axis: Axis::Child, .. })
        ));
    }

    #[test]
    fn test_clear() {
        let mut table = Table::from_xml(SIMPLE).unwrap();
        table.clear(2, 5).unwrap();
        assert_eq!(table.size(), (2, 5));
        assert!(table.values().unwrap().iter().flatten().all(|v| *v == CellValue::Empty));
        assert_eq!(table.name(), Some("Sheet1"));
        assert!(table.clear(0, 1).is_err());
    }

    #[test]
    fn test_round_trip_through_xml() {
        let mut table = Table::new("T", 2, 2).unwrap();
        table.set_cell_value("B2", CellValue::Percentage(0.5)).unwrap();
        let xml = table.to_xml_string();
        let reloaded: Table = xml.parse().unwrap();
        assert_eq!(reloaded.values().unwrap(), table.values().unwrap());
        assert_eq!(reloaded.element(), table.element());
    }

    #[test]
    fn test_mixed_paragraph_content_survives() {
        let mut table = Table::from_xml(
            r#"<table:table table:name="T">
                <table:table-column table:number-columns-repeated="2"/>
                <table:table-row>
                    <table:table-cell office:value-type="string">
                        <text:p>Hello <text:span>big</text:span> world</text:p>
                    </table:table-cell>
                    <table:table-cell office:value-type="string">
                        <text:p><text:span>a</text:span> <text:span>b</text:span></text:p>
                    </table:table-cell>
                </table:table-row>
            </table:table>"#,
        )
        .unwrap();
        assert_eq!(table.get_cell("A1").unwrap().plain_text(), "Hello big world");
        assert_eq!(table.get_cell("B1").unwrap().plain_text(), "a b");

        // Editing another cell leaves the mixed paragraphs in place
        table.insert_rows(0, 1).unwrap();
        let xml = table.to_xml_string();
        assert!(xml.contains("<text:p>Hello <text:span>big</text:span> world</text:p>"));
        assert!(xml.contains("<text:p><text:span>a</text:span> <text:span>b</text:span></text:p>"));

        let reloaded = Table::from_xml(&xml).unwrap();
        assert_eq!(reloaded.element(), table.element());
        assert_eq!(reloaded.get_cell("A2").unwrap().plain_text(), "Hello big world");
    }
}
