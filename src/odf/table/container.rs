//! Expanded rows and column definitions of a table, with positional
//! insert, append and delete.
//!
//! The container owns the table element. Rows and column definitions are
//! located by [`NodePath`]s into that tree; the path lists are rebuilt
//! after every structural edit, so they always follow document order
//! across grouping containers.

use super::structure::StructureOrganizer;
use crate::common::{Axis, Error, Result};
use crate::odf::elements::element::{Element, ElementBase, NodePath};
use crate::odf::elements::table::TableRow;
use crate::odf::elements::tag_matcher::{TableTag, names};
use log::debug;
use std::iter;

/// Resolve a possibly negative index against `len`.
pub(crate) fn resolve_index(index: isize, len: usize, axis: Axis) -> Result<usize> {
    let resolved = if index < 0 {
        len.checked_sub(index.unsigned_abs())
    } else {
        Some(index as usize).filter(|&i| i < len)
    };
    resolved.ok_or(Error::OutOfBounds { axis, index, len })
}

/// Paths of every `table:table-row` under `table`, in document order
pub(crate) fn scan_rows(table: &Element) -> Vec<NodePath> {
    let mut paths = Vec::new();
    scan(table, &mut NodePath::new(), TableTag::Row, TableTag::is_row_container, &mut paths);
    paths
}

/// Paths of every `table:table-column` under `table`, in document order
pub(crate) fn scan_columns(table: &Element) -> Vec<NodePath> {
    let mut paths = Vec::new();
    scan(
        table,
        &mut NodePath::new(),
        TableTag::Column,
        TableTag::is_column_container,
        &mut paths,
    );
    paths
}

fn scan(
    parent: &Element,
    prefix: &mut NodePath,
    target: TableTag,
    is_container: fn(TableTag) -> bool,
    out: &mut Vec<NodePath>,
) {
    for (i, child) in parent.children().iter().enumerate() {
        let tag = child.tag();
        if tag == target {
            let mut path = prefix.clone();
            path.push(i);
            out.push(path);
        } else if is_container(tag) {
            prefix.push(i);
            scan(child, prefix, target, is_container, out);
            prefix.pop();
        }
    }
}

/// Remove grouping containers left without children, innermost first.
fn prune_empty(parent: &mut Element, is_container: fn(TableTag) -> bool) -> usize {
    let mut removed = 0;
    for child in parent.children_mut().iter_mut() {
        if is_container(child.tag()) {
            removed += prune_empty(child, is_container);
        }
    }
    let before = parent.child_count();
    parent
        .children_mut()
        .retain(|c| !(is_container(c.tag()) && c.child_count() == 0));
    removed + before - parent.child_count()
}

fn empty_cells(count: usize) -> impl Iterator<Item = Element> {
    iter::repeat_with(|| Element::new(names::CELL)).take(count)
}

fn stale(axis: Axis) -> Error {
    Error::Structure(format!("{} path no longer matches the tree", axis))
}

/// Rows and column definitions of one table
#[derive(Debug, Clone)]
pub struct RowColumnContainer {
    table: Element,
    rows: Vec<NodePath>,
    columns: Vec<NodePath>,
    organizer: StructureOrganizer,
}

impl RowColumnContainer {
    /// Wrap an already expanded and normalized table element
    pub fn new(table: Element, organizer: StructureOrganizer) -> Self {
        let mut container = Self {
            table,
            rows: Vec::new(),
            columns: Vec::new(),
            organizer,
        };
        container.rescan();
        container
    }

    pub fn element(&self) -> &Element {
        &self.table
    }

    pub fn into_element(self) -> Element {
        self.table
    }

    pub fn organizer(&self) -> &StructureOrganizer {
        &self.organizer
    }

    /// Mutable access to attributes and non-structural children.
    ///
    /// Callers that add or remove rows or columns must call
    /// [`rescan`](Self::rescan) afterwards.
    pub(crate) fn element_mut(&mut self) -> &mut Element {
        &mut self.table
    }

    /// Rebuild the row and column path lists from the tree
    pub fn rescan(&mut self) {
        self.rows = scan_rows(&self.table);
        self.columns = scan_columns(&self.table);
    }

    /// Number of rows
    #[inline]
    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    /// Width of the first row, 0 when there are no rows
    pub fn ncols(&self) -> usize {
        self.rows
            .first()
            .and_then(|path| self.table.node_at(path))
            .map_or(0, Element::child_count)
    }

    /// Number of column definitions
    #[inline]
    pub fn column_definitions(&self) -> usize {
        self.columns.len()
    }

    /// Discard every row, row group and column definition, then build
    /// `nrows` x `ncols` empty cells at the start of the data area.
    pub fn reset(&mut self, nrows: usize, ncols: usize) -> Result<()> {
        if nrows < 1 || ncols < 1 {
            return Err(Error::invalid_argument(format!(
                "table size must be at least 1x1, got {}x{}",
                nrows, ncols
            )));
        }

        self.table.children_mut().retain(|c| {
            let tag = c.tag();
            !(matches!(tag, TableTag::Row | TableTag::Column)
                || tag.is_row_container()
                || tag.is_column_container())
        });

        let at = self.organizer.data_start(&self.table);
        let columns = iter::repeat_with(|| Element::new(names::COLUMN)).take(ncols);
        let rows = iter::repeat_with(|| TableRow::with_cells(ncols).into_element()).take(nrows);
        self.table.insert_children(at, columns.chain(rows));
        self.rescan();
        debug!("reset table to {}x{}", nrows, ncols);
        Ok(())
    }

    /// Resolve a signed position to grid indices
    pub fn resolve(&self, row: isize, col: isize) -> Result<(usize, usize)> {
        Ok((
            resolve_index(row, self.nrows(), Axis::Row)?,
            resolve_index(col, self.ncols(), Axis::Column)?,
        ))
    }

    /// The row element at `index`
    pub fn row_element(&self, index: isize) -> Result<&Element> {
        let r = resolve_index(index, self.nrows(), Axis::Row)?;
        self.table
            .node_at(&self.rows[r])
            .ok_or_else(|| stale(Axis::Row))
    }

    /// The column definition at `index`
    pub fn column_element(&self, index: isize) -> Result<&Element> {
        let c = resolve_index(index, self.columns.len(), Axis::Column)?;
        self.table
            .node_at(&self.columns[c])
            .ok_or_else(|| stale(Axis::Column))
    }

    pub(crate) fn row_element_mut(&mut self, index: isize) -> Result<&mut Element> {
        let r = resolve_index(index, self.nrows(), Axis::Row)?;
        self.table
            .node_at_mut(&self.rows[r])
            .ok_or_else(|| stale(Axis::Row))
    }

    pub(crate) fn column_element_mut(&mut self, index: isize) -> Result<&mut Element> {
        let c = resolve_index(index, self.columns.len(), Axis::Column)?;
        self.table
            .node_at_mut(&self.columns[c])
            .ok_or_else(|| stale(Axis::Column))
    }

    /// The cell element at a signed position
    pub fn get_cell(&self, row: isize, col: isize) -> Result<&Element> {
        let (r, c) = self.resolve(row, col)?;
        self.table
            .node_at(&self.rows[r])
            .and_then(|row| row.children().get(c))
            .ok_or_else(|| stale(Axis::Row))
    }

    /// Replace the cell at a signed position; `cell` must be a table cell
    /// or covered table cell.
    pub fn set_cell(&mut self, row: isize, col: isize, cell: Element) -> Result<()> {
        if !cell.tag().is_cell() {
            return Err(Error::invalid_argument(format!(
                "<{}> cannot be stored as a cell",
                cell.tag_name()
            )));
        }
        let (r, c) = self.resolve(row, col)?;
        let row = self
            .table
            .node_at_mut(&self.rows[r])
            .ok_or_else(|| stale(Axis::Row))?;
        let slot = row.children_mut().get_mut(c).ok_or_else(|| stale(Axis::Column))?;
        *slot = cell;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Rows
    // ------------------------------------------------------------------

    /// Append `count` empty rows after the last one
    pub fn append_rows(&mut self, count: usize) -> Result<()> {
        check_count(count)?;
        let width = self.new_row_width();
        let (parent, at) = match self.rows.last() {
            Some(last) => split_path(last, 1),
            // No rows yet: the data area ends where the epilogue starts
            None => (NodePath::new(), self.organizer.data_end(&self.table)),
        };
        self.insert_row_elements(&parent, at, count, width)?;
        debug!("appended {} rows, now {}", count, self.nrows());
        Ok(())
    }

    /// Insert `count` empty rows before the row at `index`
    pub fn insert_rows(&mut self, index: isize, count: usize) -> Result<()> {
        check_count(count)?;
        let r = resolve_index(index, self.nrows(), Axis::Row)?;
        let width = self.new_row_width();
        let (parent, at) = split_path(&self.rows[r], 0);
        self.insert_row_elements(&parent, at, count, width)?;
        debug!("inserted {} rows at {}, now {}", count, r, self.nrows());
        Ok(())
    }

    /// Delete `count` rows starting at `index`.
    ///
    /// At least one row must remain. Grouping containers emptied by the
    /// deletion are removed.
    pub fn delete_rows(&mut self, index: isize, count: usize) -> Result<()> {
        check_count(count)?;
        let nrows = self.nrows();
        let r = resolve_index(index, nrows, Axis::Row)?;
        check_span(r, count, nrows, Axis::Row)?;
        if count == nrows {
            return Err(Error::invalid_argument("cannot delete every row of a table"));
        }

        // Back to front keeps the remaining paths valid
        for path in self.rows[r..r + count].iter().rev() {
            let (parent, at) = split_path(path, 0);
            let parent = self
                .table
                .node_at_mut(&parent)
                .ok_or_else(|| stale(Axis::Row))?;
            parent.remove_child(at);
        }
        prune_empty(&mut self.table, TableTag::is_row_container);
        self.rescan();
        debug!("deleted {} rows at {}, now {}", count, r, self.nrows());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Columns
    // ------------------------------------------------------------------

    /// Append `count` empty cells to every row, and as many column
    /// definitions when the table has any
    pub fn append_columns(&mut self, count: usize) -> Result<()> {
        check_count(count)?;
        for path in &self.rows {
            let row = self
                .table
                .node_at_mut(path)
                .ok_or_else(|| stale(Axis::Row))?;
            row.children_mut().extend(empty_cells(count));
        }
        if let Some(last) = self.columns.last() {
            let (parent, at) = split_path(last, 1);
            insert_columns_at(&mut self.table, &parent, at, count)?;
        }
        self.rescan();
        debug!("appended {} columns, now {}", count, self.ncols());
        Ok(())
    }

    /// Insert `count` empty cells before column `index` in every row
    pub fn insert_columns(&mut self, index: isize, count: usize) -> Result<()> {
        check_count(count)?;
        let c = resolve_index(index, self.ncols(), Axis::Column)?;
        for path in &self.rows {
            let row = self
                .table
                .node_at_mut(path)
                .ok_or_else(|| stale(Axis::Row))?;
            row.insert_children(c, empty_cells(count));
        }

        let anchor = match self.columns.get(c) {
            Some(path) => Some(split_path(path, 0)),
            None => self.columns.last().map(|path| split_path(path, 1)),
        };
        if let Some((parent, at)) = anchor {
            insert_columns_at(&mut self.table, &parent, at, count)?;
        }
        self.rescan();
        debug!("inserted {} columns at {}, now {}", count, c, self.ncols());
        Ok(())
    }

    /// Delete `count` columns starting at `index`.
    ///
    /// At least one column must remain. Column definitions at the deleted
    /// positions go too.
    pub fn delete_columns(&mut self, index: isize, count: usize) -> Result<()> {
        check_count(count)?;
        let ncols = self.ncols();
        let c = resolve_index(index, ncols, Axis::Column)?;
        check_span(c, count, ncols, Axis::Column)?;
        if count == ncols {
            return Err(Error::invalid_argument("cannot delete every column of a table"));
        }

        for path in &self.rows {
            let row = self
                .table
                .node_at_mut(path)
                .ok_or_else(|| stale(Axis::Row))?;
            let end = (c + count).min(row.child_count());
            if c < end {
                row.children_mut().drain(c..end);
            }
        }

        let defined = self.columns.len();
        if c < defined {
            for path in self.columns[c..(c + count).min(defined)].iter().rev() {
                let (parent, at) = split_path(path, 0);
                let parent = self
                    .table
                    .node_at_mut(&parent)
                    .ok_or_else(|| stale(Axis::Column))?;
                parent.remove_child(at);
            }
            prune_empty(&mut self.table, TableTag::is_column_container);
        }
        self.rescan();
        debug!("deleted {} columns at {}, now {}", count, c, self.ncols());
        Ok(())
    }

    /// Compare the path lists with a fresh scan and check rectangularity
    pub fn is_consistent(&self) -> bool {
        if self.rows != scan_rows(&self.table) || self.columns != scan_columns(&self.table) {
            return false;
        }
        let ncols = self.ncols();
        self.rows.iter().all(|path| {
            self.table.node_at(path).is_some_and(|row| {
                row.child_count() == ncols && row.children().iter().all(|c| c.tag().is_cell())
            })
        })
    }

    fn new_row_width(&self) -> usize {
        if self.rows.is_empty() {
            self.columns.len()
        } else {
            self.ncols()
        }
    }

    fn insert_row_elements(
        &mut self,
        parent: &[usize],
        at: usize,
        count: usize,
        width: usize,
    ) -> Result<()> {
        let parent = self
            .table
            .node_at_mut(parent)
            .ok_or_else(|| stale(Axis::Row))?;
        let rows = iter::repeat_with(|| TableRow::with_cells(width).into_element()).take(count);
        parent.insert_children(at, rows);
        self.rescan();
        Ok(())
    }
}

fn check_count(count: usize) -> Result<()> {
    if count < 1 {
        return Err(Error::invalid_argument("count must be at least 1"));
    }
    Ok(())
}

fn check_span(start: usize, count: usize, len: usize, axis: Axis) -> Result<()> {
    let last = start.saturating_add(count - 1);
    if last >= len {
        return Err(Error::OutOfBounds {
            axis,
            index: isize::try_from(last).unwrap_or(isize::MAX),
            len,
        });
    }
    Ok(())
}

/// Split a node path into its parent path and the child index plus `offset`
fn split_path(path: &[usize], offset: usize) -> (NodePath, usize) {
    match path.split_last() {
        Some((&last, parent)) => (NodePath::from_slice(parent), last + offset),
        None => (NodePath::new(), offset),
    }
}

fn insert_columns_at(table: &mut Element, parent: &[usize], at: usize, count: usize) -> Result<()> {
    let parent = table
        .node_at_mut(parent)
        .ok_or_else(|| stale(Axis::Column))?;
    parent.insert_children(
        at,
        iter::repeat_with(|| Element::new(names::COLUMN)).take(count),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(nrows: usize, ncols: usize) -> RowColumnContainer {
        let mut c = RowColumnContainer::new(Element::new(names::TABLE), StructureOrganizer::table());
        c.reset(nrows, ncols).unwrap();
        c
    }

    fn mark(c: &mut RowColumnContainer, row: isize, col: isize, text: &str) {
        let cell = Element::new(names::CELL).with_attribute("test:mark", text);
        c.set_cell(row, col, cell).unwrap();
    }

    fn marked(c: &RowColumnContainer, row: isize, col: isize) -> Option<String> {
        c.get_cell(row, col)
            .unwrap()
            .get_attribute("test:mark")
            .map(str::to_string)
    }

    #[test]
    fn test_resolve_index() {
        assert_eq!(resolve_index(0, 3, Axis::Row).unwrap(), 0);
        assert_eq!(resolve_index(-1, 3, Axis::Row).unwrap(), 2);
        assert_eq!(resolve_index(-3, 3, Axis::Row).unwrap(), 0);
        assert!(matches!(
            resolve_index(-4, 3, Axis::Row),
            Err(Error::OutOfBounds { index: -4, len: 3, .. })
        ));
        assert!(resolve_index(3, 3, Axis::Column).is_err());
        assert!(resolve_index(0, 0, Axis::Column).is_err());
    }

    #[test]
    fn test_reset() {
        let c = container(3, 4);
        assert_eq!(c.nrows(), 3);
        assert_eq!(c.ncols(), 4);
        assert_eq!(c.column_definitions(), 4);
        assert!(c.is_consistent());

        let mut c = container(1, 1);
        assert!(matches!(c.reset(0, 3), Err(Error::InvalidArgument(_))));
        assert!(matches!(c.reset(3, 0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_reset_keeps_prelude_and_epilogue() {
        let table = Element::new(names::TABLE)
            .with_child(Element::new("table:title"))
            .with_child(Element::new(names::ROW))
            .with_child(Element::new("table:named-expressions"));
        let mut c = RowColumnContainer::new(table, StructureOrganizer::table());
        c.reset(2, 2).unwrap();

        let tags: Vec<_> = c.element().children().iter().map(|e| e.tag_name()).collect();
        assert_eq!(
            tags,
            vec![
                "table:title",
                names::COLUMN,
                names::COLUMN,
                names::ROW,
                names::ROW,
                "table:named-expressions",
            ]
        );
    }

    #[test]
    fn test_negative_cell_access() {
        let mut c = container(10, 3);
        mark(&mut c, 9, 0, "last");
        assert_eq!(marked(&c, -1, 0).as_deref(), Some("last"));
        assert!(matches!(
            c.get_cell(10, 0),
            Err(Error::OutOfBounds { axis: Axis::Row, .. })
        ));
        assert!(matches!(
            c.get_cell(0, -4),
            Err(Error::OutOfBounds { axis: Axis::Column, .. })
        ));
    }

    #[test]
    fn test_set_cell_rejects_non_cells() {
        let mut c = container(2, 2);
        let err = c.set_cell(0, 0, Element::new(names::ROW)).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        c.set_cell(0, 0, Element::new(names::COVERED_CELL)).unwrap();
    }

    #[test]
    fn test_insert_then_delete_rows_restores() {
        let mut c = container(10, 2);
        for r in 0..10 {
            mark(&mut c, r, 0, &r.to_string());
        }
        let before = c.element().clone();

        c.insert_rows(5, 2).unwrap();
        assert_eq!(c.nrows(), 12);
        assert_eq!(marked(&c, 4, 0).as_deref(), Some("4"));
        assert_eq!(marked(&c, 5, 0), None);
        assert_eq!(marked(&c, 7, 0).as_deref(), Some("5"));

        c.delete_rows(5, 2).unwrap();
        assert_eq!(c.element(), &before);
        assert!(c.is_consistent());
    }

    #[test]
    fn test_negative_insert_resolves_before_growth() {
        let mut c = container(4, 1);
        mark(&mut c, 3, 0, "tail");
        c.insert_rows(-1, 2).unwrap();
        assert_eq!(c.nrows(), 6);
        assert_eq!(marked(&c, 5, 0).as_deref(), Some("tail"));
    }

    #[test]
    fn test_row_count_and_bounds_errors() {
        let mut c = container(3, 1);
        assert!(matches!(c.append_rows(0), Err(Error::InvalidArgument(_))));
        assert!(matches!(c.insert_rows(0, 0), Err(Error::InvalidArgument(_))));
        assert!(matches!(c.delete_rows(1, 3), Err(Error::OutOfBounds { .. })));
        assert!(matches!(c.delete_rows(0, 3), Err(Error::InvalidArgument(_))));
        assert!(matches!(c.insert_rows(3, 1), Err(Error::OutOfBounds { .. })));
        assert_eq!(c.nrows(), 3);
    }

    #[test]
    fn test_rows_inside_groups() {
        let table = Element::parse(
            r#"<table:table>
                <table:table-column/><table:table-column/>
                <table:table-header-rows>
                    <table:table-row><table:table-cell/><table:table-cell/></table:table-row>
                </table:table-header-rows>
                <table:table-row-group>
                    <table:table-row><table:table-cell/><table:table-cell/></table:table-row>
                    <table:table-row><table:table-cell/><table:table-cell/></table:table-row>
                </table:table-row-group>
                <table:table-row><table:table-cell/><table:table-cell/></table:table-row>
            </table:table>"#,
        )
        .unwrap();
        let mut c = RowColumnContainer::new(table, StructureOrganizer::table());
        assert_eq!(c.nrows(), 4);

        // Inserting before a grouped row lands inside the group
        c.insert_rows(1, 1).unwrap();
        assert_eq!(c.element().children()[3].child_count(), 3);

        // Deleting the whole group removes the container
        c.delete_rows(1, 3).unwrap();
        assert_eq!(c.nrows(), 2);
        assert!(
            c.element()
                .children()
                .iter()
                .all(|e| e.tag() != TableTag::RowGroup)
        );
        assert!(c.is_consistent());
    }

    #[test]
    fn test_append_rows_to_empty_table() {
        let table = Element::new(names::TABLE)
            .with_child(Element::new("table:title"))
            .with_child(Element::new(names::COLUMN))
            .with_child(Element::new(names::COLUMN))
            .with_child(Element::new("table:named-expressions"));
        let mut c = RowColumnContainer::new(table, StructureOrganizer::table());
        assert_eq!(c.nrows(), 0);
        assert_eq!(c.ncols(), 0);

        c.append_rows(2).unwrap();
        assert_eq!(c.nrows(), 2);
        assert_eq!(c.ncols(), 2);
        assert_eq!(c.element().children()[3].tag(), TableTag::Row);
        assert_eq!(c.element().children()[5].tag_name(), "table:named-expressions");
    }

    #[test]
    fn test_columns_follow_rows() {
        let mut c = container(3, 3);
        mark(&mut c, 0, 2, "c");

        c.insert_columns(1, 2).unwrap();
        assert_eq!(c.ncols(), 5);
        assert_eq!(c.column_definitions(), 5);
        assert_eq!(marked(&c, 0, 4).as_deref(), Some("c"));

        c.append_columns(1).unwrap();
        assert_eq!(c.ncols(), 6);
        assert_eq!(c.column_definitions(), 6);

        c.delete_columns(-2, 2).unwrap();
        assert_eq!(c.ncols(), 4);
        assert_eq!(c.column_definitions(), 4);
        assert!(matches!(c.delete_columns(0, 4), Err(Error::InvalidArgument(_))));
        assert!(matches!(c.delete_columns(3, 2), Err(Error::OutOfBounds { .. })));
        assert!(c.is_consistent());
    }

    #[test]
    fn test_row_and_column_elements() {
        let mut c = container(2, 2);
        assert_eq!(c.row_element(-1).unwrap().tag(), TableTag::Row);
        assert_eq!(c.column_element(1).unwrap().tag(), TableTag::Column);
        assert!(c.column_element(2).is_err());

        c.element_mut().add_child(Element::new(names::ROW));
        assert!(!c.is_consistent());
        c.rescan();
        assert!(!c.is_consistent(), "zero-width row breaks rectangularity");
    }
}
