//! Table expansion utilities for handling repeated cells and rows.
//!
//! ODF files can have cells, rows and column definitions marked as
//! "repeated" for efficiency. This module expands these repeated elements
//! in place into their full representation, so every logical row, column
//! and cell is backed by its own element.

use super::element::{Element, ElementBase};
use super::table::{TableCell, TableColumn, TableRow, attrs, repeat_count};
use super::tag_matcher::TableTag;
use crate::common::Result;
use log::debug;
use std::iter;

/// How repetition runs are materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpandStrategy {
    /// Expand every run.
    #[default]
    All,
    /// Runs whose count reaches the limit collapse to a single element.
    ///
    /// Office suites pad sheets with trailing runs of a million rows or a
    /// thousand cells; this keeps those from being materialized.
    AllLessMaxCount { max_rows: usize, max_cols: usize },
    /// The last row of the table, the last cell of every row and the last
    /// column definition collapse to a single element; everything else is
    /// expanded.
    AllButLast,
}

/// Number of elements created by an expansion pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpansionStats {
    pub rows: usize,
    pub columns: usize,
    pub cells: usize,
}

impl ExpansionStats {
    /// Whether the pass created no element at all
    pub fn is_empty(&self) -> bool {
        self.rows == 0 && self.columns == 0 && self.cells == 0
    }
}

/// Which kind of run a count belongs to
#[derive(Clone, Copy)]
enum RunKind {
    Row,
    Column,
    Cell,
}

/// Utilities for expanding repeated table elements
#[derive(Debug, Clone, Copy, Default)]
pub struct TableExpander {
    strategy: ExpandStrategy,
}

impl TableExpander {
    pub fn new(strategy: ExpandStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> ExpandStrategy {
        self.strategy
    }

    /// Expand a table element in place by resolving all repeated cells,
    /// rows and column definitions.
    ///
    /// Every repeat attribute is validated before anything is modified, so
    /// a malformed count leaves the table untouched. Running the expander
    /// on already expanded input does nothing.
    ///
    /// # Example
    ///
    /// ```
    /// use litchi_table::odf::elements::element::Element;
    /// use litchi_table::odf::elements::table_expansion::{ExpandStrategy, TableExpander};
    ///
    /// let mut table = Element::parse(
    ///     r#"<table:table><table:table-row table:number-rows-repeated="3">
    ///        <table:table-cell table:number-columns-repeated="2"/>
    ///        </table:table-row></table:table>"#,
    /// ).unwrap();
    ///
    /// TableExpander::new(ExpandStrategy::All).expand(&mut table).unwrap();
    /// assert_eq!(table.child_count(), 3);
    /// assert_eq!(table.children()[2].child_count(), 2);
    /// ```
    pub fn expand(&self, table: &mut Element) -> Result<ExpansionStats> {
        let (row_templates, column_templates) = Self::validate(table)?;

        let mut stats = ExpansionStats::default();
        let mut rows_seen = 0;
        let mut columns_seen = 0;
        self.expand_children(
            table,
            (row_templates, &mut rows_seen),
            (column_templates, &mut columns_seen),
            &mut stats,
        );

        if !stats.is_empty() {
            debug!(
                "expanded repetitions: {} rows, {} column definitions, {} cells materialized",
                stats.rows, stats.columns, stats.cells
            );
        }
        Ok(stats)
    }

    /// Check every repeat count; returns the number of row and column
    /// templates in document order.
    fn validate(parent: &Element) -> Result<(usize, usize)> {
        let mut rows = 0;
        let mut columns = 0;
        for child in parent.children() {
            match child.tag() {
                TableTag::Row => {
                    repeat_count(child, attrs::ROWS_REPEATED)?;
                    for cell in child.children().iter().filter(|c| c.tag().is_cell()) {
                        repeat_count(cell, attrs::COLUMNS_REPEATED)?;
                    }
                    rows += 1;
                },
                TableTag::Column => {
                    repeat_count(child, attrs::COLUMNS_REPEATED)?;
                    columns += 1;
                },
                tag if tag.is_row_container() || tag.is_column_container() => {
                    let (r, c) = Self::validate(child)?;
                    rows += r;
                    columns += c;
                },
                _ => {},
            }
        }
        Ok((rows, columns))
    }

    fn effective_count(&self, kind: RunKind, count: usize, is_last: bool) -> usize {
        match self.strategy {
            ExpandStrategy::All => count,
            ExpandStrategy::AllLessMaxCount { max_rows, max_cols } => {
                let limit = match kind {
                    RunKind::Row => max_rows,
                    RunKind::Column | RunKind::Cell => max_cols,
                };
                if count >= limit { 1 } else { count }
            },
            ExpandStrategy::AllButLast => {
                if is_last {
                    1
                } else {
                    count
                }
            },
        }
    }

    fn expand_children(
        &self,
        parent: &mut Element,
        (row_total, rows_seen): (usize, &mut usize),
        (column_total, columns_seen): (usize, &mut usize),
        stats: &mut ExpansionStats,
    ) {
        let mut i = 0;
        while i < parent.child_count() {
            let tag = parent.children()[i].tag();
            let copies = match tag {
                TableTag::Row => {
                    *rows_seen += 1;
                    let is_last = *rows_seen == row_total;
                    let row = &mut parent.children_mut()[i];
                    self.expand_cells(row, stats);
                    let count = self.take_count(row, RunKind::Row, is_last);
                    stats.rows += count - 1;
                    count
                },
                TableTag::Column => {
                    *columns_seen += 1;
                    let is_last = *columns_seen == column_total;
                    let count =
                        self.take_count(&mut parent.children_mut()[i], RunKind::Column, is_last);
                    stats.columns += count - 1;
                    count
                },
                tag if tag.is_row_container() || tag.is_column_container() => {
                    self.expand_children(
                        &mut parent.children_mut()[i],
                        (row_total, &mut *rows_seen),
                        (column_total, &mut *columns_seen),
                        stats,
                    );
                    1
                },
                _ => 1,
            };
            Self::clone_after(parent, i, copies);
            i += copies;
        }
    }

    fn expand_cells(&self, row: &mut Element, stats: &mut ExpansionStats) {
        let mut i = 0;
        while i < row.child_count() {
            if !row.children()[i].tag().is_cell() {
                i += 1;
                continue;
            }
            // Earlier runs shift indices, so look at what follows right now
            let is_last = !row.children()[i + 1..].iter().any(|c| c.tag().is_cell());
            let count = self.take_count(&mut row.children_mut()[i], RunKind::Cell, is_last);
            stats.cells += count - 1;
            Self::clone_after(row, i, count);
            i += count;
        }
    }

    /// Read and strip the repeat attribute, returning how many elements the
    /// run turns into. Counts were validated up front, so a read failure
    /// cannot happen here and falls back to 1.
    fn take_count(&self, element: &mut Element, kind: RunKind, is_last: bool) -> usize {
        let attr = match kind {
            RunKind::Row => attrs::ROWS_REPEATED,
            RunKind::Column | RunKind::Cell => attrs::COLUMNS_REPEATED,
        };
        let count = repeat_count(element, attr).unwrap_or(1);
        element.remove_attribute(attr);
        self.effective_count(kind, count, is_last)
    }

    fn clone_after(parent: &mut Element, index: usize, count: usize) {
        if count > 1 {
            let template = parent.children()[index].clone();
            parent.insert_children(index + 1, iter::repeat_n(template, count - 1));
        }
    }
}

/// Repetition count a wrapper carries on disk
pub trait Repeated {
    /// Value of the element's repeat attribute, 1 when absent
    fn repeat_count(&self) -> Result<usize>;
}

impl Repeated for TableRow {
    fn repeat_count(&self) -> Result<usize> {
        self.rows_repeated()
    }
}

impl Repeated for TableColumn {
    fn repeat_count(&self) -> Result<usize> {
        self.columns_repeated()
    }
}

impl Repeated for TableCell {
    fn repeat_count(&self) -> Result<usize> {
        self.columns_repeated()
    }
}
