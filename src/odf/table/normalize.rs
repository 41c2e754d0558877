//! Load-time normalization: expansion followed by rectangular padding.
//!
//! After [`normalize`] every row of the table holds the same number of
//! cells, equal to the widest row before the pass, and there are at least
//! that many column definitions. Rows are never truncated.

use super::container::{scan_columns, scan_rows};
use super::options::TableOptions;
use crate::common::{Error, Result};
use crate::odf::elements::element::Element;
use crate::odf::elements::table_expansion::{ExpansionStats, TableExpander};
use crate::odf::elements::tag_matcher::names;
use log::debug;
use std::iter;

/// What a normalization pass changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Elements created by expansion
    pub expansion: ExpansionStats,
    /// Empty cells appended to short rows
    pub padded_cells: usize,
    /// Column definitions added
    pub added_columns: usize,
    /// Whether prelude/epilogue children were moved
    pub reordered: bool,
}

impl NormalizeReport {
    /// Whether the pass left the table untouched
    pub fn is_noop(&self) -> bool {
        self.expansion.is_empty()
            && self.padded_cells == 0
            && self.added_columns == 0
            && !self.reordered
    }
}

/// Expand repetitions and pad the table to a rectangle.
///
/// Runs the optional ordering repair first when `options.reorder` is set.
/// Applying it to an already normalized table changes nothing.
///
/// # Example
///
/// ```
/// use litchi_table::odf::elements::element::Element;
/// use litchi_table::odf::table::{TableOptions, normalize};
///
/// let mut table = Element::parse(
///     r#"<table:table>
///          <table:table-row><table:table-cell table:number-columns-repeated="3"/></table:table-row>
///          <table:table-row><table:table-cell/></table:table-row>
///        </table:table>"#,
/// ).unwrap();
///
/// let report = normalize(&mut table, &TableOptions::default()).unwrap();
/// assert_eq!(report.padded_cells, 2);
/// assert_eq!(report.added_columns, 3);
/// ```
pub fn normalize(table: &mut Element, options: &TableOptions) -> Result<NormalizeReport> {
    let mut report = NormalizeReport {
        reordered: options.reorder && options.organizer.reorder(table),
        ..Default::default()
    };
    report.expansion = TableExpander::new(options.expand_strategy).expand(table)?;

    let rows = scan_rows(table);
    let widths: Vec<usize> = rows
        .iter()
        .map(|path| table.node_at(path).map_or(0, Element::child_count))
        .collect();
    let ncols = widths.iter().copied().max().unwrap_or(0);
    let min = widths.iter().copied().min().unwrap_or(0);

    if min < ncols {
        for (path, width) in rows.iter().zip(&widths) {
            let row = table
                .node_at_mut(path)
                .ok_or_else(|| Error::Structure("row vanished during normalization".into()))?;
            let missing = ncols - width;
            row.children_mut()
                .extend(iter::repeat_with(|| Element::new(names::CELL)).take(missing));
            report.padded_cells += missing;
        }
    }

    report.added_columns = pad_columns(table, ncols, options)?;

    if !report.is_noop() {
        debug!(
            "normalized table: {} rows x {} columns, {} cells padded, {} column definitions added",
            rows.len(),
            ncols,
            report.padded_cells,
            report.added_columns
        );
    }
    Ok(report)
}

/// Bring the column definitions up to `ncols`; surplus ones stay.
fn pad_columns(table: &mut Element, ncols: usize, options: &TableOptions) -> Result<usize> {
    let columns = scan_columns(table);
    let missing = ncols.saturating_sub(columns.len());
    if missing == 0 {
        return Ok(0);
    }

    let new_columns = iter::repeat_with(|| Element::new(names::COLUMN)).take(missing);
    match columns.last().and_then(|last| last.split_last()) {
        Some((&index, parent)) => {
            let parent = table
                .node_at_mut(parent)
                .ok_or_else(|| Error::Structure("column vanished during normalization".into()))?;
            parent.insert_children(index + 1, new_columns);
        },
        None => {
            let at = options.organizer.data_start(table);
            table.insert_children(at, new_columns);
        },
    }
    Ok(missing)
}
