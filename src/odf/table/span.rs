//! Merging and unmerging rectangular cell regions.
//!
//! A merged rectangle is recorded on its top-left cell (the anchor) as
//! `table:number-rows-spanned` / `table:number-columns-spanned`. Every
//! other cell of the rectangle is a `table:covered-table-cell`; covered
//! cells keep their content.

use super::grid::{CellPosition, Table};
use crate::common::{Error, Result};
use crate::odf::coordinates::{CellCoord, CellRange};
use crate::odf::elements::table::SpanSize;
use log::debug;

/// Span operations on one table
pub struct CellSpanController<'a> {
    table: &'a mut Table,
}

impl<'a> CellSpanController<'a> {
    pub fn new(table: &'a mut Table) -> Self {
        Self { table }
    }

    /// Whether the cell anchors a merged rectangle
    pub fn is_cell_spanning<P: CellPosition>(&self, position: P) -> Result<bool> {
        Ok(self.span(position)?.is_spanning())
    }

    /// Recorded span of the cell, `(1, 1)` when it anchors nothing
    pub fn span<P: CellPosition>(&self, position: P) -> Result<SpanSize> {
        let (r, c) = self.table.resolve(position)?;
        Ok(self.table.cell_at(r, c)?.span())
    }

    /// Merge the `size` rectangle anchored at `position`.
    ///
    /// The anchor keeps its content and records the span; every other
    /// cell of the rectangle becomes covered. Cells already covered by the
    /// anchor's own span count as free, so a span can grow or shrink in
    /// place. Setting `(1, 1)` removes the span. Nothing changes when
    /// validation fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use litchi_table::odf::table::Table;
    /// use litchi_table::odf::elements::table::SpanSize;
    ///
    /// let mut table = Table::new("T", 4, 4).unwrap();
    /// table.spans().set_span("B2", SpanSize::new(2, 3)).unwrap();
    ///
    /// assert!(table.get_cell("C3").unwrap().is_covered());
    /// assert!(table.spans().set_span((0, 0), (3, 3)).is_err());
    /// ```
    pub fn set_span<P, S>(&mut self, position: P, size: S) -> Result<()>
    where
        P: CellPosition,
        S: Into<SpanSize>,
    {
        let size = size.into();
        let (r, c) = self.table.resolve(position)?;
        if size.rows < 1 || size.cols < 1 {
            return Err(Error::invalid_argument(format!(
                "span must be at least 1x1, got {}x{}",
                size.rows, size.cols
            )));
        }
        if !size.is_spanning() {
            return self.remove_span_at(r, c);
        }

        let anchor = self.table.cell_at(r, c)?;
        if anchor.is_covered() {
            return Err(Error::invalid_argument(format!(
                "{} is covered by another span and cannot anchor one",
                CellCoord::new(r, c)
            )));
        }
        let (nrows, ncols) = self.table.size();
        let past = |start: usize, len: usize, limit: usize| {
            start.checked_add(len).is_none_or(|end| end > limit)
        };
        if past(r, size.rows, nrows) || past(c, size.cols, ncols) {
            return Err(Error::SpanExceedsBounds {
                row: r,
                col: c,
                rows: size.rows,
                cols: size.cols,
            });
        }

        let current = self.region(r, c, anchor.span());
        let target = CellRange::with_size(CellCoord::new(r, c), size.rows, size.cols);
        for coord in target.cells() {
            let (rr, cc) = (coord.row(), coord.column());
            if (rr, cc) == (r, c) || current.is_some_and(|own| own.contains(rr, cc)) {
                continue;
            }
            let cell = self.table.cell_at(rr, cc)?;
            if cell.is_covered() || cell.is_spanning() {
                return Err(Error::OverlappingSpan { row: rr, col: cc });
            }
        }

        self.remove_span_at(r, c)?;
        for coord in target.cells() {
            let (rr, cc) = (coord.row(), coord.column());
            let mut cell = self.table.cell_at(rr, cc)?;
            if (rr, cc) == (r, c) {
                cell.set_span(size);
            } else {
                cell.set_covered(true);
            }
            self.table.store_cell(rr, cc, cell)?;
        }
        debug!("merged {}", target);
        Ok(())
    }

    /// Merge a range given in A1 notation, e.g. `"B2:C4"`
    pub fn set_span_range(&mut self, range: &str) -> Result<()> {
        self.merge(range.parse()?)
    }

    /// Merge `range`, anchored at its top-left cell
    pub fn merge(&mut self, range: CellRange) -> Result<()> {
        let start = range.start();
        self.set_span(start, (range.height(), range.width()))
    }

    /// Unmerge the rectangle anchored at `position`.
    ///
    /// The rectangle is taken from the anchor's recorded span, clipped to
    /// the table. Covered cells in it become ordinary cells again. Does
    /// nothing when the cell anchors no span.
    pub fn remove_span<P: CellPosition>(&mut self, position: P) -> Result<()> {
        let (r, c) = self.table.resolve(position)?;
        self.remove_span_at(r, c)
    }

    fn remove_span_at(&mut self, r: usize, c: usize) -> Result<()> {
        let mut anchor = self.table.cell_at(r, c)?;
        let Some(region) = self.region(r, c, anchor.span()) else {
            return Ok(());
        };

        anchor.set_span(SpanSize::SINGLE);
        self.table.store_cell(r, c, anchor)?;
        for coord in region.cells().skip(1) {
            let (rr, cc) = (coord.row(), coord.column());
            let mut cell = self.table.cell_at(rr, cc)?;
            if cell.is_covered() {
                cell.set_covered(false);
                self.table.store_cell(rr, cc, cell)?;
            }
        }
        debug!("unmerged {}", region);
        Ok(())
    }

    /// Every merged rectangle, clipped to the table, in row-major order of
    /// the anchors
    pub fn spanned_regions(&self) -> Result<Vec<CellRange>> {
        let (nrows, ncols) = self.table.size();
        let mut regions = Vec::new();
        for r in 0..nrows {
            for c in 0..ncols {
                let cell = self.table.cell_at(r, c)?;
                if !cell.is_covered()
                    && let Some(region) = self.region(r, c, cell.span())
                {
                    regions.push(region);
                }
            }
        }
        Ok(regions)
    }

    /// Rectangle covered by a span at `(r, c)`, clipped to the table;
    /// `None` for a single cell
    fn region(&self, r: usize, c: usize, span: SpanSize) -> Option<CellRange> {
        if !span.is_spanning() {
            return None;
        }
        let (nrows, ncols) = self.table.size();
        let rows = span.rows.min(nrows.saturating_sub(r)).max(1);
        let cols = span.cols.min(ncols.saturating_sub(c)).max(1);
        Some(CellRange::with_size(CellCoord::new(r, c), rows, cols))
    }
}
