//! Position-keyed cache of cell wrappers.

use crate::common::Result;
use crate::odf::elements::table::TableCell;
use log::trace;
use std::cell::RefCell;
use std::collections::HashMap;

/// Wrappers handed out by a table, keyed by resolved `(row, col)`.
///
/// Reads populate the cache through `&self`. Structural mutations clear
/// it entirely; cell writes replace the single entry.
#[derive(Debug, Default)]
pub struct WrapperCache {
    cells: RefCell<HashMap<(usize, usize), TableCell>>,
}

impl WrapperCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached wrapper, building it with `build` on a miss
    pub fn get_or_try_insert<F>(&self, position: (usize, usize), build: F) -> Result<TableCell>
    where
        F: FnOnce() -> Result<TableCell>,
    {
        if let Some(cell) = self.get(position) {
            return Ok(cell);
        }
        let cell = build()?;
        self.cells.borrow_mut().insert(position, cell.clone());
        Ok(cell)
    }

    pub fn insert(&self, position: (usize, usize), cell: TableCell) {
        self.cells.borrow_mut().insert(position, cell);
    }

    pub(crate) fn get(&self, position: (usize, usize)) -> Option<TableCell> {
        self.cells.borrow().get(&position).cloned()
    }

    pub fn clear(&self) {
        let mut cells = self.cells.borrow_mut();
        if !cells.is_empty() {
            trace!("dropping {} cached cell wrappers", cells.len());
            cells.clear();
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.cells.borrow().len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.cells.borrow().is_empty()
    }

    /// Every cached entry, for consistency checks
    pub(crate) fn entries(&self) -> Vec<((usize, usize), TableCell)> {
        self.cells
            .borrow()
            .iter()
            .map(|(pos, cell)| (*pos, cell.clone()))
            .collect()
    }
}

impl Clone for WrapperCache {
    /// A clone starts cold
    fn clone(&self) -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;

    #[test]
    fn test_builds_once() {
        let cache = WrapperCache::new();
        let mut builds = 0;
        for _ in 0..3 {
            cache
                .get_or_try_insert((1, 2), || {
                    builds += 1;
                    Ok(TableCell::with_value("x"))
                })
                .unwrap();
        }
        assert_eq!(builds, 1);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get((1, 2)).is_none());
    }

    #[test]
    fn test_failed_build_is_not_cached() {
        let cache = WrapperCache::new();
        let result = cache.get_or_try_insert((0, 0), || Err(Error::invalid_argument("nope")));
        assert!(result.is_err());
        assert!(cache.is_empty());
    }
}
