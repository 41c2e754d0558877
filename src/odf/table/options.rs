use super::structure::StructureOrganizer;
use crate::odf::elements::table_expansion::ExpandStrategy;

/// Configuration for loading a table from an existing element.
///
/// # Examples
///
/// ```rust
/// use litchi_table::odf::table::{ExpandStrategy, TableOptions};
///
/// // Create with defaults
/// let options = TableOptions::default();
///
/// // Or customize
/// let options = TableOptions::new()
///     .with_expand_strategy(ExpandStrategy::AllLessMaxCount {
///         max_rows: 10_000,
///         max_cols: 1_000,
///     })
///     .with_reorder(true);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TableOptions {
    /// How repetition runs are materialized at load
    pub expand_strategy: ExpandStrategy,
    /// Whether to repair prelude/epilogue ordering before loading
    pub reorder: bool,
    /// Ordering rules for the table's direct children
    pub organizer: StructureOrganizer,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            expand_strategy: ExpandStrategy::All,
            reorder: false,
            organizer: StructureOrganizer::table(),
        }
    }
}

impl TableOptions {
    /// Create a new `TableOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the expansion strategy.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use litchi_table::odf::table::{ExpandStrategy, TableOptions};
    ///
    /// let options = TableOptions::new().with_expand_strategy(ExpandStrategy::AllButLast);
    /// assert_eq!(options.expand_strategy, ExpandStrategy::AllButLast);
    /// ```
    #[inline]
    pub fn with_expand_strategy(mut self, strategy: ExpandStrategy) -> Self {
        self.expand_strategy = strategy;
        self
    }

    /// Set whether misplaced prelude/epilogue children are moved into
    /// their blocks before loading.
    #[inline]
    pub fn with_reorder(mut self, reorder: bool) -> Self {
        self.reorder = reorder;
        self
    }

    /// Use custom ordering rules.
    #[inline]
    pub fn with_organizer(mut self, organizer: StructureOrganizer) -> Self {
        self.organizer = organizer;
        self
    }
}
