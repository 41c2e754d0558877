//! Unified error types for the table core.
//!
//! Every fallible operation in the crate returns [`Result`]. The variants are
//! grouped the way callers usually react to them: malformed input
//! ([`Error::Format`], [`Error::XmlError`], [`Error::InvalidAddress`]),
//! positional misuse ([`Error::OutOfBounds`]) and argument misuse
//! ([`Error::InvalidArgument`] and the span variants).
use std::fmt;
use thiserror::Error;

/// Which axis an out-of-bounds index was resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Logical rows of the grid
    Row,
    /// Logical columns of the grid
    Column,
    /// Direct children of the table element
    Child,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Row => f.write_str("row"),
            Axis::Column => f.write_str("column"),
            Axis::Child => f.write_str("child"),
        }
    }
}

/// Main error type for table operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed on-disk attribute (repetition count, span size)
    #[error("Format error: {0}")]
    Format(String),

    /// Index outside `[0, len)` after negative-index resolution
    #[error("{axis} index {index} out of bounds (len: {len})")]
    OutOfBounds { axis: Axis, index: isize, len: usize },

    /// Non-positive counts, invalid dimensions and similar contract violations
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Span rectangle does not fit into the table
    #[error("span exceeds table bounds: {rows}x{cols} at ({row}, {col})")]
    SpanExceedsBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Span rectangle intersects another span
    #[error("overlapping span at ({row}, {col})")]
    OverlappingSpan { row: usize, col: usize },

    /// Spreadsheet address that does not match `[A-Z]+[0-9]+`
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Structure organizer misconfiguration or a misplaced structural tag
    #[error("Structure error: {0}")]
    Structure(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    XmlError(String),
}

impl Error {
    /// Whether this is an argument error (the "value error" class).
    ///
    /// Span validation failures belong to the same class as non-positive
    /// counts: they are caller mistakes detected before any mutation.
    pub fn is_value_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidArgument(_)
                | Error::SpanExceedsBounds { .. }
                | Error::OverlappingSpan { .. }
        )
    }

    /// Whether this is a bounds error (the "index error" class).
    #[inline]
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, Error::OutOfBounds { .. })
    }

    pub(crate) fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Error::InvalidArgument(msg.into())
    }
}

/// Result type for table operations.
pub type Result<T> = std::result::Result<T, Error>;
