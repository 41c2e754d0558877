//! Cell coordinate conversion utilities (A1 notation).
//!
//! This module converts between spreadsheet addresses and 0-based grid
//! indices:
//! - A1 notation (e.g., "A1", "B3", "AA10") to `(row, column)`
//! - `(row, column)` back to A1 notation
//! - Range notation (e.g., "A1:B3")
//!
//! Column letters use bijective base-26 (A=1 … Z=26, AA=27 …), row numbers
//! are 1-based in addresses and 0-based everywhere else.

use crate::common::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Convert an address to a `(row, column)` pair, both 0-based.
///
/// The input is upper-cased first and must then consist of one or more
/// letters followed by one or more digits. The row number must be at least 1.
///
/// # Examples
///
/// ```
/// use litchi_table::odf::coordinates::to_index;
///
/// assert_eq!(to_index("A1").unwrap(), (0, 0));
/// assert_eq!(to_index("c2").unwrap(), (1, 2));
/// assert_eq!(to_index("AA100").unwrap(), (99, 26));
/// assert!(to_index("100").is_err());
/// assert!(to_index("a1A").is_err());
/// ```
pub fn to_index(address: &str) -> Result<(usize, usize)> {
    let upper = address.to_ascii_uppercase();
    let bytes = upper.as_bytes();

    let split = bytes
        .iter()
        .position(|b| !b.is_ascii_uppercase())
        .unwrap_or(bytes.len());
    let (letters, digits) = upper.split_at(split);

    if letters.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidAddress(address.to_string()));
    }

    let column = alpha_to_digit(letters).map_err(|_| Error::InvalidAddress(address.to_string()))?;
    let row: usize = digits
        .parse()
        .map_err(|_| Error::InvalidAddress(address.to_string()))?;
    if row == 0 {
        return Err(Error::InvalidAddress(format!(
            "{}: row numbers start at 1",
            address
        )));
    }

    Ok((row - 1, column))
}

/// Convert a 0-based `(row, column)` pair to an address.
///
/// # Examples
///
/// ```
/// use litchi_table::odf::coordinates::to_address;
///
/// assert_eq!(to_address(0, 0), "A1");
/// assert_eq!(to_address(99, 26), "AA100");
/// ```
pub fn to_address(row: usize, column: usize) -> String {
    let mut address = digit_to_alpha(column);
    address.push_str(itoa::Buffer::new().format(row + 1));
    address
}

/// Convert alphabetic column to numeric (0-indexed)
///
/// Letters are case-insensitive: A=0, B=1, ..., Z=25, AA=26, etc.
///
/// # Examples
///
/// ```
/// use litchi_table::odf::coordinates::alpha_to_digit;
///
/// assert_eq!(alpha_to_digit("A").unwrap(), 0);
/// assert_eq!(alpha_to_digit("Z").unwrap(), 25);
/// assert_eq!(alpha_to_digit("AA").unwrap(), 26);
/// assert_eq!(alpha_to_digit("CCC").unwrap(), 2108);
/// ```
pub fn alpha_to_digit(alpha: &str) -> Result<usize> {
    if alpha.is_empty() || !alpha.bytes().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::InvalidAddress(format!(
            "Column value '{}' is malformed, must contain only letters",
            alpha
        )));
    }

    let mut column = 0usize;
    for c in alpha.bytes() {
        let val = (c.to_ascii_uppercase() - b'A' + 1) as usize;
        column = column
            .checked_mul(26)
            .and_then(|c| c.checked_add(val))
            .ok_or_else(|| Error::InvalidAddress(format!("Column '{}' is too large", alpha)))?;
    }

    Ok(column - 1)
}

/// Convert numeric column to alphabetic notation (0-indexed)
///
/// # Examples
///
/// ```
/// use litchi_table::odf::coordinates::digit_to_alpha;
///
/// assert_eq!(digit_to_alpha(0), "A");
/// assert_eq!(digit_to_alpha(25), "Z");
/// assert_eq!(digit_to_alpha(26), "AA");
/// ```
pub fn digit_to_alpha(digit: usize) -> String {
    let mut letters = Vec::with_capacity(4);
    let mut n = digit as u128 + 1;

    while n > 0 {
        letters.push(b'A' + ((n - 1) % 26) as u8);
        n = (n - 1) / 26;
    }

    letters.iter().rev().map(|&b| b as char).collect()
}

/// Cell coordinates, both 0-indexed
///
/// # Examples
///
/// ```
/// use litchi_table::odf::coordinates::CellCoord;
///
/// let coord: CellCoord = "AA10".parse().unwrap();
/// assert_eq!(coord.column(), 26);
/// assert_eq!(coord.row(), 9);
/// assert_eq!(coord.to_string(), "AA10");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    row: usize,
    column: usize,
}

impl CellCoord {
    /// Create a new cell coordinate from a row and a column index
    #[inline]
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Row index (0-indexed)
    #[inline]
    pub const fn row(&self) -> usize {
        self.row
    }

    /// Column index (0-indexed)
    #[inline]
    pub const fn column(&self) -> usize {
        self.column
    }

    /// Convert to A1 notation string
    pub fn to_a1(&self) -> String {
        to_address(self.row, self.column)
    }
}

impl FromStr for CellCoord {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (row, column) = to_index(s.trim())?;
        Ok(Self::new(row, column))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// Rectangular cell range, inclusive on both ends
///
/// Parsing normalizes the corners so that `start` is the top-left cell.
///
/// # Examples
///
/// ```
/// use litchi_table::odf::coordinates::CellRange;
///
/// let range: CellRange = "C3:A1".parse().unwrap();
/// assert_eq!(range.to_string(), "A1:C3");
/// assert_eq!(range.height(), 3);
/// assert_eq!(range.width(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    start: CellCoord,
    end: CellCoord,
}

impl CellRange {
    /// Create a range from two corners in any order
    pub fn new(a: CellCoord, b: CellCoord) -> Self {
        Self {
            start: CellCoord::new(a.row.min(b.row), a.column.min(b.column)),
            end: CellCoord::new(a.row.max(b.row), a.column.max(b.column)),
        }
    }

    /// Range anchored at `start` covering `rows` x `cols` cells.
    ///
    /// Sizes below 1 count as 1; the far corner saturates at `usize::MAX`.
    pub fn with_size(start: CellCoord, rows: usize, cols: usize) -> Self {
        Self {
            start,
            end: CellCoord::new(
                start.row.saturating_add(rows.max(1) - 1),
                start.column.saturating_add(cols.max(1) - 1),
            ),
        }
    }

    /// Top-left corner
    #[inline]
    pub const fn start(&self) -> CellCoord {
        self.start
    }

    /// Bottom-right corner
    #[inline]
    pub const fn end(&self) -> CellCoord {
        self.end
    }

    /// Number of columns in the range
    #[inline]
    pub fn width(&self) -> usize {
        self.end.column - self.start.column + 1
    }

    /// Number of rows in the range
    #[inline]
    pub fn height(&self) -> usize {
        self.end.row - self.start.row + 1
    }

    /// Whether `(row, column)` lies inside the range
    pub fn contains(&self, row: usize, column: usize) -> bool {
        (self.start.row..=self.end.row).contains(&row)
            && (self.start.column..=self.end.column).contains(&column)
    }

    /// Every coordinate of the range, row by row
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (self.start.row..=self.end.row).flat_map(move |row| {
            (self.start.column..=self.end.column).map(move |column| CellCoord::new(row, column))
        })
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (a, b) = s.split_once(':').ok_or_else(|| {
            Error::InvalidAddress(format!("Invalid range format '{}', expected 'A1:B3'", s))
        })?;
        Ok(Self::new(a.parse()?, b.parse()?))
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_to_index_examples() {
        assert_eq!(to_index("A1").unwrap(), (0, 0));
        assert_eq!(to_index("A2").unwrap(), (1, 0));
        assert_eq!(to_index("C2").unwrap(), (1, 2));
        assert_eq!(to_index("AA100").unwrap(), (99, 26));
        assert_eq!(to_index("CCC100").unwrap(), (99, 2108));
        assert_eq!(to_index("aa100").unwrap(), (99, 26));
    }

    #[test]
    fn test_to_index_rejects_malformed() {
        for bad in ["100", "A", "a1A", "", "1A", "A-1", "A 1", "A0", "Ä1"] {
            let err = to_index(bad).unwrap_err();
            assert!(
                matches!(err, Error::InvalidAddress(_)),
                "{bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_column_overflow_is_rejected() {
        let huge = format!("{}1", "Z".repeat(40));
        assert!(to_index(&huge).is_err());
    }

    #[test]
    fn test_alpha_digit_examples() {
        assert_eq!(alpha_to_digit("AZ").unwrap(), 51);
        assert_eq!(alpha_to_digit("BA").unwrap(), 52);
        assert_eq!(alpha_to_digit("a").unwrap(), 0);
        assert_eq!(digit_to_alpha(51), "AZ");
        assert_eq!(digit_to_alpha(52), "BA");
        assert_eq!(digit_to_alpha(2108), "CCC");
        assert!(alpha_to_digit("A1").is_err());
    }

    #[test]
    fn test_cell_range_parse() {
        let range: CellRange = "B2:D5".parse().unwrap();
        assert_eq!(range.start(), CellCoord::new(1, 1));
        assert_eq!(range.end(), CellCoord::new(4, 3));
        assert_eq!(range.width(), 3);
        assert_eq!(range.height(), 4);
        assert!(range.contains(2, 2));
        assert!(!range.contains(0, 2));
        assert_eq!(range.cells().count(), 12);

        assert!("A1".parse::<CellRange>().is_err());
        assert!("A1:".parse::<CellRange>().is_err());
        assert!(":B3".parse::<CellRange>().is_err());
    }

    #[test]
    fn test_with_size() {
        let range = CellRange::with_size(CellCoord::new(2, 1), 2, 3);
        assert_eq!(range.to_string(), "B3:D4");
    }

    proptest! {
        #[test]
        fn prop_address_round_trip(row in 0usize..1_048_576, col in 0usize..16_384) {
            let address = to_address(row, col);
            prop_assert_eq!(to_index(&address).unwrap(), (row, col));
            prop_assert_eq!(to_index(&address.to_lowercase()).unwrap(), (row, col));
        }
    }
}
