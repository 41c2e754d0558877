//! Table-related ODF elements.
//!
//! This module provides wrappers for the structural table elements: rows,
//! column definitions, cells and covered cells. Each wrapper owns an
//! [`Element`] and exposes the attributes the table core works with.
//! [`TableNode::wrap`] is the single factory mapping a tag to its wrapper.

use super::element::{Element, ElementBase};
use super::tag_matcher::{TableTag, names};
use crate::common::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

/// Attribute names used by the table wrappers
pub mod attrs {
    pub const NAME: &str = "table:name";
    pub const STYLE_NAME: &str = "table:style-name";
    pub const DEFAULT_CELL_STYLE_NAME: &str = "table:default-cell-style-name";
    pub const VISIBILITY: &str = "table:visibility";
    pub const ROWS_REPEATED: &str = "table:number-rows-repeated";
    pub const COLUMNS_REPEATED: &str = "table:number-columns-repeated";
    pub const ROWS_SPANNED: &str = "table:number-rows-spanned";
    pub const COLUMNS_SPANNED: &str = "table:number-columns-spanned";
    pub const FORMULA: &str = "table:formula";
    pub const VALUE_TYPE: &str = "office:value-type";
    pub const CALCEXT_VALUE_TYPE: &str = "calcext:value-type";
    pub const VALUE: &str = "office:value";
    pub const DATE_VALUE: &str = "office:date-value";
    pub const TIME_VALUE: &str = "office:time-value";
    pub const BOOLEAN_VALUE: &str = "office:boolean-value";
    pub const STRING_VALUE: &str = "office:string-value";
    pub const CURRENCY: &str = "office:currency";
}

const VALUE_ATTRS: [&str; 8] = [
    attrs::VALUE_TYPE,
    attrs::CALCEXT_VALUE_TYPE,
    attrs::VALUE,
    attrs::DATE_VALUE,
    attrs::TIME_VALUE,
    attrs::BOOLEAN_VALUE,
    attrs::STRING_VALUE,
    attrs::CURRENCY,
];

/// Parse a repetition count attribute.
///
/// Missing attribute means a count of 1. Anything but a positive decimal
/// integer is a format error.
pub(crate) fn repeat_count(element: &Element, attr: &str) -> Result<usize> {
    match element.get_attribute(attr) {
        None => Ok(1),
        Some(raw) => match atoi_simd::parse::<u32, false, false>(raw.trim().as_bytes()) {
            Ok(n) if n >= 1 => Ok(n as usize),
            _ => Err(Error::Format(format!(
                "{} on <{}> must be a positive integer, got '{}'",
                attr,
                element.tag_name(),
                raw
            ))),
        },
    }
}

/// Span counts are read leniently: a malformed value reads as 1.
fn span_count(element: &Element, attr: &str) -> usize {
    element
        .get_attribute(attr)
        .and_then(|raw| atoi_simd::parse::<usize, false, false>(raw.trim().as_bytes()).ok())
        .filter(|&n| n >= 1)
        .unwrap_or(1)
}

fn set_count(element: &mut Element, attr: &str, count: usize) {
    if count > 1 {
        element.set_attribute(attr, itoa::Buffer::new().format(count));
    } else {
        element.remove_attribute(attr);
    }
}

/// Plain number rendering used for `office:value` and display text.
fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        itoa::Buffer::new().format(value as i64).to_string()
    } else {
        ryu::Buffer::new().format(value).to_string()
    }
}

// ============================================================================
// CELL VALUES
// ============================================================================

/// `office:value-type` of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Float,
    Percentage,
    Currency,
    Date,
    Time,
    Boolean,
}

impl ValueType {
    /// Attribute spelling of the value type
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Float => "float",
            ValueType::Percentage => "percentage",
            ValueType::Currency => "currency",
            ValueType::Date => "date",
            ValueType::Time => "time",
            ValueType::Boolean => "boolean",
        }
    }

    /// Parse the attribute spelling; unknown spellings yield `None`
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "string" => ValueType::String,
            "float" => ValueType::Float,
            "percentage" => ValueType::Percentage,
            "currency" => ValueType::Currency,
            "date" => ValueType::Date,
            "time" => ValueType::Time,
            "boolean" => ValueType::Boolean,
            _ => return None,
        })
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed content of a cell.
///
/// Dates and times keep their ISO 8601 attribute spelling; no locale
/// formatting is applied anywhere.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// No value and no text
    Empty,
    /// Text string
    String(String),
    /// Numeric value
    Float(f64),
    /// Percentage, stored as a fraction (0.5 = 50%)
    Percentage(f64),
    /// Currency amount with optional ISO 4217 code
    Currency {
        amount: f64,
        currency: Option<String>,
    },
    /// Date or date-time, ISO 8601 (`office:date-value`)
    Date(String),
    /// Duration, ISO 8601 (`office:time-value`)
    Time(String),
    /// Boolean value
    Boolean(bool),
}

impl CellValue {
    /// Value type this value is stored as, `None` for `Empty`
    pub fn value_type(&self) -> Option<ValueType> {
        Some(match self {
            CellValue::Empty => return None,
            CellValue::String(_) => ValueType::String,
            CellValue::Float(_) => ValueType::Float,
            CellValue::Percentage(_) => ValueType::Percentage,
            CellValue::Currency { .. } => ValueType::Currency,
            CellValue::Date(_) => ValueType::Date,
            CellValue::Time(_) => ValueType::Time,
            CellValue::Boolean(_) => ValueType::Boolean,
        })
    }

    /// Plain display text written into the cell paragraph
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::String(s) => s.clone(),
            CellValue::Float(v) => format_number(*v),
            CellValue::Percentage(v) => format!("{}%", format_number(v * 100.0)),
            CellValue::Currency { amount, currency } => match currency {
                Some(code) => format!("{} {}", format_number(*amount), code),
                None => format_number(*amount),
            },
            CellValue::Date(s) | CellValue::Time(s) => s.clone(),
            CellValue::Boolean(true) => "TRUE".to_string(),
            CellValue::Boolean(false) => "FALSE".to_string(),
        }
    }
}

impl CellValue {
    /// Calendar value of a `Date` cell.
    ///
    /// Accepts both date-only and date-time spellings; a date-only value
    /// reads as midnight.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        let CellValue::Date(raw) = self else {
            return None;
        };
        let raw = raw.trim();
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }
}

impl From<NaiveDate> for CellValue {
    fn from(date: NaiveDate) -> Self {
        CellValue::Date(date.format("%Y-%m-%d").to_string())
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::Date(value.format("%Y-%m-%dT%H:%M:%S").to_string())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Boolean(v)
    }
}

/// Size of a merged rectangle, both components at least 1 when valid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanSize {
    pub rows: usize,
    pub cols: usize,
}

impl SpanSize {
    /// The span every ordinary cell has
    pub const SINGLE: SpanSize = SpanSize { rows: 1, cols: 1 };

    #[inline]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Whether the size covers more than one cell
    #[inline]
    pub fn is_spanning(self) -> bool {
        self != Self::SINGLE
    }
}

impl Default for SpanSize {
    fn default() -> Self {
        Self::SINGLE
    }
}

impl From<(usize, usize)> for SpanSize {
    fn from((rows, cols): (usize, usize)) -> Self {
        Self { rows, cols }
    }
}

// ============================================================================
// CELL
// ============================================================================

/// A table cell or covered table cell
#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    element: Element,
}

impl Default for TableCell {
    fn default() -> Self {
        Self::new()
    }
}

impl TableCell {
    /// Create a new empty cell
    pub fn new() -> Self {
        Self {
            element: Element::new(names::CELL),
        }
    }

    /// Create a new empty covered cell
    pub fn covered() -> Self {
        Self {
            element: Element::new(names::COVERED_CELL),
        }
    }

    /// Create a cell holding `value`
    pub fn with_value<V: Into<CellValue>>(value: V) -> Self {
        let mut cell = Self::new();
        cell.set_value(value.into());
        cell
    }

    /// Create table cell from element
    pub fn from_element(element: Element) -> Result<Self> {
        if !element.tag().is_cell() {
            return Err(Error::invalid_argument(format!(
                "<{}> is not a table cell",
                element.tag_name()
            )));
        }
        Ok(Self { element })
    }

    /// Borrow the underlying element
    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Unwrap into the underlying element
    pub fn into_element(self) -> Element {
        self.element
    }

    /// Whether this is a `table:covered-table-cell`
    #[inline]
    pub fn is_covered(&self) -> bool {
        self.element.tag() == TableTag::CoveredCell
    }

    /// Switch between ordinary and covered cell.
    ///
    /// A covered cell cannot anchor a span, so covering strips the span
    /// attributes.
    pub fn set_covered(&mut self, covered: bool) {
        if covered {
            self.element.set_tag_name(names::COVERED_CELL);
            self.element.remove_attribute(attrs::ROWS_SPANNED);
            self.element.remove_attribute(attrs::COLUMNS_SPANNED);
        } else {
            self.element.set_tag_name(names::CELL);
        }
    }

    /// Recorded span, `(1, 1)` unless the cell anchors a merged rectangle
    pub fn span(&self) -> SpanSize {
        SpanSize {
            rows: span_count(&self.element, attrs::ROWS_SPANNED),
            cols: span_count(&self.element, attrs::COLUMNS_SPANNED),
        }
    }

    /// Record a span; `(1, 1)` removes the span attributes
    pub fn set_span(&mut self, size: SpanSize) {
        set_count(&mut self.element, attrs::ROWS_SPANNED, size.rows);
        set_count(&mut self.element, attrs::COLUMNS_SPANNED, size.cols);
    }

    /// Whether the recorded span differs from `(1, 1)`
    #[inline]
    pub fn is_spanning(&self) -> bool {
        self.span().is_spanning()
    }

    /// Get the value type
    pub fn value_type(&self) -> Option<ValueType> {
        self.element
            .get_attribute(attrs::VALUE_TYPE)
            .and_then(ValueType::parse)
    }

    /// Get the typed cell value.
    ///
    /// Numeric types with an unreadable `office:value` fall back to the
    /// displayed text.
    pub fn value(&self) -> CellValue {
        let number = || self.element.get_numeric_attribute(attrs::VALUE);
        let attr = |name| self.element.get_attribute(name).map(str::to_string);

        let typed = match self.value_type() {
            Some(ValueType::Float) => number().map(CellValue::Float),
            Some(ValueType::Percentage) => number().map(CellValue::Percentage),
            Some(ValueType::Currency) => number().map(|amount| CellValue::Currency {
                amount,
                currency: attr(attrs::CURRENCY),
            }),
            Some(ValueType::Date) => attr(attrs::DATE_VALUE).map(CellValue::Date),
            Some(ValueType::Time) => attr(attrs::TIME_VALUE).map(CellValue::Time),
            Some(ValueType::Boolean) => self
                .element
                .get_bool_attribute(attrs::BOOLEAN_VALUE)
                .map(CellValue::Boolean),
            Some(ValueType::String) => attr(attrs::STRING_VALUE).map(CellValue::String),
            None => None,
        };

        typed.unwrap_or_else(|| {
            let text = self.plain_text();
            if text.is_empty() {
                CellValue::Empty
            } else {
                CellValue::String(text)
            }
        })
    }

    /// Store a typed value and its plain display text.
    ///
    /// Previous value attributes and paragraphs are replaced; formula,
    /// style and span are kept.
    pub fn set_value(&mut self, value: CellValue) {
        for name in VALUE_ATTRS {
            self.element.remove_attribute(name);
        }

        if let Some(value_type) = value.value_type() {
            self.element.set_attribute(attrs::VALUE_TYPE, value_type.as_str());
        }
        match &value {
            CellValue::Empty | CellValue::String(_) => {},
            CellValue::Float(v) | CellValue::Percentage(v) => {
                self.element.set_attribute(attrs::VALUE, &format_number(*v));
            },
            CellValue::Currency { amount, currency } => {
                self.element.set_attribute(attrs::VALUE, &format_number(*amount));
                if let Some(code) = currency {
                    self.element.set_attribute(attrs::CURRENCY, code);
                }
            },
            CellValue::Date(s) => self.element.set_attribute(attrs::DATE_VALUE, s),
            CellValue::Time(s) => self.element.set_attribute(attrs::TIME_VALUE, s),
            CellValue::Boolean(b) => self
                .element
                .set_attribute(attrs::BOOLEAN_VALUE, if *b { "true" } else { "false" }),
        }

        self.set_plain_text(&value.display_text());
    }

    /// Paragraph text of the cell, one line per `text:p`/`text:h`
    pub fn plain_text(&self) -> String {
        self.element
            .children()
            .iter()
            .filter(|child| child.tag().is_text_block())
            .map(Element::get_text_recursive)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Replace the paragraphs with one `text:p` per line of `text`
    pub fn set_plain_text(&mut self, text: &str) {
        self.element
            .children_mut()
            .retain(|child| !child.tag().is_text_block());
        if text.is_empty() {
            return;
        }
        for line in text.split('\n') {
            self.element
                .add_child(Element::new(names::PARAGRAPH).with_text(line));
        }
    }

    /// Get the formula in the cell
    pub fn formula(&self) -> Option<&str> {
        self.element.get_attribute(attrs::FORMULA)
    }

    /// Set the formula in the cell
    pub fn set_formula(&mut self, formula: &str) {
        self.element.set_attribute(attrs::FORMULA, formula);
    }

    /// Remove the formula
    pub fn clear_formula(&mut self) {
        self.element.remove_attribute(attrs::FORMULA);
    }

    /// Get the style name
    pub fn style_name(&self) -> Option<&str> {
        self.element.get_attribute(attrs::STYLE_NAME)
    }

    /// Set the style name
    pub fn set_style_name(&mut self, name: &str) {
        self.element.set_attribute(attrs::STYLE_NAME, name);
    }

    /// Check if the cell has neither value nor text
    pub fn is_empty(&self) -> bool {
        self.value() == CellValue::Empty
    }

    pub(crate) fn columns_repeated(&self) -> Result<usize> {
        repeat_count(&self.element, attrs::COLUMNS_REPEATED)
    }
}

impl From<TableCell> for Element {
    fn from(cell: TableCell) -> Element {
        cell.element
    }
}

// ============================================================================
// ROW
// ============================================================================

/// A table row element
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    element: Element,
}

impl TableRow {
    /// Create a row of `ncols` empty cells
    pub fn with_cells(ncols: usize) -> Self {
        let mut element = Element::new(names::ROW);
        element
            .children_mut()
            .extend((0..ncols).map(|_| Element::new(names::CELL)));
        Self { element }
    }

    /// Create table row from element
    pub fn from_element(element: Element) -> Result<Self> {
        if element.tag() != TableTag::Row {
            return Err(Error::invalid_argument(format!(
                "<{}> is not a table row",
                element.tag_name()
            )));
        }
        Ok(Self { element })
    }

    /// Borrow the underlying element
    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Unwrap into the underlying element
    pub fn into_element(self) -> Element {
        self.element
    }

    /// Number of cell positions in the row
    pub fn cell_count(&self) -> usize {
        self.element
            .children()
            .iter()
            .filter(|child| child.tag().is_cell())
            .count()
    }

    /// Get the style name
    pub fn style_name(&self) -> Option<&str> {
        self.element.get_attribute(attrs::STYLE_NAME)
    }

    /// Set the style name
    pub fn set_style_name(&mut self, name: &str) {
        self.element.set_attribute(attrs::STYLE_NAME, name);
    }

    /// Style applied to cells without their own style
    pub fn default_cell_style_name(&self) -> Option<&str> {
        self.element.get_attribute(attrs::DEFAULT_CELL_STYLE_NAME)
    }

    /// `table:visibility`, "visible" when absent
    pub fn visibility(&self) -> &str {
        self.element
            .get_attribute(attrs::VISIBILITY)
            .unwrap_or("visible")
    }

    pub(crate) fn rows_repeated(&self) -> Result<usize> {
        repeat_count(&self.element, attrs::ROWS_REPEATED)
    }
}

impl From<TableRow> for Element {
    fn from(row: TableRow) -> Element {
        row.element
    }
}

// ============================================================================
// COLUMN
// ============================================================================

/// A table column definition element
#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    element: Element,
}

impl Default for TableColumn {
    fn default() -> Self {
        Self::new()
    }
}

impl TableColumn {
    /// Create a new table column
    pub fn new() -> Self {
        Self {
            element: Element::new(names::COLUMN),
        }
    }

    /// Create table column from element
    pub fn from_element(element: Element) -> Result<Self> {
        if element.tag() != TableTag::Column {
            return Err(Error::invalid_argument(format!(
                "<{}> is not a table column",
                element.tag_name()
            )));
        }
        Ok(Self { element })
    }

    /// Borrow the underlying element
    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Unwrap into the underlying element
    pub fn into_element(self) -> Element {
        self.element
    }

    /// Get the style name
    pub fn style_name(&self) -> Option<&str> {
        self.element.get_attribute(attrs::STYLE_NAME)
    }

    /// Set the style name
    pub fn set_style_name(&mut self, name: &str) {
        self.element.set_attribute(attrs::STYLE_NAME, name);
    }

    /// Get the default cell style name
    pub fn default_cell_style_name(&self) -> Option<&str> {
        self.element.get_attribute(attrs::DEFAULT_CELL_STYLE_NAME)
    }

    /// Set the default cell style name
    pub fn set_default_cell_style_name(&mut self, name: &str) {
        self.element.set_attribute(attrs::DEFAULT_CELL_STYLE_NAME, name);
    }

    /// `table:visibility`, "visible" when absent
    pub fn visibility(&self) -> &str {
        self.element
            .get_attribute(attrs::VISIBILITY)
            .unwrap_or("visible")
    }

    pub(crate) fn columns_repeated(&self) -> Result<usize> {
        repeat_count(&self.element, attrs::COLUMNS_REPEATED)
    }
}

impl From<TableColumn> for Element {
    fn from(col: TableColumn) -> Element {
        col.element
    }
}

// ============================================================================
// NODE FACTORY
// ============================================================================

/// A direct structural child of a table, wrapped by kind
#[derive(Debug, Clone, PartialEq)]
pub enum TableNode {
    Row(TableRow),
    Column(TableColumn),
    Cell(TableCell),
    CoveredCell(TableCell),
    /// Grouping containers, prelude/epilogue blocks and anything else
    Other(Element),
}

impl TableNode {
    /// Wrap `element` according to its tag
    pub fn wrap(element: Element) -> Self {
        match element.tag() {
            TableTag::Row => TableNode::Row(TableRow { element }),
            TableTag::Column => TableNode::Column(TableColumn { element }),
            TableTag::Cell => TableNode::Cell(TableCell { element }),
            TableTag::CoveredCell => TableNode::CoveredCell(TableCell { element }),
            _ => TableNode::Other(element),
        }
    }

    /// Borrow the wrapped element
    pub fn element(&self) -> &Element {
        match self {
            TableNode::Row(row) => &row.element,
            TableNode::Column(col) => &col.element,
            TableNode::Cell(cell) | TableNode::CoveredCell(cell) => &cell.element,
            TableNode::Other(element) => element,
        }
    }
}

impl From<TableNode> for Element {
    fn from(node: TableNode) -> Element {
        match node {
            TableNode::Row(row) => row.element,
            TableNode::Column(col) => col.element,
            TableNode::Cell(cell) | TableNode::CoveredCell(cell) => cell.element,
            TableNode::Other(element) => element,
        }
    }
}
