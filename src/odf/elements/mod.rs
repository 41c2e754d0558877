//! ODF XML element classes.
//!
//! A small element tree with an XML loader and serializer, the tag
//! dispatch table, and typed wrappers for the table elements.

/// Core element functionality
pub mod element;
/// Table-related elements (rows, columns, cells)
pub mod table;
/// Expansion of repeated rows, columns and cells
pub mod table_expansion;
/// Compile-time tag lookup
pub mod tag_matcher;
