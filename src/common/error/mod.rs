//! Unified error types for the table core.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Axis, Error, Result};
