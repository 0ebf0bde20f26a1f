//! Domain models and types for sheetpipe.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Validated names** ([`ColumnLabel`], [`SqlIdentifier`], [`QualifiedTable`])
//! - **Typed cell values** ([`RowValue`])
//! - **Error types** ([`SheetPipeError`], [`SourceError`], [`SinkError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, SheetPipeError>`]:
//!
//! ```rust
//! use sheetpipe::domain::{ColumnLabel, Result, SheetPipeError};
//!
//! fn parse_columns(raw: &[&str]) -> Result<Vec<ColumnLabel>> {
//!     raw.iter()
//!         .map(|c| ColumnLabel::new(*c).map_err(SheetPipeError::Configuration))
//!         .collect()
//! }
//! # assert!(parse_columns(&["A", "B"]).is_ok());
//! ```

pub mod errors;
pub mod ids;
pub mod result;
pub mod value;

// Re-export commonly used types for convenience
pub use errors::{SheetPipeError, SinkError, SourceError};
pub use ids::{CellRef, ColumnLabel, QualifiedTable, SqlIdentifier};
pub use result::Result;
pub use value::{coerce_row, RowValue};
