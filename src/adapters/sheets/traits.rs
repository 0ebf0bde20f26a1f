//! Row source abstraction
//!
//! The transfer engine only needs one capability from the spreadsheet: read a
//! single cell by column label and 1-based row index.

use crate::domain::ids::ColumnLabel;
use crate::domain::Result;
use async_trait::async_trait;

/// Cell-addressable row source
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Short description of the source for log messages
    fn describe(&self) -> String;

    /// Read one cell
    ///
    /// # Arguments
    ///
    /// * `column` - Column label in A1 notation
    /// * `row` - 1-based row index
    ///
    /// # Returns
    ///
    /// `Ok(None)` for an empty or absent cell, `Ok(Some(text))` otherwise.
    ///
    /// # Errors
    ///
    /// Returns a `SourceError` (quota, auth, transport). Errors are fatal for
    /// the current run.
    async fn read_cell(&self, column: &ColumnLabel, row: u64) -> Result<Option<String>>;
}
