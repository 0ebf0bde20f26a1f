//! Result type alias for sheetpipe

use super::errors::SheetPipeError;

/// Result type alias for sheetpipe operations
///
/// # Examples
///
/// ```
/// use sheetpipe::domain::result::Result;
/// use sheetpipe::domain::errors::SheetPipeError;
///
/// fn failing_function() -> Result<()> {
///     Err(SheetPipeError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, SheetPipeError>;
