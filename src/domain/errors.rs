//! Domain error types
//!
//! This module defines the error hierarchy for sheetpipe. Errors from the
//! source (Google Sheets) and the sink (Snowflake, PostgreSQL) are kept in
//! their own enums so the engine can tell a failed read from a failed write
//! without inspecting message text. No third-party error types leak through.

use thiserror::Error;

/// Main sheetpipe error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum SheetPipeError {
    /// Configuration-related errors (missing or invalid run options)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Credential file errors
    #[error("Credentials error: {0}")]
    Credentials(String),

    /// Errors reading cells from the source sheet
    #[error("Source read error: {0}")]
    Source(#[from] SourceError),

    /// Errors writing statements to the target database
    #[error("Sink write error: {0}")]
    Sink(#[from] SinkError),

    /// Errors persisting or loading the checkpoint
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl SheetPipeError {
    /// Whether this error was raised before the transfer engine could start
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SheetPipeError::Configuration(_)
                | SheetPipeError::Credentials(_)
                | SheetPipeError::Validation(_)
        )
    }
}

/// Source-side errors
///
/// Errors that occur when reading cells from the spreadsheet service.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Upstream request quota exhausted (HTTP 429)
    #[error("Read quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Credentials rejected (HTTP 401/403)
    #[error("Access denied: {0}")]
    Unauthorized(String),

    /// Spreadsheet or range not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transport-level failure
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Unexpected response body
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Sink-side errors
///
/// Errors that occur when talking to the target SQL database.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Failed to connect or open a session
    #[error("Failed to connect: {0}")]
    ConnectionFailed(String),

    /// Login rejected
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The session role could not be applied
    #[error("Failed to apply role {role}: {message}")]
    RoleRejected { role: String, message: String },

    /// Statement execution failed
    #[error("Statement execution failed: {0}")]
    ExecutionFailed(String),

    /// Unexpected response from the database service
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The sink was used after being closed
    #[error("Session already closed")]
    Closed,
}

// Conversion from std::io::Error
impl From<std::io::Error> for SheetPipeError {
    fn from(err: std::io::Error) -> Self {
        SheetPipeError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for SheetPipeError {
    fn from(err: serde_json::Error) -> Self {
        SheetPipeError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for SheetPipeError {
    fn from(err: toml::de::Error) -> Self {
        SheetPipeError::Configuration(format!("TOML parse error: {err}"))
    }
}
