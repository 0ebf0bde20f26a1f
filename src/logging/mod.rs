//! Logging and observability
//!
//! This module provides structured logging with:
//! - Configurable log levels (`RUST_LOG` overrides the configured level)
//! - Console output
//! - Optional JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use sheetpipe::logging::init_logging;
//! use sheetpipe::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a committed batch
///
/// # Example
///
/// ```no_run
/// use sheetpipe::log_batch_committed;
///
/// log_batch_committed!(3, 10, 30);
/// ```
#[macro_export]
macro_rules! log_batch_committed {
    ($batch:expr, $rows:expr, $on_row:expr) => {
        tracing::info!(
            batch = $batch,
            rows = $rows,
            on_row = $on_row,
            "Batch committed"
        );
    };
}

/// Log the terminal state of a transfer
///
/// # Example
///
/// ```no_run
/// use sheetpipe::log_transfer_stopped;
///
/// log_transfer_stopped!("stopped_eof", 42);
/// ```
#[macro_export]
macro_rules! log_transfer_stopped {
    ($state:expr, $on_row:expr) => {
        tracing::info!(
            state = %$state,
            on_row = $on_row,
            "Transfer stopped"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use sheetpipe::log_error_with_context;
/// use sheetpipe::domain::SheetPipeError;
///
/// let error = SheetPipeError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
