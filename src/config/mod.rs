//! Configuration management for sheetpipe.
//!
//! sheetpipe reads a TOML run configuration plus two JSON credential files.
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and dry-run switch
//! - [`SourceConfig`] - Spreadsheet, columns to read and row limit
//! - [`TargetConfig`] - Target database, table, fields and session role
//! - [`TransferConfig`] - Pacing, batch size, header skipping, checkpoint path
//! - [`LoggingConfig`] - Optional rolling file logs
//!
//! # Example Configuration
//!
//! ```toml
//! [source]
//! target_sheet_name = "Orders"
//! columns_to_read = ["A", "B", "C"]
//! max_rows_to_copy = 500
//!
//! [target]
//! warehouse = "COMPUTE_WH"
//! database = "ANALYTICS"
//! schema = "PUBLIC"
//! table = "ORDERS"
//! field_names = ["ID", "CUSTOMER", "AMOUNT"]
//! role = "${SHEETPIPE_ROLE}"
//!
//! [transfer]
//! rate_limit_delay = 2.7
//! max_concurrent_write = 10
//! ```
//!
//! `${VAR_NAME}` placeholders are substituted from the environment, and
//! `SHEETPIPE_<SECTION>_<KEY>` variables override single keys.

pub mod credentials;
pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use credentials::{
    ServiceAccountKey, SinkCredentials, SourceAuth, SourceCredentials, GOOGLE_TOKEN_URI,
};
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, LoggingConfig, SheetPipeConfig, SinkKind, SourceConfig, TargetConfig,
    TransferConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
