//! Configuration schema types
//!
//! This module defines the configuration structure for sheetpipe. Each section
//! validates itself; [`SheetPipeConfig::validate`] runs them all and also
//! checks the cross-section invariant that every read column maps to exactly
//! one target field.

use crate::domain::{ColumnLabel, SqlIdentifier};
use serde::{Deserialize, Serialize};

/// Default rate limit delay between row reads, in seconds
pub const DEFAULT_RATE_LIMIT_DELAY_SECS: f64 = 2.7;

/// Default number of rows per insert statement
pub const DEFAULT_MAX_CONCURRENT_WRITE: usize = 10;

/// Target database selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Snowflake (session REST API)
    #[default]
    Snowflake,
    /// PostgreSQL (native protocol)
    PostgreSQL,
}

impl std::fmt::Display for SinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkKind::Snowflake => write!(f, "snowflake"),
            SinkKind::PostgreSQL => write!(f, "postgresql"),
        }
    }
}

/// Main sheetpipe configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetPipeConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Source spreadsheet settings
    pub source: SourceConfig,

    /// Target table settings
    pub target: TargetConfig,

    /// Transfer engine settings
    #[serde(default)]
    pub transfer: TransferConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SheetPipeConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.source.validate()?;
        self.target.validate()?;
        self.transfer.validate()?;
        self.logging.validate()?;

        if self.source.columns_to_read.len() != self.target.field_names.len() {
            return Err(format!(
                "source.columns_to_read has {} entries but target.field_names has {}; they must pair up one-to-one",
                self.source.columns_to_read.len(),
                self.target.field_names.len()
            ));
        }
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (log statements instead of executing them, keep no checkpoint)
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Source spreadsheet configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Title of the spreadsheet to read
    pub target_sheet_name: String,

    /// Spreadsheet ID; when set, the Drive lookup by title is skipped
    #[serde(default)]
    pub spreadsheet_id: Option<String>,

    /// Worksheet (tab) name; the first worksheet is used when unset
    #[serde(default)]
    pub worksheet: Option<String>,

    /// Column labels to read, in target field order
    pub columns_to_read: Vec<ColumnLabel>,

    /// Last row (1-based, inclusive) the transfer may read
    pub max_rows_to_copy: u64,

    /// Path to the source credentials JSON file
    #[serde(default = "default_source_credentials_path")]
    pub credentials_path: String,

    /// Sheets API base URL
    #[serde(default = "default_sheets_api_url")]
    pub api_base_url: String,

    /// Drive API base URL (spreadsheet lookup by title)
    #[serde(default = "default_drive_api_url")]
    pub drive_base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl SourceConfig {
    fn validate(&self) -> Result<(), String> {
        if self.target_sheet_name.trim().is_empty() && self.spreadsheet_id.is_none() {
            return Err("source.target_sheet_name cannot be empty".to_string());
        }

        if self.columns_to_read.is_empty() {
            return Err("source.columns_to_read must list at least one column".to_string());
        }

        if self.max_rows_to_copy == 0 {
            return Err("source.max_rows_to_copy must be > 0".to_string());
        }

        for url in [&self.api_base_url, &self.drive_base_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!(
                    "source API URL '{url}' must start with http:// or https://"
                ));
            }
        }

        if self.timeout_seconds == 0 {
            return Err("source.timeout_seconds must be > 0".to_string());
        }

        Ok(())
    }
}

/// Target table configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Target database kind
    #[serde(default)]
    pub kind: SinkKind,

    /// Warehouse (Snowflake compute warehouse; informational for PostgreSQL)
    pub warehouse: String,

    /// Database name
    pub database: SqlIdentifier,

    /// Schema name
    pub schema: SqlIdentifier,

    /// Table name
    pub table: SqlIdentifier,

    /// Target field names, paired with `source.columns_to_read`
    pub field_names: Vec<SqlIdentifier>,

    /// Session role applied before the first write
    pub role: SqlIdentifier,

    /// Path to the sink credentials JSON file
    #[serde(default = "default_target_credentials_path")]
    pub credentials_path: String,

    /// Endpoint override (Snowflake base URL); derived from the account when unset
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl TargetConfig {
    fn validate(&self) -> Result<(), String> {
        if self.warehouse.trim().is_empty() {
            return Err("target.warehouse cannot be empty".to_string());
        }

        if self.field_names.is_empty() {
            return Err("target.field_names must list at least one field".to_string());
        }

        if let Some(endpoint) = &self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err("target.endpoint must start with http:// or https://".to_string());
            }
        }

        if self.timeout_seconds == 0 {
            return Err("target.timeout_seconds must be > 0".to_string());
        }

        Ok(())
    }
}

/// Transfer engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Fixed delay after every row read, in seconds
    #[serde(default = "default_rate_limit_delay")]
    pub rate_limit_delay: f64,

    /// Maximum rows per insert statement
    #[serde(default = "default_max_concurrent_write")]
    pub max_concurrent_write: usize,

    /// Read row 1 but leave it out of the first batch (header row)
    #[serde(default)]
    pub skip_first_row: bool,

    /// Path of the checkpoint record
    #[serde(default = "default_checkpoint_path")]
    pub checkpoint_path: String,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            rate_limit_delay: default_rate_limit_delay(),
            max_concurrent_write: default_max_concurrent_write(),
            skip_first_row: false,
            checkpoint_path: default_checkpoint_path(),
        }
    }
}

impl TransferConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.rate_limit_delay.is_finite() || self.rate_limit_delay < 0.0 {
            return Err(format!(
                "transfer.rate_limit_delay must be a non-negative number of seconds, got {}",
                self.rate_limit_delay
            ));
        }

        if self.max_concurrent_write == 0 {
            return Err("transfer.max_concurrent_write must be > 0".to_string());
        }

        if self.checkpoint_path.trim().is_empty() {
            return Err("transfer.checkpoint_path cannot be empty".to_string());
        }

        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled = true".to_string());
        }

        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_source_credentials_path() -> String {
    "googlesheets.json".to_string()
}

fn default_target_credentials_path() -> String {
    "snowflake.json".to_string()
}

fn default_sheets_api_url() -> String {
    "https://sheets.googleapis.com/v4".to_string()
}

fn default_drive_api_url() -> String {
    "https://www.googleapis.com/drive/v3".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_rate_limit_delay() -> f64 {
    DEFAULT_RATE_LIMIT_DELAY_SECS
}

fn default_max_concurrent_write() -> usize {
    DEFAULT_MAX_CONCURRENT_WRITE
}

fn default_checkpoint_path() -> String {
    "events.log".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
