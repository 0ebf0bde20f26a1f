//! Database abstraction layer
//!
//! This module provides a trait-based abstraction for writing to the target
//! database, allowing sheetpipe to work with different backends (Snowflake,
//! PostgreSQL) and with a logging-only dry-run sink.

pub mod dry_run;
pub mod factory;
pub mod traits;

pub use dry_run::DryRunSink;
pub use factory::create_sql_sink;
pub use traits::SqlSink;
