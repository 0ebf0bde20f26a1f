//! External system integrations for sheetpipe.
//!
//! This module provides adapters for the systems a transfer talks to:
//!
//! - [`sheets`] - Google Sheets row source (Sheets v4, Drive v3 lookup)
//! - [`database`] - SQL sink abstraction, factory and dry-run sink
//! - [`snowflake`] - Snowflake sink over the REST session API
//! - [`postgresql`] - PostgreSQL sink
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind the [`sheets::RowSource`] and
//! [`database::SqlSink`] traits, so the transfer engine can be tested with
//! in-memory implementations.
//!
//! ```rust,no_run
//! use sheetpipe::adapters::database::create_sql_sink;
//! use sheetpipe::config::{load_config, SinkCredentials};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("sheetpipe.toml")?;
//! let credentials = SinkCredentials::from_file(&config.target.credentials_path)?;
//! let mut sink = create_sql_sink(&config.target, credentials).await?;
//! sink.apply_role(&config.target.role).await?;
//! sink.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod postgresql;
pub mod sheets;
pub mod snowflake;
