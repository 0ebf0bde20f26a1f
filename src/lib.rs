// sheetpipe - Google Sheets to Snowflake/PostgreSQL transfer tool
// Copyright (c) 2025 Sheetpipe Contributors
// Licensed under the MIT License

//! # sheetpipe - resumable sheet-to-table transfer
//!
//! sheetpipe copies rows from a Google Sheet into a Snowflake or PostgreSQL
//! table, a bounded batch at a time, pacing its reads to stay under the
//! Sheets API quota and recording a checkpoint after every committed batch so
//! an interrupted run resumes where it left off.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Transfer engine, batching, rate limiting, checkpoints
//! - [`adapters`] - External integrations (Google Sheets, Snowflake, PostgreSQL)
//! - [`domain`] - Core domain types (identifiers, row values, errors)
//! - [`config`] - Configuration and credential loading
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sheetpipe::config::load_config;
//! use sheetpipe::core::transfer::TransferCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("sheetpipe.toml")?;
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//!     let summary = TransferCoordinator::new(config, shutdown_rx)
//!         .await?
//!         .execute()
//!         .await;
//!
//!     println!("Inserted {} rows ({})", summary.rows_inserted, summary.final_state);
//!     Ok(())
//! }
//! ```
//!
//! ## Value coercion
//!
//! Cells that parse as finite numbers are inserted unquoted, other text is
//! inserted as a quoted literal and empty cells become `NULL`:
//!
//! ```rust
//! use sheetpipe::domain::RowValue;
//!
//! assert_eq!(RowValue::from_cell(Some("42.5")).to_sql_literal(), "42.5");
//! assert_eq!(RowValue::from_cell(Some("it's")).to_sql_literal(), "'it''s'");
//! assert_eq!(RowValue::from_cell(Some("")).to_sql_literal(), "NULL");
//! ```
//!
//! ## End of data
//!
//! The first row whose every configured cell is empty ends the transfer. The
//! populated rows of the batch in progress are committed as a shorter batch,
//! so a later run picks up rows appended to the sheet after the last one.
//!
//! ## Error Handling
//!
//! Library code returns [`domain::Result`] with [`domain::SheetPipeError`];
//! the CLI converts terminal states to process exit codes.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
