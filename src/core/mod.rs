//! Core business logic for sheetpipe.
//!
//! # Modules
//!
//! - [`transfer`] - Transfer engine, batching, rate limiting and coordination
//! - [`state`] - Checkpoint model and persistence for resumable runs
//!
//! # Transfer Workflow
//!
//! 1. **Load checkpoint**: resume after the last committed row
//! 2. **Apply role**: switch the sink session to the configured role
//! 3. **Read**: fetch one row at a time, one cell per configured column
//! 4. **Batch**: accumulate rows until the batch is full
//! 5. **Commit**: execute one multi-row insert, then save the checkpoint
//! 6. **Stop**: on end-of-data, row limit, error or shutdown signal
//!
//! # Example
//!
//! ```rust,no_run
//! use sheetpipe::config::load_config;
//! use sheetpipe::core::transfer::TransferCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("sheetpipe.toml")?;
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let coordinator = TransferCoordinator::new(config, shutdown_rx).await?;
//! let summary = coordinator.execute().await;
//!
//! println!("State: {}", summary.final_state);
//! println!("Rows inserted: {}", summary.rows_inserted);
//! # Ok(())
//! # }
//! ```

pub mod state;
pub mod transfer;
