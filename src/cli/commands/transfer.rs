//! Transfer command implementation
//!
//! This module implements the `transfer` command: copy rows from the
//! configured sheet into the target table, resuming from the checkpoint.

use crate::config::load_config;
use crate::core::transfer::{EngineState, TransferCoordinator, TransferSummary};
use clap::Args;
use tokio::sync::watch;

/// Exit code for a configuration error
pub const EXIT_CONFIGURATION: i32 = 2;
/// Exit code when the source or sink could not be opened
pub const EXIT_CONNECTION: i32 = 4;
/// Exit code when the run stopped on an error
pub const EXIT_RUN_ERROR: i32 = 5;
/// Exit code after a shutdown signal (SIGINT convention)
pub const EXIT_INTERRUPTED: i32 = 130;

/// Arguments for the transfer command
#[derive(Args, Debug, Default)]
pub struct TransferArgs {
    /// Dry run mode - log statements instead of executing them, keep no checkpoint
    #[arg(long)]
    pub dry_run: bool,

    /// Override the last row to read (source.max_rows_to_copy)
    #[arg(long, value_name = "N")]
    pub max_rows: Option<u64>,

    /// Override the batch size (transfer.max_concurrent_write)
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,

    /// Override the delay after each row read, in seconds
    #[arg(long, value_name = "SECONDS")]
    pub rate_limit_delay: Option<f64>,

    /// Leave row 1 out of the first batch
    #[arg(long)]
    pub skip_first_row: bool,

    /// Override the checkpoint file path
    #[arg(long, value_name = "PATH")]
    pub checkpoint: Option<String>,
}

impl TransferArgs {
    /// Execute the transfer command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting transfer command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(EXIT_CONFIGURATION);
            }
        };

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }
        if let Some(max_rows) = self.max_rows {
            tracing::info!(max_rows = max_rows, "Overriding row limit from CLI");
            config.source.max_rows_to_copy = max_rows;
        }
        if let Some(batch_size) = self.batch_size {
            tracing::info!(batch_size = batch_size, "Overriding batch size from CLI");
            config.transfer.max_concurrent_write = batch_size;
        }
        if let Some(delay) = self.rate_limit_delay {
            tracing::info!(delay_secs = delay, "Overriding rate limit delay from CLI");
            config.transfer.rate_limit_delay = delay;
        }
        if self.skip_first_row {
            config.transfer.skip_first_row = true;
        }
        if let Some(checkpoint) = &self.checkpoint {
            tracing::info!(checkpoint = %checkpoint, "Overriding checkpoint path from CLI");
            config.transfer.checkpoint_path = checkpoint.clone();
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(EXIT_CONFIGURATION);
        }

        if config.application.dry_run {
            println!("🔍 DRY RUN MODE - statements are logged, nothing is written");
            println!();
        }

        let coordinator = match TransferCoordinator::new(config, shutdown_signal).await {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize transfer");
                eprintln!("Failed to initialize transfer: {e}");
                return Ok(if e.is_configuration() {
                    EXIT_CONFIGURATION
                } else {
                    EXIT_CONNECTION
                });
            }
        };

        println!("🚀 Starting transfer...");
        println!();

        let summary = coordinator.execute().await;
        print_summary(&summary);

        Ok(exit_code(summary.final_state))
    }
}

/// Map a terminal engine state to the process exit code
pub fn exit_code(state: EngineState) -> i32 {
    match state {
        EngineState::StoppedEof | EngineState::StoppedLimitReached => 0,
        EngineState::StoppedInterrupted => EXIT_INTERRUPTED,
        EngineState::StoppedError | EngineState::Idle | EngineState::Running => EXIT_RUN_ERROR,
    }
}

fn print_summary(summary: &TransferSummary) {
    println!();
    println!("📊 Transfer Summary:");
    println!("  Final State: {}", summary.final_state);
    println!("  Rows Read: {}", summary.rows_read);
    println!("  Rows Inserted: {}", summary.rows_inserted);
    println!("  Batches Committed: {}", summary.batches_committed());
    println!(
        "  Checkpoint: row {} -> row {}",
        summary.start_row, summary.committed_row
    );
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    match summary.final_state {
        EngineState::StoppedEof => {
            println!("✅ Transfer complete: reached the end of the data");
        }
        EngineState::StoppedLimitReached => {
            println!("✅ Transfer complete: reached the configured row limit");
        }
        EngineState::StoppedInterrupted => {
            println!("⚠️  Transfer interrupted. Progress saved at row {}.", summary.committed_row);
            println!("   Run the same command to resume from the checkpoint.");
        }
        _ => {
            println!("❌ Transfer stopped on error");
            if let Some(error) = &summary.error {
                println!("   Error: {error}");
            }
            println!("   Run the same command to resume from row {}.", summary.committed_row + 1);
        }
    }
    println!();
}
