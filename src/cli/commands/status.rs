//! Status command implementation
//!
//! This module implements the `status` command for displaying the
//! checkpoint of the configured transfer.

use crate::config::load_config;
use crate::core::state::{CheckpointStore, FileCheckpointStore};
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    /// Print every committed statement
    #[arg(long)]
    pub show_statements: bool,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking transfer status");

        println!("📊 Transfer Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let store = FileCheckpointStore::new(&config.transfer.checkpoint_path);
        if !store.path().exists() {
            println!("No checkpoint found at {}.", store.location());
            println!("Run 'sheetpipe transfer' to start copying rows.");
            return Ok(0);
        }

        let checkpoint = store.load().await;
        let max_row = config.source.max_rows_to_copy;

        println!("  Checkpoint: {}", store.location());
        println!(
            "  Last committed row: {} of {}",
            checkpoint.cursor_row, max_row
        );
        println!("  Next row to read: {}", checkpoint.cursor_row + 1);
        println!("  Batches committed: {}", checkpoint.committed_batches());
        println!("  Columns: {}", checkpoint.read_columns.join(", "));
        println!("  Fields: {}", checkpoint.target_fields.join(", "));
        match checkpoint.updated_at {
            Some(updated_at) => {
                println!("  Updated: {}", updated_at.format("%Y-%m-%d %H:%M:%S UTC"))
            }
            None => println!("  Updated: unknown"),
        }

        if checkpoint.cursor_row >= max_row {
            println!();
            println!("✅ Row limit reached; a new transfer has nothing to read");
        }

        if self.show_statements && !checkpoint.committed_statements.is_empty() {
            println!();
            println!("Committed statements:");
            for (i, statement) in checkpoint.committed_statements.iter().enumerate() {
                println!("  {:>4}. {}", i + 1, statement);
            }
        } else if let Some(last) = checkpoint.last_statement() {
            println!();
            println!("Last statement:");
            println!("  {last}");
        }

        println!();
        Ok(0)
    }
}
