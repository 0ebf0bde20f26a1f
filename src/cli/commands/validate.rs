//! Validate config command implementation
//!
//! This module implements the `validate-config` command: the configuration
//! file and both credential files are loaded and checked, nothing is
//! connected.

use crate::config::{load_config, SinkCredentials, SourceCredentials};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let mut ok = true;

        match SourceCredentials::from_file(&config.source.credentials_path) {
            Ok(creds) => println!(
                "✅ Source credentials loaded ({}) from {}",
                creds.principal(),
                config.source.credentials_path
            ),
            Err(e) => {
                println!("❌ Source credentials: {e}");
                ok = false;
            }
        }

        if config.application.dry_run {
            println!("ℹ️  Dry run enabled; sink credentials are not needed");
        } else {
            match SinkCredentials::from_file(&config.target.credentials_path) {
                Ok(creds) => println!(
                    "✅ Sink credentials loaded (user {}) from {}",
                    creds.user, config.target.credentials_path
                ),
                Err(e) => {
                    println!("❌ Sink credentials: {e}");
                    ok = false;
                }
            }
        }

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Sheet: {}", config.source.target_sheet_name);
        if let Some(id) = &config.source.spreadsheet_id {
            println!("  Spreadsheet ID: {id}");
        }
        let columns: Vec<&str> = config
            .source
            .columns_to_read
            .iter()
            .map(|c| c.as_str())
            .collect();
        println!("  Columns: {}", columns.join(", "));
        println!("  Max Rows: {}", config.source.max_rows_to_copy);
        println!("  Target: {} ({})", config.target.kind, config.target.warehouse);
        println!(
            "  Table: {}.{}.{}",
            config.target.database, config.target.schema, config.target.table
        );
        let fields: Vec<&str> = config
            .target
            .field_names
            .iter()
            .map(|f| f.as_str())
            .collect();
        println!("  Fields: {}", fields.join(", "));
        println!("  Role: {}", config.target.role);
        println!("  Batch Size: {}", config.transfer.max_concurrent_write);
        println!("  Rate Limit Delay: {}s", config.transfer.rate_limit_delay);
        println!("  Skip First Row: {}", config.transfer.skip_first_row);
        println!("  Checkpoint: {}", config.transfer.checkpoint_path);
        println!();

        Ok(if ok { 0 } else { 2 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_config() {
        let code = ValidateArgs {}
            .execute("/nonexistent/sheetpipe.toml")
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
