//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for sheetpipe using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// sheetpipe - Google Sheets to SQL table transfer
#[derive(Parser, Debug)]
#[command(name = "sheetpipe")]
#[command(version, about, long_about = None)]
#[command(author = "Sheetpipe Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "sheetpipe.toml", env = "SHEETPIPE_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SHEETPIPE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy rows from the sheet into the target table, resuming from the checkpoint
    Transfer(commands::transfer::TransferArgs),

    /// Show the checkpoint of the configured transfer
    Status(commands::status::StatusArgs),

    /// Validate configuration and credential files
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_transfer() {
        let cli = Cli::parse_from(["sheetpipe", "transfer"]);
        assert_eq!(cli.config, "sheetpipe.toml");
        assert!(matches!(cli.command, Commands::Transfer(_)));
    }

    #[test]
    fn test_cli_parse_transfer_overrides() {
        let cli = Cli::parse_from([
            "sheetpipe",
            "-c",
            "orders.toml",
            "transfer",
            "--dry-run",
            "--max-rows",
            "23",
            "--batch-size",
            "5",
            "--rate-limit-delay",
            "0.5",
            "--skip-first-row",
            "--checkpoint",
            "orders.log",
        ]);
        assert_eq!(cli.config, "orders.toml");
        match cli.command {
            Commands::Transfer(args) => {
                assert!(args.dry_run);
                assert_eq!(args.max_rows, Some(23));
                assert_eq!(args.batch_size, Some(5));
                assert_eq!(args.rate_limit_delay, Some(0.5));
                assert!(args.skip_first_row);
                assert_eq!(args.checkpoint.as_deref(), Some("orders.log"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["sheetpipe", "--log-level", "debug", "transfer"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_status() {
        let cli = Cli::parse_from(["sheetpipe", "status", "--show-statements"]);
        match cli.command {
            Commands::Status(args) => assert!(args.show_statements),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["sheetpipe", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["sheetpipe", "init", "--output", "x.toml", "--force"]);
        match cli.command {
            Commands::Init(args) => {
                assert_eq!(args.output, "x.toml");
                assert!(args.force);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
