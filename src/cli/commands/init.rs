//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "sheetpipe.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing sheetpipe configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, Self::sample_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your sheet and table settings", self.output);
                println!("  2. Create googlesheets.json with an access_token (or api_key)");
                println!("  3. Create snowflake.json with user, password and account");
                println!("  4. Validate configuration: sheetpipe validate-config");
                println!("  5. Preview the statements: sheetpipe transfer --dry-run");
                println!("  6. Run the transfer: sheetpipe transfer");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Sample configuration with every option documented
    pub fn sample_config() -> String {
        r#"# sheetpipe configuration
# Copies rows from a Google Sheet into a Snowflake or PostgreSQL table.
#
# ${VAR} placeholders are replaced from the environment, and any key can be
# overridden with SHEETPIPE_<SECTION>_<KEY> (e.g. SHEETPIPE_SOURCE_MAX_ROWS_TO_COPY).

[application]
# trace | debug | info | warn | error
log_level = "info"

# Log statements instead of executing them; the checkpoint file is not written
dry_run = false

[source]
# Spreadsheet title, looked up through the Drive API
target_sheet_name = "Orders"

# Spreadsheet ID; skips the title lookup when set
# spreadsheet_id = "1AbCdEfGhIjKlMnOpQrStUvWxYz"

# Worksheet (tab); the first worksheet is used when unset
# worksheet = "Sheet1"

# Columns to read, paired one-to-one with target.field_names
columns_to_read = ["A", "B", "C"]

# Last row (1-based, inclusive) to read
max_rows_to_copy = 500

# JSON file with access_token (or api_key) and optional client_email
credentials_path = "googlesheets.json"

[target]
# snowflake | postgresql
kind = "snowflake"

warehouse = "COMPUTE_WH"
database = "ANALYTICS"
schema = "PUBLIC"
table = "ORDERS"
field_names = ["ID", "NAME", "AMOUNT"]

# Role applied once before the first write
role = "LOADER"

# JSON file with user, password and account
# (for PostgreSQL, account is host[:port])
credentials_path = "snowflake.json"

[transfer]
# Seconds to wait after every row read (keeps under the Sheets read quota)
rate_limit_delay = 2.7

# Rows per insert statement
max_concurrent_write = 10

# Read row 1 but leave it out of the first batch (header row)
skip_first_row = false

# Checkpoint record; delete it to start over from row 1
checkpoint_path = "events.log"

[logging]
# JSON log files in addition to console output
local_enabled = false
local_path = "./logs"

# daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SheetPipeConfig;
    use tempfile::TempDir;

    #[test]
    fn test_sample_config_is_valid() {
        let config: SheetPipeConfig = toml::from_str(&InitArgs::sample_config()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.source.columns_to_read.len(), 3);
        assert_eq!(config.transfer.max_concurrent_write, 10);
    }

    #[tokio::test]
    async fn test_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("sheetpipe.toml");
        fs::write(&output, "existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().to_string(),
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "existing");

        let args = InitArgs {
            output: output.to_string_lossy().to_string(),
            force: true,
        };
        assert_eq!(args.execute().await.unwrap(), 0);
        assert!(fs::read_to_string(&output).unwrap().contains("[transfer]"));
    }
}
