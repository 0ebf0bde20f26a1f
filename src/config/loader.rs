//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::SheetPipeConfig;
use crate::domain::errors::SheetPipeError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into SheetPipeConfig
/// 4. Applies environment variable overrides (SHEETPIPE_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns a `Configuration` error if any step fails.
///
/// # Examples
///
/// ```no_run
/// use sheetpipe::config::loader::load_config;
///
/// let config = load_config("sheetpipe.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SheetPipeConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SheetPipeError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SheetPipeError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: SheetPipeConfig = toml::from_str(&contents)
        .map_err(|e| SheetPipeError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        SheetPipeError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern is a valid regex")
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = env_var_pattern();
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(SheetPipeError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Parse an override value, reporting the variable name on failure
fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        SheetPipeError::Configuration(format!("Invalid value '{value}' for {name}"))
    })
}

/// Applies environment variable overrides using SHEETPIPE_* prefix
///
/// Environment variables follow the pattern: SHEETPIPE_<SECTION>_<KEY>
/// For example: SHEETPIPE_SOURCE_MAX_ROWS_TO_COPY, SHEETPIPE_TRANSFER_SKIP_FIRST_ROW
fn apply_env_overrides(config: &mut SheetPipeConfig) -> Result<()> {
    let var = |name: &str| std::env::var(name).ok();

    // Application overrides
    if let Some(val) = var("SHEETPIPE_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = var("SHEETPIPE_APPLICATION_DRY_RUN") {
        config.application.dry_run = parse_override("SHEETPIPE_APPLICATION_DRY_RUN", &val)?;
    }

    // Source overrides
    if let Some(val) = var("SHEETPIPE_SOURCE_SPREADSHEET_ID") {
        config.source.spreadsheet_id = Some(val);
    }
    if let Some(val) = var("SHEETPIPE_SOURCE_MAX_ROWS_TO_COPY") {
        config.source.max_rows_to_copy =
            parse_override("SHEETPIPE_SOURCE_MAX_ROWS_TO_COPY", &val)?;
    }
    if let Some(val) = var("SHEETPIPE_SOURCE_CREDENTIALS_PATH") {
        config.source.credentials_path = val;
    }

    // Target overrides
    if let Some(val) = var("SHEETPIPE_TARGET_ROLE") {
        config.target.role = parse_override("SHEETPIPE_TARGET_ROLE", &val)?;
    }
    if let Some(val) = var("SHEETPIPE_TARGET_WAREHOUSE") {
        config.target.warehouse = val;
    }
    if let Some(val) = var("SHEETPIPE_TARGET_CREDENTIALS_PATH") {
        config.target.credentials_path = val;
    }

    // Transfer overrides
    if let Some(val) = var("SHEETPIPE_TRANSFER_RATE_LIMIT_DELAY") {
        config.transfer.rate_limit_delay =
            parse_override("SHEETPIPE_TRANSFER_RATE_LIMIT_DELAY", &val)?;
    }
    if let Some(val) = var("SHEETPIPE_TRANSFER_MAX_CONCURRENT_WRITE") {
        config.transfer.max_concurrent_write =
            parse_override("SHEETPIPE_TRANSFER_MAX_CONCURRENT_WRITE", &val)?;
    }
    if let Some(val) = var("SHEETPIPE_TRANSFER_SKIP_FIRST_ROW") {
        config.transfer.skip_first_row =
            parse_override("SHEETPIPE_TRANSFER_SKIP_FIRST_ROW", &val)?;
    }
    if let Some(val) = var("SHEETPIPE_TRANSFER_CHECKPOINT_PATH") {
        config.transfer.checkpoint_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_skips_comments() {
        let input = "# password = \"${SHEETPIPE_TEST_UNSET_IN_COMMENT}\"\nkey = 1";
        let output = substitute_env_vars(input).unwrap();
        assert!(output.contains("${SHEETPIPE_TEST_UNSET_IN_COMMENT}"));
    }

    #[test]
    fn test_substitute_reports_missing() {
        let input = "a = \"${SHEETPIPE_TEST_MISSING_ONE}\"\nb = \"${SHEETPIPE_TEST_MISSING_ONE}\"";
        let err = substitute_env_vars(input).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("SHEETPIPE_TEST_MISSING_ONE"));
        assert_eq!(msg.matches("SHEETPIPE_TEST_MISSING_ONE").count(), 1);
    }

    #[test]
    fn test_parse_override() {
        assert_eq!(parse_override::<u64>("X", " 25 ").unwrap(), 25);
        assert!(parse_override::<bool>("X", "yes").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config("/nonexistent/sheetpipe.toml").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
