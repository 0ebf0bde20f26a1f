//! Integration tests for logging functionality
//!
//! The global subscriber can only be installed once per process, so a single
//! test owns initialization.

use sheetpipe::config::LoggingConfig;
use sheetpipe::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_file_logging_writes_json_lines() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };

    let guard = init_logging("info", &config).unwrap();
    assert!(log_path.is_dir());

    tracing::info!(target: "sheetpipe::transfer", batch = 1, rows = 10, "Batch committed");

    // A second subscriber cannot be installed
    assert!(init_logging("info", &LoggingConfig::default()).is_err());

    drop(guard);

    let contents = std::fs::read_to_string(log_path.join("sheetpipe.log")).unwrap();
    let line = contents
        .lines()
        .find(|l| l.contains("Batch committed"))
        .unwrap();
    let entry: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(entry["level"], "INFO");
    assert_eq!(entry["fields"]["rows"], 10);
    assert_eq!(entry["target"], "sheetpipe::transfer");
}
