//! Integration tests for dry-run mode
//!
//! These tests run the full coordinator against a mocked Sheets API and
//! verify that a dry run reads rows normally, writes nothing and leaves the
//! checkpoint file untouched.

use mockito::{Mock, Server, ServerGuard};
use sheetpipe::config::SheetPipeConfig;
use sheetpipe::core::state::{CheckpointState, CheckpointStore, FileCheckpointStore};
use sheetpipe::core::transfer::{EngineState, TransferCoordinator};
use std::path::Path;
use tempfile::TempDir;
use tokio::sync::watch;

fn dry_run_config(api_url: &str, dir: &Path, max_rows: u64) -> SheetPipeConfig {
    let credentials = dir.join("googlesheets.json");
    std::fs::write(&credentials, r#"{"access_token":"test-token"}"#).unwrap();

    let toml = format!(
        r#"
[application]
dry_run = true

[source]
target_sheet_name = "Orders"
spreadsheet_id = "sheet-1"
columns_to_read = ["A", "B"]
max_rows_to_copy = {max_rows}
credentials_path = "{credentials}"
api_base_url = "{api_url}"

[target]
warehouse = "COMPUTE_WH"
database = "ANALYTICS"
schema = "PUBLIC"
table = "ORDERS"
field_names = ["ID", "NAME"]
role = "LOADER"
credentials_path = "{missing}"

[transfer]
rate_limit_delay = 0
max_concurrent_write = 2
checkpoint_path = "{checkpoint}"
"#,
        credentials = credentials.display(),
        missing = dir.join("does-not-exist.json").display(),
        checkpoint = dir.join("events.log").display(),
    );
    let config: SheetPipeConfig = toml::from_str(&toml).unwrap();
    config.validate().unwrap();
    config
}

async fn mock_cell(server: &mut ServerGuard, cell: &str, value: Option<&str>) -> Mock {
    let body = match value {
        Some(v) => format!(r#"{{"range":"Sheet1!{cell}","values":[["{v}"]]}}"#),
        None => format!(r#"{{"range":"Sheet1!{cell}"}}"#),
    };
    server
        .mock("GET", format!("/spreadsheets/sheet-1/values/{cell}").as_str())
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_body(body)
        .create_async()
        .await
}

#[tokio::test]
async fn test_dry_run_reads_rows_without_persisting() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();

    let mut mocks = Vec::new();
    for row in 1..=3 {
        mocks.push(mock_cell(&mut server, &format!("A{row}"), Some(&row.to_string())).await);
        mocks.push(mock_cell(&mut server, &format!("B{row}"), Some(&format!("item {row}"))).await);
    }

    let config = dry_run_config(&server.url(), dir.path(), 3);
    let (_tx, rx) = watch::channel(false);

    // Sink credentials are not needed in a dry run
    let coordinator = TransferCoordinator::new(config, rx).await.unwrap();
    let summary = coordinator.execute().await;

    assert_eq!(summary.final_state, EngineState::StoppedLimitReached);
    assert_eq!(summary.batch_sizes, vec![2, 1]);
    assert_eq!(summary.rows_inserted, 3);
    for mock in mocks {
        mock.assert_async().await;
    }

    assert!(!dir.path().join("events.log").exists());
}

#[tokio::test]
async fn test_dry_run_starts_from_existing_checkpoint() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();

    let store = FileCheckpointStore::new(dir.path().join("events.log"));
    let mut seed = CheckpointState::default();
    seed.cursor_row = 2;
    seed.committed_statements
        .push("INSERT INTO ANALYTICS.PUBLIC.ORDERS (ID,NAME) VALUES (1,'item 1'),(2,'item 2')".to_string());
    store.save(&seed).await.unwrap();
    let before = std::fs::read_to_string(store.path()).unwrap();

    let row3a = mock_cell(&mut server, "A3", Some("3")).await;
    let row3b = mock_cell(&mut server, "B3", Some("item 3")).await;
    let _row4a = mock_cell(&mut server, "A4", None).await;
    let _row4b = mock_cell(&mut server, "B4", None).await;

    let config = dry_run_config(&server.url(), dir.path(), 10);
    let (_tx, rx) = watch::channel(false);
    let summary = TransferCoordinator::new(config, rx)
        .await
        .unwrap()
        .execute()
        .await;

    assert_eq!(summary.start_row, 2);
    assert_eq!(summary.final_state, EngineState::StoppedEof);
    assert_eq!(summary.batch_sizes, vec![1]);
    assert_eq!(summary.committed_row, 3);
    row3a.assert_async().await;
    row3b.assert_async().await;

    assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
}
