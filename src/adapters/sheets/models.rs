//! Google Sheets and Drive API response models

use serde::Deserialize;
use serde_json::Value;

/// `spreadsheets.values.get` response
///
/// Empty ranges come back without a `values` member at all.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default)]
    pub range: Option<String>,

    #[serde(default)]
    pub values: Option<Vec<Vec<Value>>>,
}

impl ValueRange {
    /// Text of the top-left cell of the range
    pub fn first_cell(&self) -> Option<String> {
        let value = self.values.as_ref()?.first()?.first()?;
        cell_text(value)
    }
}

/// Render a cell value the way the sheet displays it
fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("TRUE".to_string()),
        Value::Bool(false) => Some("FALSE".to_string()),
        other => Some(other.to_string()),
    }
}

/// `files.list` response from the Drive API
#[derive(Debug, Deserialize)]
pub struct DriveFileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Error envelope returned by Google APIs
#[derive(Debug, Deserialize)]
pub struct GoogleErrorBody {
    pub error: GoogleError,
}

#[derive(Debug, Deserialize)]
pub struct GoogleError {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_cell_variants() {
        let range: ValueRange =
            serde_json::from_str(r#"{"range":"Sheet1!A2","majorDimension":"ROWS","values":[["hello"]]}"#)
                .unwrap();
        assert_eq!(range.first_cell().as_deref(), Some("hello"));

        let range: ValueRange = serde_json::from_str(r#"{"values":[[42.5]]}"#).unwrap();
        assert_eq!(range.first_cell().as_deref(), Some("42.5"));

        let range: ValueRange = serde_json::from_str(r#"{"values":[[true]]}"#).unwrap();
        assert_eq!(range.first_cell().as_deref(), Some("TRUE"));
    }

    #[test]
    fn test_empty_range_has_no_cell() {
        let range: ValueRange =
            serde_json::from_str(r#"{"range":"Sheet1!A9","majorDimension":"ROWS"}"#).unwrap();
        assert!(range.first_cell().is_none());

        let range: ValueRange = serde_json::from_str(r#"{"values":[[]]}"#).unwrap();
        assert!(range.first_cell().is_none());
    }

    #[test]
    fn test_drive_file_list() {
        let list: DriveFileList =
            serde_json::from_str(r#"{"files":[{"id":"1abc","name":"Orders"}]}"#).unwrap();
        assert_eq!(list.files.len(), 1);
        assert_eq!(list.files[0].id, "1abc");

        let empty: DriveFileList = serde_json::from_str("{}").unwrap();
        assert!(empty.files.is_empty());
    }
}
