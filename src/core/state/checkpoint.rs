//! Checkpoint model for tracking transfer progress
//!
//! The checkpoint records how far the transfer got and every statement that
//! was committed to the target. It is serialized with the field names
//! `onRow`, `columnList`, `fieldNames` and `sql` so existing checkpoint files
//! keep loading.

use crate::domain::ids::{ColumnLabel, SqlIdentifier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable transfer progress
///
/// `cursor_row` is the last row covered by a committed batch; the next run
/// reads from `cursor_row + 1`. It never decreases.
///
/// # Examples
///
/// ```
/// use sheetpipe::core::state::CheckpointState;
///
/// let mut state = CheckpointState::default();
/// state.record_commit(10, "INSERT INTO a.b.c (X) VALUES (1)".to_string());
///
/// assert_eq!(state.cursor_row, 10);
/// assert_eq!(state.committed_batches(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointState {
    /// Last row covered by a committed batch
    #[serde(rename = "onRow")]
    pub cursor_row: u64,

    /// Columns read, in field order
    #[serde(rename = "columnList")]
    pub read_columns: Vec<String>,

    /// Target fields, paired with `read_columns`
    #[serde(rename = "fieldNames")]
    pub target_fields: Vec<String>,

    /// Audit log of committed statements, oldest first
    #[serde(rename = "sql")]
    pub committed_statements: Vec<String>,

    /// When the checkpoint was last written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CheckpointState {
    /// Whether nothing has been committed yet
    pub fn is_fresh(&self) -> bool {
        self.cursor_row == 0 && self.committed_statements.is_empty()
    }

    /// Number of committed batches
    pub fn committed_batches(&self) -> usize {
        self.committed_statements.len()
    }

    /// Most recently committed statement
    pub fn last_statement(&self) -> Option<&str> {
        self.committed_statements.last().map(String::as_str)
    }

    /// Record the run's column/field layout
    ///
    /// Returns `true` if a non-empty previous layout differed, which means the
    /// checkpoint was written by a run with a different configuration.
    pub fn adopt_layout(&mut self, columns: &[ColumnLabel], fields: &[SqlIdentifier]) -> bool {
        let columns: Vec<String> = columns.iter().map(|c| c.as_str().to_string()).collect();
        let fields: Vec<String> = fields.iter().map(|f| f.as_str().to_string()).collect();

        let previously_set = !self.read_columns.is_empty() || !self.target_fields.is_empty();
        let changed =
            previously_set && (self.read_columns != columns || self.target_fields != fields);

        self.read_columns = columns;
        self.target_fields = fields;
        changed
    }

    /// Record a committed batch ending at `end_row`
    pub fn record_commit(&mut self, end_row: u64, statement: String) {
        self.committed_statements.push(statement);
        self.advance_to(end_row);
    }

    /// Move the cursor forward to `row`; never moves it back
    pub fn advance_to(&mut self, row: u64) {
        self.cursor_row = self.cursor_row.max(row);
    }

    /// Stamp the update time
    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(labels: &[&str]) -> Vec<ColumnLabel> {
        labels.iter().map(|l| ColumnLabel::new(*l).unwrap()).collect()
    }

    fn fields(names: &[&str]) -> Vec<SqlIdentifier> {
        names.iter().map(|n| SqlIdentifier::new(*n).unwrap()).collect()
    }

    #[test]
    fn test_default_is_fresh() {
        let state = CheckpointState::default();
        assert!(state.is_fresh());
        assert_eq!(state.committed_batches(), 0);
        assert!(state.last_statement().is_none());
    }

    #[test]
    fn test_serialized_field_names() {
        let mut state = CheckpointState::default();
        state.adopt_layout(&columns(&["A", "B"]), &fields(&["ID", "NAME"]));
        state.record_commit(10, "INSERT".to_string());

        let json: serde_json::Value = serde_json::to_value(&state).unwrap();
        assert_eq!(json["onRow"], 10);
        assert_eq!(json["columnList"], serde_json::json!(["A", "B"]));
        assert_eq!(json["fieldNames"], serde_json::json!(["ID", "NAME"]));
        assert_eq!(json["sql"], serde_json::json!(["INSERT"]));
        assert!(json.get("updatedAt").is_none());
    }

    #[test]
    fn test_loads_record_without_timestamp() {
        let raw = r#"{"onRow": 4, "columnList": ["A"], "fieldNames": ["X"], "sql": ["s1", "s2"]}"#;
        let state: CheckpointState = serde_json::from_str(raw).unwrap();
        assert_eq!(state.cursor_row, 4);
        assert_eq!(state.committed_batches(), 2);
        assert_eq!(state.last_statement(), Some("s2"));
        assert!(state.updated_at.is_none());
    }

    #[test]
    fn test_cursor_never_moves_back() {
        let mut state = CheckpointState::default();
        state.advance_to(20);
        state.advance_to(5);
        assert_eq!(state.cursor_row, 20);
    }

    #[test]
    fn test_adopt_layout_detects_change() {
        let mut state = CheckpointState::default();
        assert!(!state.adopt_layout(&columns(&["A"]), &fields(&["X"])));
        assert!(!state.adopt_layout(&columns(&["A"]), &fields(&["X"])));
        assert!(state.adopt_layout(&columns(&["B"]), &fields(&["X"])));
        assert_eq!(state.read_columns, vec!["B".to_string()]);
    }
}
