//! Batch construction for multi-row inserts
//!
//! The [`BatchBuilder`] accumulates coerced rows until the engine decides the
//! batch is complete, and flags end-of-data the moment an all-null row is
//! ingested. The flag is structural: it is computed from the typed values,
//! never from statement text.

use crate::domain::ids::{QualifiedTable, SqlIdentifier};
use crate::domain::value::{coerce_row, RowValue};
use std::fmt;

/// A ready-to-execute multi-row insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    pub table: QualifiedTable,
    pub fields: Vec<SqlIdentifier>,
    pub rows: Vec<Vec<RowValue>>,
}

impl InsertStatement {
    /// Number of value tuples
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Render the statement text
    pub fn to_sql(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for InsertStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.fields.iter().map(SqlIdentifier::as_str).collect();
        write!(
            f,
            "INSERT INTO {} ({}) VALUES ",
            self.table,
            fields.join(",")
        )?;
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            let values: Vec<String> = row.iter().map(RowValue::to_sql_literal).collect();
            write!(f, "({})", values.join(","))?;
        }
        Ok(())
    }
}

/// Accumulates rows for one batch
#[derive(Debug, Default)]
pub struct BatchBuilder {
    rows: Vec<Vec<RowValue>>,
    rows_seen: usize,
    exhausted: bool,
}

impl BatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Coerce a raw row and append it to the batch
    pub fn add_row(&mut self, raw: &[Option<String>]) {
        let row = coerce_row(raw);
        self.observe(&row);
        self.rows.push(row);
    }

    /// Count a row as read without appending its values
    ///
    /// The row still takes part in the end-of-data check.
    pub fn skip_row(&mut self, raw: &[Option<String>]) {
        let row = coerce_row(raw);
        self.observe(&row);
    }

    fn observe(&mut self, row: &[RowValue]) {
        self.rows_seen += 1;
        self.exhausted = row.iter().all(RowValue::is_null);
    }

    /// Whether the most recently ingested row was entirely null
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Rows read into this batch, skipped rows included
    pub fn rows_seen(&self) -> usize {
        self.rows_seen
    }

    /// Rows holding values
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether any appended row holds at least one value
    pub fn has_values(&self) -> bool {
        self.rows
            .iter()
            .any(|row| !row.iter().all(RowValue::is_null))
    }

    /// Build the insert for the accumulated rows
    ///
    /// All-null rows are dropped first. Returns `None` when no row is left.
    pub fn build(
        &self,
        table: &QualifiedTable,
        fields: &[SqlIdentifier],
    ) -> Option<InsertStatement> {
        let rows: Vec<Vec<RowValue>> = self
            .rows
            .iter()
            .filter(|row| !row.iter().all(RowValue::is_null))
            .cloned()
            .collect();

        if rows.is_empty() {
            return None;
        }

        if rows.len() < self.rows.len() {
            tracing::debug!(
                dropped = self.rows.len() - rows.len(),
                kept = rows.len(),
                "Dropped all-null rows from batch"
            );
        }

        Some(InsertStatement {
            table: table.clone(),
            fields: fields.to_vec(),
            rows,
        })
    }

    /// Clear the batch after it was committed or discarded
    pub fn reset(&mut self) {
        self.rows.clear();
        self.rows_seen = 0;
        self.exhausted = false;
    }
}
