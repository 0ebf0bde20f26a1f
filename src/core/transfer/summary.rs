//! Transfer summary and reporting

use super::engine::EngineState;
use std::time::Duration;

/// Summary of one engine run
#[derive(Debug, Clone)]
pub struct TransferSummary {
    /// Terminal state the engine stopped in
    pub final_state: EngineState,

    /// Committed cursor when the run started
    pub start_row: u64,

    /// Committed cursor when the run stopped
    pub committed_row: u64,

    /// Last row the engine attempted to read
    pub last_row_read: u64,

    /// Rows read from the source, skipped and sentinel rows included
    pub rows_read: usize,

    /// Rows inserted into the target
    pub rows_inserted: usize,

    /// Rows read but never committed (batch cut short by a stop)
    pub rows_discarded: usize,

    /// Row count of every committed statement, in order
    pub batch_sizes: Vec<usize>,

    /// Duration of the run
    pub duration: Duration,

    /// Error that stopped the run, if any
    pub error: Option<String>,
}

impl TransferSummary {
    /// Create a new summary for a run starting after `start_row`
    pub fn new(start_row: u64) -> Self {
        Self {
            final_state: EngineState::Idle,
            start_row,
            committed_row: start_row,
            last_row_read: start_row,
            rows_read: 0,
            rows_inserted: 0,
            rows_discarded: 0,
            batch_sizes: Vec::new(),
            duration: Duration::from_secs(0),
            error: None,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Record a committed statement of `rows` rows ending at `end_row`
    pub fn record_batch(&mut self, rows: usize, end_row: u64) {
        self.batch_sizes.push(rows);
        self.rows_inserted += rows;
        self.committed_row = end_row;
    }

    /// Record the error that stopped the run
    pub fn record_error(&mut self, error: impl ToString) {
        self.error = Some(error.to_string());
    }

    /// Number of committed statements
    pub fn batches_committed(&self) -> usize {
        self.batch_sizes.len()
    }

    /// Whether the run ended cleanly (end of data or row limit)
    pub fn is_successful(&self) -> bool {
        self.final_state.is_success() && self.error.is_none()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            final_state = %self.final_state,
            start_row = self.start_row,
            committed_row = self.committed_row,
            last_row_read = self.last_row_read,
            rows_read = self.rows_read,
            rows_inserted = self.rows_inserted,
            rows_discarded = self.rows_discarded,
            batches = self.batches_committed(),
            duration_secs = self.duration.as_secs(),
            "Transfer finished"
        );

        if let Some(error) = &self.error {
            tracing::error!(error = %error, "Transfer stopped on error");
        }
    }
}
