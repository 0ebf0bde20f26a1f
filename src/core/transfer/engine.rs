//! Transfer engine - the read/accumulate/commit loop
//!
//! The engine reads one row at a time from a [`RowSource`], accumulates rows
//! in a [`BatchBuilder`], commits full batches through a [`SqlSink`] and
//! persists progress in a [`CheckpointStore`] right after every commit.
//!
//! # States
//!
//! ```text
//! Idle -> Running -> StoppedEof | StoppedError | StoppedLimitReached | StoppedInterrupted
//! ```
//!
//! # Checkpoint position
//!
//! The persisted cursor only ever moves to the end of a committed batch. When
//! the empty row ending the data arrives mid-batch, the populated rows before
//! it are committed as a shorter batch and the cursor stops on the last of
//! them. Rows of a batch cut short by an error or an interruption are read
//! again by the next run rather than skipped. A crash between a successful
//! `execute` and the following `save` can still commit that batch twice on
//! resume.

use super::batch::BatchBuilder;
use super::rate_limit::RateLimiter;
use super::summary::TransferSummary;
use crate::adapters::database::SqlSink;
use crate::adapters::sheets::RowSource;
use crate::config::SheetPipeConfig;
use crate::core::state::{CheckpointState, CheckpointStore};
use crate::domain::ids::{ColumnLabel, QualifiedTable, SqlIdentifier};
use crate::domain::{Result, SheetPipeError};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Engine run state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Created, not started
    Idle,
    /// Reading and committing rows
    Running,
    /// An all-null row was read
    StoppedEof,
    /// A read, write or checkpoint failure stopped the run
    StoppedError,
    /// The configured last row was committed
    StoppedLimitReached,
    /// A shutdown signal was observed between rows
    StoppedInterrupted,
}

impl EngineState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EngineState::Idle | EngineState::Running)
    }

    /// Clean termination: end of data or row limit
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            EngineState::StoppedEof | EngineState::StoppedLimitReached
        )
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineState::Idle => "idle",
            EngineState::Running => "running",
            EngineState::StoppedEof => "stopped_eof",
            EngineState::StoppedError => "stopped_error",
            EngineState::StoppedLimitReached => "stopped_limit_reached",
            EngineState::StoppedInterrupted => "stopped_interrupted",
        };
        f.write_str(name)
    }
}

/// What to transfer and where
#[derive(Debug, Clone)]
pub struct TransferPlan {
    /// Columns to read, in field order
    pub columns: Vec<ColumnLabel>,
    /// Target fields, paired with `columns`
    pub fields: Vec<SqlIdentifier>,
    /// Target table
    pub table: QualifiedTable,
    /// Session role applied before the first write
    pub role: SqlIdentifier,
    /// Last row (1-based, inclusive) to read
    pub max_row: u64,
    /// Maximum rows per statement
    pub batch_size: usize,
    /// Leave row 1 out of the first batch
    pub skip_first_row: bool,
}

impl TransferPlan {
    /// Build a plan from validated configuration
    pub fn from_config(config: &SheetPipeConfig) -> Result<Self> {
        let plan = Self {
            columns: config.source.columns_to_read.clone(),
            fields: config.target.field_names.clone(),
            table: QualifiedTable::new(
                config.target.database.clone(),
                config.target.schema.clone(),
                config.target.table.clone(),
            ),
            role: config.target.role.clone(),
            max_row: config.source.max_rows_to_copy,
            batch_size: config.transfer.max_concurrent_write,
            skip_first_row: config.transfer.skip_first_row,
        };
        plan.validate()?;
        Ok(plan)
    }

    /// Check the plan's invariants
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(SheetPipeError::Configuration(
                "at least one column must be read".to_string(),
            ));
        }
        if self.columns.len() != self.fields.len() {
            return Err(SheetPipeError::Configuration(format!(
                "{} columns but {} target fields",
                self.columns.len(),
                self.fields.len()
            )));
        }
        if self.batch_size == 0 {
            return Err(SheetPipeError::Configuration(
                "batch size must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Rows in the batch that starts after `batch_start`
    pub fn effective_batch_size(&self, batch_start: u64) -> u64 {
        let remaining = self.max_row.saturating_sub(batch_start);
        remaining.min(self.batch_size as u64)
    }
}

/// Transfer engine
pub struct TransferEngine {
    plan: TransferPlan,
    source: Arc<dyn RowSource>,
    sink: Box<dyn SqlSink>,
    store: Arc<dyn CheckpointStore>,
    rate_limiter: RateLimiter,
    shutdown_signal: Option<watch::Receiver<bool>>,
    state: EngineState,
    skip_pending: bool,
}

impl TransferEngine {
    /// Create a new engine
    pub fn new(
        plan: TransferPlan,
        source: Arc<dyn RowSource>,
        sink: Box<dyn SqlSink>,
        store: Arc<dyn CheckpointStore>,
        rate_limiter: RateLimiter,
    ) -> Self {
        Self {
            plan,
            source,
            sink,
            store,
            rate_limiter,
            shutdown_signal: None,
            state: EngineState::Idle,
            skip_pending: false,
        }
    }

    /// Stop between rows once the receiver reads `true`
    pub fn with_shutdown_signal(mut self, signal: watch::Receiver<bool>) -> Self {
        self.shutdown_signal = Some(signal);
        self
    }

    /// Current state
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Run the transfer to a terminal state
    ///
    /// Never returns an error: failures end in [`EngineState::StoppedError`]
    /// with the message recorded in the summary. On every terminal state the
    /// checkpoint is saved and the sink is closed.
    pub async fn run(mut self) -> TransferSummary {
        let start_time = Instant::now();

        let mut checkpoint = self.store.load().await;
        if checkpoint.adopt_layout(&self.plan.columns, &self.plan.fields) {
            tracing::warn!(
                location = %self.store.location(),
                "Checkpoint was written with a different column/field layout; continuing with the configured one"
            );
        }

        let mut summary = TransferSummary::new(checkpoint.cursor_row);
        self.skip_pending = self.plan.skip_first_row && checkpoint.cursor_row == 0;
        self.state = EngineState::Running;

        tracing::info!(
            source = %self.source.describe(),
            sink = %self.sink.describe(),
            table = %self.plan.table,
            resume_from = checkpoint.cursor_row + 1,
            max_row = self.plan.max_row,
            batch_size = self.plan.batch_size,
            "Starting transfer"
        );

        let terminal = match self.drive(&mut checkpoint, &mut summary).await {
            Ok(state) => state,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    last_row_read = summary.last_row_read,
                    "Transfer failed"
                );
                summary.record_error(&e);
                EngineState::StoppedError
            }
        };

        self.state = self.shutdown(&mut checkpoint, terminal, &mut summary).await;
        summary.final_state = self.state;
        summary.committed_row = checkpoint.cursor_row;

        crate::log_transfer_stopped!(self.state, checkpoint.cursor_row);
        summary.with_duration(start_time.elapsed())
    }

    async fn drive(
        &mut self,
        checkpoint: &mut CheckpointState,
        summary: &mut TransferSummary,
    ) -> Result<EngineState> {
        if checkpoint.cursor_row >= self.plan.max_row {
            tracing::info!(
                on_row = checkpoint.cursor_row,
                max_row = self.plan.max_row,
                "Row limit already reached, nothing to transfer"
            );
            return Ok(EngineState::StoppedLimitReached);
        }

        self.sink.apply_role(&self.plan.role).await?;

        let mut cursor = checkpoint.cursor_row;
        let mut batch = BatchBuilder::new();

        while cursor < self.plan.max_row {
            if self.shutdown_requested() {
                tracing::info!(
                    last_row_read = cursor,
                    uncommitted_rows = batch.rows_seen(),
                    "Shutdown requested, stopping before next row"
                );
                summary.rows_discarded += batch.len();
                return Ok(EngineState::StoppedInterrupted);
            }

            let effective_batch_size = self.plan.effective_batch_size(checkpoint.cursor_row);

            cursor += 1;
            summary.last_row_read = cursor;
            let raw = self.read_row(cursor).await?;
            summary.rows_read += 1;

            if self.skip_pending && cursor == 1 {
                self.skip_pending = false;
                tracing::debug!(row = cursor, "Skipping first row");
                batch.skip_row(&raw);
            } else {
                batch.add_row(&raw);
            }

            if batch.is_exhausted() {
                tracing::info!(row = cursor, "Empty row found, end of data");
                // Ragged tail: commit the populated rows read before the empty one
                if batch.has_values() {
                    self.commit(&batch, cursor - 1, checkpoint, summary).await?;
                }
                return Ok(EngineState::StoppedEof);
            }

            if batch.rows_seen() as u64 >= effective_batch_size {
                self.commit(&batch, cursor, checkpoint, summary).await?;
                batch.reset();
            }

            self.rate_limiter.wait_turn().await;
        }

        Ok(EngineState::StoppedLimitReached)
    }

    async fn read_row(&self, row: u64) -> Result<Vec<Option<String>>> {
        let mut cells = Vec::with_capacity(self.plan.columns.len());
        for column in &self.plan.columns {
            cells.push(self.source.read_cell(column, row).await?);
        }
        tracing::trace!(row = row, cells = ?cells, "Row read");
        Ok(cells)
    }

    async fn commit(
        &mut self,
        batch: &BatchBuilder,
        end_row: u64,
        checkpoint: &mut CheckpointState,
        summary: &mut TransferSummary,
    ) -> Result<()> {
        match batch.build(&self.plan.table, &self.plan.fields) {
            Some(statement) => {
                let sql = statement.to_sql();
                self.sink.execute(&sql).await?;

                checkpoint.record_commit(end_row, sql);
                summary.record_batch(statement.row_count(), end_row);
                crate::log_batch_committed!(
                    checkpoint.committed_batches(),
                    statement.row_count(),
                    end_row
                );
            }
            None => {
                tracing::debug!(end_row = end_row, "Batch had no rows to insert");
                checkpoint.advance_to(end_row);
                summary.committed_row = end_row;
            }
        }

        checkpoint.touch();
        self.store.save(checkpoint).await
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown_signal
            .as_ref()
            .map(|signal| *signal.borrow())
            .unwrap_or(false)
    }

    /// Persist the checkpoint and release the sink
    async fn shutdown(
        &mut self,
        checkpoint: &mut CheckpointState,
        terminal: EngineState,
        summary: &mut TransferSummary,
    ) -> EngineState {
        let mut terminal = terminal;

        checkpoint.touch();
        if let Err(e) = self.store.save(checkpoint).await {
            tracing::error!(
                location = %self.store.location(),
                error = %e,
                "Failed to save checkpoint during shutdown"
            );
            if summary.error.is_none() {
                summary.record_error(&e);
            }
            terminal = EngineState::StoppedError;
        }

        if let Err(e) = self.sink.close().await {
            tracing::warn!(error = %e, "Failed to close sink session");
        }

        terminal
    }
}
