//! Transfer coordinator - wires configuration to a running engine
//!
//! The coordinator loads credentials, opens the source and the sink, picks the
//! checkpoint store and hands everything to a [`TransferEngine`].

use super::engine::{TransferEngine, TransferPlan};
use super::rate_limit::RateLimiter;
use super::summary::TransferSummary;
use crate::adapters::database::{create_sql_sink, DryRunSink, SqlSink};
use crate::adapters::sheets::{GoogleSheetsSource, RowSource};
use crate::config::{SheetPipeConfig, SinkCredentials, SourceCredentials};
use crate::core::state::{CheckpointStore, FileCheckpointStore, MemoryCheckpointStore};
use crate::domain::{Result, SheetPipeError};
use std::sync::Arc;
use tokio::sync::watch;

/// Transfer coordinator
pub struct TransferCoordinator {
    engine: TransferEngine,
    dry_run: bool,
}

impl TransferCoordinator {
    /// Create a coordinator with connected source and sink
    ///
    /// In dry-run mode the sink only logs statements and checkpoints are kept
    /// in memory, seeded from the checkpoint file so the run starts where a
    /// real run would.
    ///
    /// # Errors
    ///
    /// Returns configuration and credential errors, or source/sink errors if
    /// a connection cannot be opened.
    pub async fn new(config: SheetPipeConfig, shutdown_signal: watch::Receiver<bool>) -> Result<Self> {
        config
            .validate()
            .map_err(SheetPipeError::Configuration)?;

        let plan = TransferPlan::from_config(&config)?;
        let rate_limiter = RateLimiter::from_secs_f64(config.transfer.rate_limit_delay)?;
        let file_store = FileCheckpointStore::new(&config.transfer.checkpoint_path);
        let dry_run = config.application.dry_run;

        let source_credentials = SourceCredentials::from_file(&config.source.credentials_path)?;
        let source: Arc<dyn RowSource> =
            Arc::new(GoogleSheetsSource::connect(&config.source, source_credentials).await?);

        let (sink, store): (Box<dyn SqlSink>, Arc<dyn CheckpointStore>) = if dry_run {
            tracing::info!("Dry run: statements are logged, not executed; checkpoint file is left untouched");
            let seed = file_store.load().await;
            (
                Box::new(DryRunSink::new(config.target.kind.to_string())),
                Arc::new(MemoryCheckpointStore::with_state(seed)),
            )
        } else {
            let sink_credentials = SinkCredentials::from_file(&config.target.credentials_path)?;
            (
                create_sql_sink(&config.target, sink_credentials).await?,
                Arc::new(file_store),
            )
        };

        tracing::debug!(
            checkpoint = %store.location(),
            rate_limit_delay_ms = rate_limiter.delay().as_millis() as u64,
            "Transfer coordinator ready"
        );

        let engine = TransferEngine::new(plan, source, sink, store, rate_limiter)
            .with_shutdown_signal(shutdown_signal);

        Ok(Self { engine, dry_run })
    }

    /// Run the transfer to completion and report
    pub async fn execute(self) -> TransferSummary {
        let summary = self.engine.run().await;
        if self.dry_run {
            tracing::info!("[DRY RUN] No rows were written and no checkpoint was saved");
        }
        summary.log_summary();
        summary
    }
}
