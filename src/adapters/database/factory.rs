//! SQL sink factory
//!
//! This module provides the factory function that creates the sink matching
//! the configured target kind.

use crate::adapters::database::traits::SqlSink;
use crate::adapters::postgresql::PostgresSink;
use crate::adapters::snowflake::SnowflakeSink;
use crate::config::schema::{SinkKind, TargetConfig};
use crate::config::SinkCredentials;
use crate::domain::Result;

/// Create a connected SQL sink based on the target configuration
///
/// # Arguments
///
/// * `config` - The target configuration
/// * `credentials` - Credentials for the target database
///
/// # Errors
///
/// Returns an error if the connection or login fails
pub async fn create_sql_sink(
    config: &TargetConfig,
    credentials: SinkCredentials,
) -> Result<Box<dyn SqlSink>> {
    match config.kind {
        SinkKind::Snowflake => {
            tracing::info!("Creating Snowflake sink");
            let sink = SnowflakeSink::connect(config, credentials).await?;
            Ok(Box::new(sink))
        }
        SinkKind::PostgreSQL => {
            tracing::info!("Creating PostgreSQL sink");
            let sink = PostgresSink::connect(config, credentials).await?;
            Ok(Box::new(sink))
        }
    }
}
