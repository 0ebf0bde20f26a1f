//! PostgreSQL sink implementation
//!
//! This module provides the sink for writing batches to PostgreSQL over a
//! single `tokio-postgres` connection.

use crate::adapters::database::SqlSink;
use crate::config::{SinkCredentials, TargetConfig};
use crate::domain::ids::SqlIdentifier;
use crate::domain::{Result, SheetPipeError, SinkError};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls};

const DEFAULT_PORT: u16 = 5432;

/// PostgreSQL sink
///
/// The connection future runs on its own task; dropping the client ends it.
pub struct PostgresSink {
    client: Option<Client>,
    connection: Option<JoinHandle<()>>,
    host: String,
    port: u16,
    database: String,
}

impl PostgresSink {
    /// Open a connection to the configured database
    ///
    /// The credentials' `account` is the server address as `host[:port]`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a malformed address, or
    /// `SinkError::ConnectionFailed` if the server cannot be reached.
    pub async fn connect(config: &TargetConfig, credentials: SinkCredentials) -> Result<Self> {
        let (host, port) = parse_address(&credentials.account)?;

        let mut pg_config = tokio_postgres::Config::new();
        pg_config
            .host(&host)
            .port(port)
            .user(&credentials.user)
            .password(credentials.password.expose_secret().as_str())
            .dbname(config.database.as_str())
            .application_name("sheetpipe")
            .connect_timeout(Duration::from_secs(config.timeout_seconds));

        let (client, connection) = pg_config.connect(NoTls).await.map_err(|e| {
            SinkError::ConnectionFailed(format!("{host}:{port}/{}: {e}", config.database))
        })?;

        let handle = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "PostgreSQL connection error");
            }
        });

        tracing::info!(
            host = %host,
            port = port,
            database = %config.database,
            "PostgreSQL connection opened"
        );

        Ok(Self {
            client: Some(client),
            connection: Some(handle),
            host,
            port,
            database: config.database.to_string(),
        })
    }

    fn client(&self) -> Result<&Client> {
        self.client.as_ref().ok_or_else(|| SinkError::Closed.into())
    }
}

#[async_trait]
impl SqlSink for PostgresSink {
    fn describe(&self) -> String {
        format!("postgresql:{}:{}/{}", self.host, self.port, self.database)
    }

    async fn apply_role(&mut self, role: &SqlIdentifier) -> Result<()> {
        self.client()?
            .batch_execute(&format!("SET ROLE {role}"))
            .await
            .map_err(|e| SinkError::RoleRejected {
                role: role.to_string(),
                message: e.to_string(),
            })?;
        tracing::info!(role = %role, "Session role applied");
        Ok(())
    }

    async fn execute(&mut self, statement: &str) -> Result<()> {
        self.client()?
            .batch_execute(statement)
            .await
            .map_err(|e| SinkError::ExecutionFailed(e.to_string()))?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        // Dropping the client closes the connection and lets the task finish.
        if self.client.take().is_none() {
            return Ok(());
        }
        if let Some(handle) = self.connection.take() {
            if tokio::time::timeout(Duration::from_secs(5), handle)
                .await
                .is_err()
            {
                tracing::warn!("PostgreSQL connection task did not finish after close");
            }
        }
        tracing::debug!(host = %self.host, "PostgreSQL connection closed");
        Ok(())
    }
}

/// Split `host[:port]` into its parts
fn parse_address(address: &str) -> Result<(String, u16)> {
    let address = address.trim();
    let (host, port) = match address.rsplit_once(':') {
        Some((host, port)) => {
            let port = port.parse::<u16>().map_err(|_| {
                SheetPipeError::Credentials(format!("invalid port in PostgreSQL address '{address}'"))
            })?;
            (host, port)
        }
        None => (address, DEFAULT_PORT),
    };

    if host.is_empty() {
        return Err(SheetPipeError::Credentials(format!(
            "PostgreSQL address '{address}' has no host"
        )));
    }
    Ok((host.to_string(), port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("db.internal", "db.internal", 5432 ; "host only")]
    #[test_case("db.internal:6543", "db.internal", 6543 ; "host and port")]
    #[test_case(" localhost:5433 ", "localhost", 5433 ; "trimmed")]
    fn test_parse_address(input: &str, host: &str, port: u16) {
        assert_eq!(parse_address(input).unwrap(), (host.to_string(), port));
    }

    #[test_case("db:notaport" ; "bad port")]
    #[test_case(":5432" ; "no host")]
    #[test_case("" ; "empty")]
    fn test_parse_address_rejects(input: &str) {
        assert!(parse_address(input).is_err());
    }
}
