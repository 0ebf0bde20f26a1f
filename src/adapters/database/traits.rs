//! Database abstraction traits
//!
//! This module defines the interface the transfer engine uses to write to the
//! target database. Implementations exist for Snowflake, PostgreSQL and a
//! logging-only dry-run sink.

use crate::domain::ids::SqlIdentifier;
use crate::domain::Result;
use async_trait::async_trait;

/// SQL sink trait
///
/// A sink owns one session with the target database. The engine calls
/// [`apply_role`](SqlSink::apply_role) once before the first write, then
/// [`execute`](SqlSink::execute) once per committed batch, and finally
/// [`close`](SqlSink::close) on every terminal state.
///
/// Failures are never retried by the engine.
#[async_trait]
pub trait SqlSink: Send + Sync {
    /// Short description of the sink for log messages (never contains secrets)
    fn describe(&self) -> String;

    /// Switch the session to the given role
    ///
    /// # Errors
    ///
    /// Returns `SinkError::RoleRejected` if the database refuses the role.
    async fn apply_role(&mut self, role: &SqlIdentifier) -> Result<()>;

    /// Execute a single statement
    ///
    /// # Errors
    ///
    /// Returns `SinkError::ExecutionFailed` with the database's reason.
    async fn execute(&mut self, statement: &str) -> Result<()>;

    /// Release the session/connection
    ///
    /// Closing an already closed sink is a no-op.
    async fn close(&mut self) -> Result<()>;
}
