//! Dry-run sink: logs statements instead of executing them

use super::traits::SqlSink;
use crate::domain::ids::SqlIdentifier;
use crate::domain::{Result, SinkError};
use async_trait::async_trait;

/// Sink that only records what would have been executed
#[derive(Debug, Default)]
pub struct DryRunSink {
    target: String,
    statements: Vec<String>,
    closed: bool,
}

impl DryRunSink {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    /// Statements received so far, role statements included
    pub fn statements(&self) -> &[String] {
        &self.statements
    }
}

#[async_trait]
impl SqlSink for DryRunSink {
    fn describe(&self) -> String {
        format!("dry-run:{}", self.target)
    }

    async fn apply_role(&mut self, role: &SqlIdentifier) -> Result<()> {
        self.execute(&format!("USE ROLE {role}")).await
    }

    async fn execute(&mut self, statement: &str) -> Result<()> {
        if self.closed {
            return Err(SinkError::Closed.into());
        }
        tracing::info!(statement = %statement, "[DRY RUN] Would execute statement");
        self.statements.push(statement.to_string());
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}
