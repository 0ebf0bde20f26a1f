//! Transfer orchestration
//!
//! This module provides the core transfer logic for sheetpipe, including:
//! - Batch construction of multi-row inserts
//! - The read/commit engine and its state machine
//! - Fixed-delay rate limiting
//! - Coordination and summary reporting

pub mod batch;
pub mod coordinator;
pub mod engine;
pub mod rate_limit;
pub mod summary;

pub use batch::{BatchBuilder, InsertStatement};
pub use coordinator::TransferCoordinator;
pub use engine::{EngineState, TransferEngine, TransferPlan};
pub use rate_limit::RateLimiter;
pub use summary::TransferSummary;
