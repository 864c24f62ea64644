//! Scheduler error types.

use thiserror::Error;

/// Errors that can occur in the scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Tick period must be non-zero.
    #[error("invalid tick period: must be greater than zero")]
    InvalidPeriod,
}

/// Result type for scheduler operations.
pub type Result<T> = std::result::Result<T, SchedulerError>;
