//! Diagnostic sink for tick outcomes.

use tracing::{debug, error};

use crate::process::ProcessLogEntry;
use crate::store::StorageError;

/// Receives the outcome of every tick.
///
/// Tick failures never stop a schedule; the sink is the only place they
/// become visible.
pub trait TickSink: Send + Sync {
    /// Called after a log entry was stored.
    fn tick_succeeded(&self, _entry: &ProcessLogEntry) {}

    /// Called when storing a log entry failed.
    fn tick_failed(&self, process_id: &str, error: &StorageError);
}

/// Default sink: reports outcomes through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTickSink;

impl TickSink for TracingTickSink {
    fn tick_succeeded(&self, entry: &ProcessLogEntry) {
        debug!(process_id = %entry.process_id, logged_at = %entry.logged_at, "Log entry written");
    }

    fn tick_failed(&self, process_id: &str, error: &StorageError) {
        error!(process_id = %process_id, error = %error, "Error inserting log");
    }
}
