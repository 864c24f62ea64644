//! Process log storage trait.
//!
//! Defines the interface for the append-only activity log written by the
//! scheduler.

use async_trait::async_trait;

use crate::process::ProcessLogEntry;

use super::error::StorageResult;

/// Storage interface for per-process log entries.
///
/// Entries are append-only and removed in bulk when their process is deleted.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Append an entry to the log.
    async fn append(&self, entry: &ProcessLogEntry) -> StorageResult<()>;

    /// Load every entry for a process in insertion order.
    ///
    /// Returns an empty list for unknown ids.
    async fn list_for(&self, process_id: &str) -> StorageResult<Vec<ProcessLogEntry>>;

    /// Delete every entry for a process.
    ///
    /// Returns the number of entries removed.
    async fn delete_for(&self, process_id: &str) -> StorageResult<u64>;
}
