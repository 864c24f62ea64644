//! Process record storage trait.

use async_trait::async_trait;

use crate::process::ProcessRecord;

use super::error::StorageResult;

/// Storage interface for tracked process records.
#[async_trait]
pub trait ProcessStore: Send + Sync {
    /// Persist a newly created process.
    async fn insert(&self, process: &ProcessRecord) -> StorageResult<()>;

    /// List every stored process in insertion order.
    async fn list(&self) -> StorageResult<Vec<ProcessRecord>>;

    /// Delete the process with the given id.
    ///
    /// Returns the number of records removed (0 or 1).
    async fn delete(&self, id: &str) -> StorageResult<u64>;
}
