//! File-based process log storage.
//!
//! All processes share one JSONL file at `{database}/log.jsonl`; entries are
//! filtered by `process_id` on read and delete.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::process::ProcessLogEntry;
use crate::store::error::StorageResult;
use crate::store::log::LogStore;

use super::collection::{DeleteScope, JsonlCollection};

/// File-based implementation of `LogStore`.
pub struct FileLogStore {
    docs: JsonlCollection<ProcessLogEntry>,
}

impl FileLogStore {
    /// Create a store backed by the given collection file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            docs: JsonlCollection::new(path),
        }
    }
}

#[async_trait]
impl LogStore for FileLogStore {
    async fn append(&self, entry: &ProcessLogEntry) -> StorageResult<()> {
        self.docs.insert(entry).await
    }

    async fn list_for(&self, process_id: &str) -> StorageResult<Vec<ProcessLogEntry>> {
        self.docs.find(|e| e.process_id == process_id).await
    }

    async fn delete_for(&self, process_id: &str) -> StorageResult<u64> {
        self.docs
            .delete(|e| e.process_id == process_id, DeleteScope::All)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_store(temp_dir: &TempDir) -> FileLogStore {
        FileLogStore::new(temp_dir.path().join("log.jsonl"))
    }

    #[tokio::test]
    async fn append_and_list_for() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir);

        let first = ProcessLogEntry::now("proc_a");
        let second = ProcessLogEntry::now("proc_a");
        store.append(&first).await.unwrap();
        store.append(&ProcessLogEntry::now("proc_b")).await.unwrap();
        store.append(&second).await.unwrap();

        let entries = store.list_for("proc_a").await.unwrap();
        assert_eq!(entries, vec![first, second]);
    }

    #[tokio::test]
    async fn list_for_unknown_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir);

        store.append(&ProcessLogEntry::now("proc_a")).await.unwrap();

        assert!(store.list_for("nonexistent").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_for_only_touches_owner() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir);

        for _ in 0..3 {
            store.append(&ProcessLogEntry::now("proc_a")).await.unwrap();
        }
        store.append(&ProcessLogEntry::now("proc_b")).await.unwrap();

        assert_eq!(store.delete_for("proc_a").await.unwrap(), 3);
        assert!(store.list_for("proc_a").await.unwrap().is_empty());
        assert_eq!(store.list_for("proc_b").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_for_nonexistent_ok() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir);

        assert_eq!(store.delete_for("nonexistent").await.unwrap(), 0);
    }
}
