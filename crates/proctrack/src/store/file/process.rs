//! File-based process record storage.
//!
//! Stores one JSON document per line in `{database}/process.jsonl`.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::process::ProcessRecord;
use crate::store::error::StorageResult;
use crate::store::process::ProcessStore;

use super::collection::{DeleteScope, JsonlCollection};

/// File-based implementation of `ProcessStore`.
pub struct FileProcessStore {
    docs: JsonlCollection<ProcessRecord>,
}

impl FileProcessStore {
    /// Create a store backed by the given collection file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            docs: JsonlCollection::new(path),
        }
    }
}

#[async_trait]
impl ProcessStore for FileProcessStore {
    async fn insert(&self, process: &ProcessRecord) -> StorageResult<()> {
        self.docs.insert(process).await
    }

    async fn list(&self) -> StorageResult<Vec<ProcessRecord>> {
        self.docs.find(|_| true).await
    }

    async fn delete(&self, id: &str) -> StorageResult<u64> {
        self.docs.delete(|p| p.id == id, DeleteScope::First).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_store(temp_dir: &TempDir) -> FileProcessStore {
        FileProcessStore::new(temp_dir.path().join("process.jsonl"))
    }

    #[tokio::test]
    async fn insert_and_list() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir);

        store.insert(&ProcessRecord::new("aaaa1111")).await.unwrap();
        store.insert(&ProcessRecord::new("bbbb2222")).await.unwrap();

        let ids: Vec<String> = store.list().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["aaaa1111", "bbbb2222"]);
    }

    #[tokio::test]
    async fn list_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir);

        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_reports_count() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir);

        store.insert(&ProcessRecord::new("aaaa1111")).await.unwrap();

        assert_eq!(store.delete("aaaa1111").await.unwrap(), 1);
        assert_eq!(store.delete("aaaa1111").await.unwrap(), 0);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_nonexistent_ok() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir);

        assert_eq!(store.delete("nonexistent").await.unwrap(), 0);
    }
}
