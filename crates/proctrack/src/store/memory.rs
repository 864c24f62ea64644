//! In-memory storage implementations.
//!
//! Nothing survives a restart. Used by `database.backend: memory` and by
//! tests, which can toggle `fail_writes` to simulate an unreachable store.

// std::sync::Mutex: the lock is never held across .await points.
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::process::{ProcessLogEntry, ProcessRecord};

use super::error::{StorageError, StorageResult};
use super::log::LogStore;
use super::process::ProcessStore;

/// Shared failure switch for the in-memory stores.
#[derive(Debug, Default)]
struct FailSwitch(AtomicBool);

impl FailSwitch {
    fn set(&self, fail: bool) {
        self.0.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> StorageResult<()> {
        if self.0.load(Ordering::SeqCst) {
            Err(StorageError::unavailable("in-memory store is failing writes"))
        } else {
            Ok(())
        }
    }
}

// ============================================================================
// MemoryProcessStore
// ============================================================================

/// In-memory implementation of `ProcessStore`.
#[derive(Debug, Default)]
pub struct MemoryProcessStore {
    records: Mutex<Vec<ProcessRecord>>,
    fail: FailSwitch,
}

impl MemoryProcessStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail.set(fail);
    }
}

#[async_trait]
impl ProcessStore for MemoryProcessStore {
    async fn insert(&self, process: &ProcessRecord) -> StorageResult<()> {
        self.fail.check()?;
        self.records
            .lock()
            .expect("mutex poisoned")
            .push(process.clone());
        Ok(())
    }

    async fn list(&self) -> StorageResult<Vec<ProcessRecord>> {
        self.fail.check()?;
        Ok(self.records.lock().expect("mutex poisoned").clone())
    }

    async fn delete(&self, id: &str) -> StorageResult<u64> {
        self.fail.check()?;
        let mut records = self.records.lock().expect("mutex poisoned");
        match records.iter().position(|p| p.id == id) {
            Some(index) => {
                records.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

// ============================================================================
// MemoryLogStore
// ============================================================================

/// In-memory implementation of `LogStore`.
#[derive(Debug, Default)]
pub struct MemoryLogStore {
    entries: Mutex<Vec<ProcessLogEntry>>,
    fail: FailSwitch,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail.set(fail);
    }

    /// Number of stored entries for a process.
    pub fn count_for(&self, process_id: &str) -> usize {
        self.entries
            .lock()
            .expect("mutex poisoned")
            .iter()
            .filter(|e| e.process_id == process_id)
            .count()
    }
}

#[async_trait]
impl LogStore for MemoryLogStore {
    async fn append(&self, entry: &ProcessLogEntry) -> StorageResult<()> {
        self.fail.check()?;
        self.entries
            .lock()
            .expect("mutex poisoned")
            .push(entry.clone());
        Ok(())
    }

    async fn list_for(&self, process_id: &str) -> StorageResult<Vec<ProcessLogEntry>> {
        self.fail.check()?;
        Ok(self
            .entries
            .lock()
            .expect("mutex poisoned")
            .iter()
            .filter(|e| e.process_id == process_id)
            .cloned()
            .collect())
    }

    async fn delete_for(&self, process_id: &str) -> StorageResult<u64> {
        self.fail.check()?;
        let mut entries = self.entries.lock().expect("mutex poisoned");
        let before = entries.len();
        entries.retain(|e| e.process_id != process_id);
        Ok((before - entries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn process_store_roundtrip() {
        let store = MemoryProcessStore::new();
        store.insert(&ProcessRecord::new("aaaa1111")).await.unwrap();
        store.insert(&ProcessRecord::new("bbbb2222")).await.unwrap();

        assert_eq!(store.list().await.unwrap().len(), 2);
        assert_eq!(store.delete("aaaa1111").await.unwrap(), 1);
        assert_eq!(store.delete("aaaa1111").await.unwrap(), 0);
        assert_eq!(store.list().await.unwrap()[0].id, "bbbb2222");
    }

    #[tokio::test]
    async fn log_store_filters_by_owner() {
        let store = MemoryLogStore::new();
        store.append(&ProcessLogEntry::now("a")).await.unwrap();
        store.append(&ProcessLogEntry::now("a")).await.unwrap();
        store.append(&ProcessLogEntry::now("b")).await.unwrap();

        assert_eq!(store.count_for("a"), 2);
        assert_eq!(store.delete_for("a").await.unwrap(), 2);
        assert!(store.list_for("a").await.unwrap().is_empty());
        assert_eq!(store.list_for("b").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn fail_writes_toggles() {
        let store = MemoryLogStore::new();
        store.fail_writes(true);
        assert!(matches!(
            store.append(&ProcessLogEntry::now("a")).await,
            Err(StorageError::Unavailable(_))
        ));

        store.fail_writes(false);
        store.append(&ProcessLogEntry::now("a")).await.unwrap();
        assert_eq!(store.count_for("a"), 1);
    }
}
