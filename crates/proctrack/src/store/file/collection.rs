//! Generic JSONL document collection.
//!
//! One collection is one `{name}.jsonl` file. Inserts append a line; deletes
//! rewrite the file atomically without the matching documents.

use std::marker::PhantomData;
use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::store::error::{StorageError, StorageResult};

/// How many matching documents a delete removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeleteScope {
    First,
    All,
}

/// A file-backed collection of JSON documents of type `T`.
pub(crate) struct JsonlCollection<T> {
    path: PathBuf,
    /// Serializes every operation on this file within the process.
    lock: Mutex<()>,
    _doc: PhantomData<fn() -> T>,
}

impl<T> JsonlCollection<T>
where
    T: Serialize + DeserializeOwned,
{
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            _doc: PhantomData,
        }
    }

    #[cfg(test)]
    pub(crate) fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Append a document.
    pub(crate) async fn insert(&self, doc: &T) -> StorageResult<()> {
        let mut line =
            serde_json::to_string(doc).map_err(|e| StorageError::serialization(e.to_string()))?;
        line.push('\n');

        let _guard = self.lock.lock().await;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::file_io(parent, e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| StorageError::file_io(&self.path, e))?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| StorageError::file_io(&self.path, e))?;

        file.flush()
            .await
            .map_err(|e| StorageError::file_io(&self.path, e))?;

        Ok(())
    }

    /// Return every document matching `filter`, in file order.
    pub(crate) async fn find<F>(&self, filter: F) -> StorageResult<Vec<T>>
    where
        F: Fn(&T) -> bool,
    {
        let _guard = self.lock.lock().await;

        let Some(content) = self.read().await? else {
            return Ok(Vec::new());
        };

        Ok(content
            .lines()
            .filter_map(|line| self.parse_line(line))
            .filter(|doc| filter(doc))
            .collect())
    }

    /// Remove documents matching `filter`, returning how many were removed.
    ///
    /// Unparseable lines are kept as-is so a delete never loses data it did
    /// not understand.
    pub(crate) async fn delete<F>(&self, filter: F, scope: DeleteScope) -> StorageResult<u64>
    where
        F: Fn(&T) -> bool,
    {
        let _guard = self.lock.lock().await;

        let Some(content) = self.read().await? else {
            return Ok(0);
        };

        let mut removed = 0u64;
        let mut kept = String::with_capacity(content.len());

        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let matches = (scope == DeleteScope::All || removed == 0)
                && serde_json::from_str::<T>(line).is_ok_and(|doc| filter(&doc));
            if matches {
                removed += 1;
            } else {
                kept.push_str(line);
                kept.push('\n');
            }
        }

        if removed == 0 {
            return Ok(0);
        }

        let temp_path = self.path.with_extension("jsonl.tmp");
        super::atomic_write_file(&temp_path, &self.path, kept.as_bytes()).await?;

        debug!(path = %self.path.display(), removed, "Deleted documents");
        Ok(removed)
    }

    /// Read the whole file, or `None` if it does not exist yet.
    async fn read(&self) -> StorageResult<Option<String>> {
        match fs::read_to_string(&self.path).await {
            Ok(c) => Ok(Some(c)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::file_io(&self.path, e)),
        }
    }

    fn parse_line(&self, line: &str) -> Option<T> {
        if line.trim().is_empty() {
            return None;
        }
        match serde_json::from_str(line) {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!(
                    error = %StorageError::file_deserialization(&self.path, e.to_string()),
                    "Skipping unreadable document"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Doc {
        owner: String,
        n: u32,
    }

    fn doc(owner: &str, n: u32) -> Doc {
        Doc {
            owner: owner.to_string(),
            n,
        }
    }

    fn collection(tmp: &TempDir) -> JsonlCollection<Doc> {
        JsonlCollection::new(tmp.path().join("db").join("docs.jsonl"))
    }

    #[tokio::test]
    async fn find_on_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let docs = collection(&tmp);

        assert!(docs.find(|_| true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_creates_parent_dirs_and_preserves_order() {
        let tmp = TempDir::new().unwrap();
        let docs = collection(&tmp);

        docs.insert(&doc("a", 1)).await.unwrap();
        docs.insert(&doc("b", 2)).await.unwrap();
        docs.insert(&doc("a", 3)).await.unwrap();

        let found = docs.find(|d| d.owner == "a").await.unwrap();
        assert_eq!(found, vec![doc("a", 1), doc("a", 3)]);
    }

    #[tokio::test]
    async fn delete_all_removes_every_match() {
        let tmp = TempDir::new().unwrap();
        let docs = collection(&tmp);

        for n in 0..4 {
            docs.insert(&doc(if n % 2 == 0 { "a" } else { "b" }, n))
                .await
                .unwrap();
        }

        let removed = docs.delete(|d| d.owner == "a", DeleteScope::All).await.unwrap();
        assert_eq!(removed, 2);

        let rest = docs.find(|_| true).await.unwrap();
        assert_eq!(rest, vec![doc("b", 1), doc("b", 3)]);
    }

    #[tokio::test]
    async fn delete_first_removes_only_one() {
        let tmp = TempDir::new().unwrap();
        let docs = collection(&tmp);

        docs.insert(&doc("a", 1)).await.unwrap();
        docs.insert(&doc("a", 2)).await.unwrap();

        let removed = docs
            .delete(|d| d.owner == "a", DeleteScope::First)
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(docs.find(|_| true).await.unwrap(), vec![doc("a", 2)]);
    }

    #[tokio::test]
    async fn delete_without_match_leaves_file_untouched() {
        let tmp = TempDir::new().unwrap();
        let docs = collection(&tmp);

        assert_eq!(docs.delete(|_| true, DeleteScope::All).await.unwrap(), 0);

        docs.insert(&doc("a", 1)).await.unwrap();
        assert_eq!(
            docs.delete(|d| d.owner == "zzz", DeleteScope::All)
                .await
                .unwrap(),
            0
        );
        assert_eq!(docs.find(|_| true).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn corrupt_lines_are_skipped_and_kept() {
        let tmp = TempDir::new().unwrap();
        let docs = collection(&tmp);

        docs.insert(&doc("a", 1)).await.unwrap();
        let mut raw = std::fs::read_to_string(docs.path()).unwrap();
        raw.push_str("{not json\n");
        std::fs::write(docs.path(), raw).unwrap();
        docs.insert(&doc("a", 2)).await.unwrap();

        assert_eq!(docs.find(|_| true).await.unwrap().len(), 2);

        docs.delete(|_| true, DeleteScope::All).await.unwrap();
        let raw = std::fs::read_to_string(docs.path()).unwrap();
        assert_eq!(raw, "{not json\n");
    }
}
