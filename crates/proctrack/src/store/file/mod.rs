//! File-based storage implementations.
//!
//! A database is a directory holding one JSONL file per collection:
//!
//! ```text
//! {data_dir}/{database}/
//! ├── process.jsonl
//! └── log.jsonl
//! ```
//!
//! Appends go straight to the end of the file. Deletes rewrite it via
//! temp file + rename so a crash never leaves a half-written collection.

mod collection;
mod log;
mod process;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

use super::error::{StorageError, StorageResult};

pub use log::FileLogStore;
pub use process::FileProcessStore;

/// Collection file holding process records.
pub const PROCESS_COLLECTION: &str = "process.jsonl";
/// Collection file holding log entries.
pub const LOG_COLLECTION: &str = "log.jsonl";

/// Handle to an opened file database.
#[derive(Clone)]
pub struct FileDocumentStore {
    root: PathBuf,
    processes: Arc<FileProcessStore>,
    logs: Arc<FileLogStore>,
}

impl FileDocumentStore {
    /// Open (and create if needed) the database `name` under `data_dir`.
    ///
    /// Fails if the directory cannot be created or is not writable.
    pub async fn open(data_dir: impl AsRef<Path>, name: &str) -> StorageResult<Self> {
        let root = data_dir.as_ref().join(name);
        fs::create_dir_all(&root)
            .await
            .map_err(|e| StorageError::file_io(&root, e))?;

        let probe = root.join(".write-probe");
        fs::write(&probe, b"ok")
            .await
            .map_err(|e| StorageError::file_io(&probe, e))?;
        fs::remove_file(&probe)
            .await
            .map_err(|e| StorageError::file_io(&probe, e))?;

        info!(path = %root.display(), "Opened document store");

        Ok(Self {
            processes: Arc::new(FileProcessStore::new(root.join(PROCESS_COLLECTION))),
            logs: Arc::new(FileLogStore::new(root.join(LOG_COLLECTION))),
            root,
        })
    }

    /// Directory holding this database's collections.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn processes(&self) -> Arc<FileProcessStore> {
        self.processes.clone()
    }

    pub fn logs(&self) -> Arc<FileLogStore> {
        self.logs.clone()
    }
}

/// Write `contents` to `temp_path`, fsync, then rename over `path`.
pub(crate) async fn atomic_write_file(
    temp_path: &Path,
    path: &Path,
    contents: &[u8],
) -> StorageResult<()> {
    let mut file = fs::File::create(temp_path)
        .await
        .map_err(|e| StorageError::file_io(temp_path, e))?;
    file.write_all(contents)
        .await
        .map_err(|e| StorageError::file_io(temp_path, e))?;
    file.sync_all()
        .await
        .map_err(|e| StorageError::file_io(temp_path, e))?;
    drop(file);

    fs::rename(temp_path, path)
        .await
        .map_err(|e| StorageError::file_io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn open_creates_database_dir() {
        let tmp = TempDir::new().unwrap();
        let store = FileDocumentStore::open(tmp.path(), "processes").await.unwrap();

        assert_eq!(store.root(), tmp.path().join("processes"));
        assert!(store.root().is_dir());
        assert!(!store.root().join(".write-probe").exists());
    }

    #[tokio::test]
    async fn open_fails_when_data_dir_is_a_file() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();

        let result = FileDocumentStore::open(&blocker, "processes").await;
        assert!(matches!(result, Err(StorageError::FileIo { .. })));
    }

    #[tokio::test]
    async fn atomic_write_replaces_contents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("c.jsonl");
        std::fs::write(&path, "old\n").unwrap();

        atomic_write_file(&path.with_extension("jsonl.tmp"), &path, b"new\n")
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new\n");
        assert!(!path.with_extension("jsonl.tmp").exists());
    }
}
