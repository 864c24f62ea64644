//! Storage abstraction layer for proctrack.
//!
//! This module defines trait interfaces for all persistence operations,
//! with file-based implementations in the `file` submodule and in-memory
//! ones in `memory`.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │        handlers / scheduler (domain)         │
//! └──────────────────────┬───────────────────────┘
//!                        │ uses traits
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │        store/ (ProcessStore, LogStore)       │
//! └──────────────────────┬───────────────────────┘
//!                        │ implementations
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │ store/file/ (FileProcessStore, FileLogStore) │
//! │ store/memory (MemoryProcessStore, ...)       │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Naming Conventions
//!
//! - `insert` / `append` - add a document
//! - `list` / `list_for` - enumerate documents, optionally filtered by owner
//! - `delete` / `delete_for` - remove by filter, returning the removed count

pub mod error;
pub mod file;
pub mod memory;

mod log;
mod process;

pub use error::{StorageError, StorageResult};
pub use log::LogStore;
pub use process::ProcessStore;
