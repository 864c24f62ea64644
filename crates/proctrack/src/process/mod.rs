//! Tracked processes and their activity log.
//!
//! A "process" here is a logical unit identified by an opaque id, not an OS
//! process. The registry owns the periodic log task of every live process.

pub mod registry;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scheduler::SchedulerError;

pub use registry::ProcessRegistry;

/// Length of generated process ids.
pub const PROCESS_ID_LEN: usize = 8;

/// Alphabet for generated process ids (lowercase base-36).
const PROCESS_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

// ============================================================================
// Records
// ============================================================================

/// A tracked process, persisted on creation and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

impl ProcessRecord {
    /// Create a record for `id` stamped with the current time.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
        }
    }
}

/// One tick of a process's activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessLogEntry {
    pub process_id: String,
    pub logged_at: DateTime<Utc>,
}

impl ProcessLogEntry {
    /// Create an entry for `process_id` stamped with the current time.
    pub fn now(process_id: impl Into<String>) -> Self {
        Self {
            process_id: process_id.into(),
            logged_at: Utc::now(),
        }
    }
}

// ============================================================================
// RegistryError
// ============================================================================

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("process already registered: {0}")]
    AlreadyRegistered(String),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

// ============================================================================
// Helpers
// ============================================================================

/// Generate a random process id.
///
/// Uniqueness is probabilistic; ids are never checked against the store.
pub fn generate_process_id() -> String {
    let mut rng = rand::rng();
    (0..PROCESS_ID_LEN)
        .map(|_| PROCESS_ID_ALPHABET[rng.random_range(0..PROCESS_ID_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn generate_process_id_shape() {
        let id = generate_process_id();
        assert_eq!(id.len(), PROCESS_ID_LEN);
        assert!(
            id.chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
    }

    #[test]
    fn generate_process_id_is_distinct() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_process_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn process_record_serde_roundtrip() {
        let record = ProcessRecord::new("a1b2c3d4");
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"id\":\"a1b2c3d4\""));

        let parsed: ProcessRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn registry_error_display() {
        let err = RegistryError::AlreadyRegistered("a1b2c3d4".to_string());
        assert_eq!(err.to_string(), "process already registered: a1b2c3d4");
    }
}
