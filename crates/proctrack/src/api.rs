//! Wire types for the HTTP API.
//!
//! Field names follow the public contract (`PID`, `creationTime`, ...) and
//! must not change without bumping clients.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::process::{ProcessLogEntry, ProcessRecord};

/// Body of `GET /`.
pub const ROOT_MESSAGE: &str = "Process Management Server is running";

/// Display pattern for timestamps: `02:15 PM 09 6 2024`.
pub const TIMESTAMP_FORMAT: &str = "%I:%M %p %d %-m %Y";

// ============================================================================
// Timestamps
// ============================================================================

/// Format a timestamp in its own timezone.
pub fn format_timestamp<Tz>(ts: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Format a stored UTC timestamp in the server's local timezone.
pub fn format_local(ts: &DateTime<Utc>) -> String {
    format_timestamp(&ts.with_timezone(&Local))
}

// ============================================================================
// Requests
// ============================================================================

/// Body of `GET /get-single` and `DELETE /delete-process`.
///
/// A missing body or a missing `id` reads as the empty id, which matches no
/// process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessIdRequest {
    #[serde(default)]
    pub id: String,
}

impl ProcessIdRequest {
    /// Parse a raw request body regardless of its `Content-Type`.
    pub fn from_body(body: &[u8]) -> serde_json::Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
    }
}

// ============================================================================
// Responses
// ============================================================================

/// A process in create and list responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSummary {
    #[serde(rename = "PID")]
    pub pid: String,
    #[serde(rename = "creationTime")]
    pub creation_time: String,
}

impl From<&ProcessRecord> for ProcessSummary {
    fn from(process: &ProcessRecord) -> Self {
        Self {
            pid: process.id.clone(),
            creation_time: format_local(&process.created_at),
        }
    }
}

/// Response of `GET /get-single`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessLogsResponse {
    pub logs: Vec<String>,
}

impl ProcessLogsResponse {
    pub fn from_entries(entries: &[ProcessLogEntry]) -> Self {
        Self {
            logs: entries.iter().map(|e| format_local(&e.logged_at)).collect(),
        }
    }
}

/// Count of documents removed by a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub deleted_count: u64,
}

/// Response of `DELETE /delete-process`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteProcessResponse {
    pub status: String,
    pub message: String,
    pub process_result: DeleteResult,
    pub delete_result: DeleteResult,
}

impl DeleteProcessResponse {
    pub fn success(id: &str, processes_deleted: u64, logs_deleted: u64) -> Self {
        Self {
            status: "success".to_string(),
            message: format!("PID - {id}: Process and logs successfully deleted"),
            process_result: DeleteResult {
                deleted_count: processes_deleted,
            },
            delete_result: DeleteResult {
                deleted_count: logs_deleted,
            },
        }
    }
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn internal() -> Self {
        Self {
            status: "error".to_string(),
            message: "Internal Server Error".to_string(),
        }
    }
}
