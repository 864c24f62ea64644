//! Process management HTTP handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use tracing::{debug, info, warn};

use crate::api::{DeleteProcessResponse, ProcessIdRequest, ProcessLogsResponse, ProcessSummary};
use crate::process::{ProcessRecord, generate_process_id};
use crate::server::AppState;

use super::error::ApiError;

/// POST /create-process
///
/// Persists a new process, then starts its tick loop. If persisting fails
/// nothing is scheduled. If scheduling fails the record stays in the store
/// without a tick loop; there is no rollback.
pub async fn create_process(
    State(state): State<AppState>,
) -> Result<Json<ProcessSummary>, ApiError> {
    let process = ProcessRecord::new(generate_process_id());

    state
        .processes
        .insert(&process)
        .await
        .map_err(|e| ApiError::storage("Error inserting process", e))?;

    state
        .registry
        .register(&process.id)
        .map_err(|e| {
            warn!(process_id = %process.id, "Process persisted without a tick loop");
            ApiError::registry("Error scheduling process", e)
        })?;

    info!(process_id = %process.id, "Process created");
    Ok(Json(ProcessSummary::from(&process)))
}

/// GET /get-all
pub async fn get_all(State(state): State<AppState>) -> Result<Json<Vec<ProcessSummary>>, ApiError> {
    let processes = state
        .processes
        .list()
        .await
        .map_err(|e| ApiError::storage("Error getting processes", e))?;

    Ok(Json(processes.iter().map(ProcessSummary::from).collect()))
}

/// GET /get-single
///
/// Body: `{"id": "..."}`. Unknown or missing ids yield an empty list.
pub async fn get_single(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ProcessLogsResponse>, ApiError> {
    let req = parse_id_body(body)?;
    let entries = state
        .logs
        .list_for(&req.id)
        .await
        .map_err(|e| ApiError::storage("Error getting single process logs", e))?;

    Ok(Json(ProcessLogsResponse::from_entries(&entries)))
}

/// DELETE /delete-process
///
/// Body: `{"id": "..."}`. Unknown or missing ids delete nothing and still
/// succeed.
///
/// The tick loop is cancelled before any store delete so no new tick starts
/// for a process whose record is going away. A tick already writing may
/// still land one entry after the log purge.
pub async fn delete_process(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<DeleteProcessResponse>, ApiError> {
    let id = parse_id_body(body)?.id;

    let was_scheduled = state.registry.unregister(&id);
    debug!(process_id = %id, was_scheduled, "Cancelled tick loop");

    let processes_deleted = state
        .processes
        .delete(&id)
        .await
        .map_err(|e| ApiError::storage("Error deleting process and logs", e))?;

    let logs_deleted = state
        .logs
        .delete_for(&id)
        .await
        .map_err(|e| ApiError::storage("Error deleting process and logs", e))?;

    info!(
        process_id = %id,
        processes_deleted,
        logs_deleted,
        "Process deleted"
    );

    Ok(Json(DeleteProcessResponse::success(
        &id,
        processes_deleted,
        logs_deleted,
    )))
}

/// Read `{"id": ...}` from a body of any content type.
fn parse_id_body(body: Result<Bytes, BytesRejection>) -> Result<ProcessIdRequest, ApiError> {
    let body = body.map_err(|e| ApiError::invalid_body(e.to_string()))?;
    ProcessIdRequest::from_body(&body).map_err(|e| ApiError::invalid_body(e.to_string()))
}
