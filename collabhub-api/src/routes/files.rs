/// File metadata endpoints
///
/// Only metadata is recorded; file content storage lives elsewhere. Like
/// comments, a file targets exactly one of a project or a task and the
/// declared name and size are validated before anything persists.
///
/// # Endpoints
///
/// ```text
/// POST /api/v1/files                         Record an uploaded file
/// GET  /api/v1/projects/:project_id/files    List project files
/// GET  /api/v1/tasks/:task_id/files          List task files
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use collabhub_core::access::middleware::Actor;
use collabhub_core::models::stored_file::{CreateStoredFile, StoredFile};
use collabhub_core::ops;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Request body for recording a file
#[derive(Debug, Deserialize, Validate)]
pub struct RecordFileRequest {
    /// Project target
    pub project_id: Option<Uuid>,

    /// Task target
    pub task_id: Option<Uuid>,

    /// Original filename; the extension is checked against an allow-list
    #[validate(length(min = 1, max = 255, message = "Filename must be 1-255 characters"))]
    pub original_filename: String,

    /// Declared size in bytes
    pub size_bytes: i64,
}

/// Records an uploaded file's metadata
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/files
/// ```
///
/// # Request
///
/// ```json
/// {
///   "project_id": "b3c94f6a-8d21-4f0e-9c37-2a4f3a1d9b10",
///   "original_filename": "plan.pdf",
///   "size_bytes": 52000
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: disallowed extension, non-positive or oversized size
/// - `403 Forbidden`: actor cannot view the resolved project
/// - `409 Conflict`: zero or both targets given
/// - `422 Unprocessable Entity`: empty or overlong filename
pub async fn record_file(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<RecordFileRequest>,
) -> ApiResult<Json<StoredFile>> {
    req.validate()?;

    tracing::debug!(uploader_id = %actor.id, filename = %req.original_filename, "Recording file");

    let file = ops::files::record_file(
        &state.db,
        &actor,
        CreateStoredFile {
            project_id: req.project_id,
            task_id: req.task_id,
            original_filename: req.original_filename,
            size_bytes: req.size_bytes,
        },
        state.limits(),
    )
    .await?;

    Ok(Json(file))
}

/// Lists files attached directly to a project, newest first
pub async fn list_project_files(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<StoredFile>>> {
    let files = ops::files::list_project_files(&state.db, &actor, project_id).await?;
    Ok(Json(files))
}

/// Lists files attached to a task, newest first
pub async fn list_task_files(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Vec<StoredFile>>> {
    let files = ops::files::list_task_files(&state.db, &actor, task_id).await?;
    Ok(Json(files))
}
