/// Comment endpoints
///
/// Comments target exactly one of a project or a task; creation takes the
/// target in the body and listings hang off the target's routes. Any
/// member can comment, including viewers.
///
/// # Endpoints
///
/// ```text
/// POST /api/v1/comments                         Create a comment
/// GET  /api/v1/projects/:project_id/comments    List project comments
/// GET  /api/v1/tasks/:task_id/comments          List task comments
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use collabhub_core::access::middleware::Actor;
use collabhub_core::models::comment::{Comment, CreateComment};
use collabhub_core::ops;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Request body for creating a comment
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    /// Project target
    pub project_id: Option<Uuid>,

    /// Task target
    pub task_id: Option<Uuid>,

    /// Comment body; `@username` tokens notify mentioned members
    #[validate(length(min = 1, message = "Comment body must not be empty"))]
    pub body: String,
}

/// Creates a comment on a project or task
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/comments
/// ```
///
/// # Request
///
/// ```json
/// {
///   "project_id": "b3c94f6a-8d21-4f0e-9c37-2a4f3a1d9b10",
///   "body": "@alice the runbook draft is ready"
/// }
/// ```
///
/// Exactly one of `project_id` / `task_id` must be set. Mentioned members
/// are notified once per comment target; unknown or ineligible mentions
/// are silently skipped.
///
/// # Errors
///
/// - `403 Forbidden`: actor cannot view the resolved project
/// - `409 Conflict`: zero or both targets given
/// - `422 Unprocessable Entity`: empty body
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<Json<Comment>> {
    req.validate()?;

    tracing::debug!(author_id = %actor.id, "Creating comment");

    let comment = ops::comments::create_comment(
        &state.db,
        &actor,
        CreateComment {
            project_id: req.project_id,
            task_id: req.task_id,
            body: req.body,
        },
    )
    .await?;

    Ok(Json(comment))
}

/// Lists comments attached directly to a project, oldest first
pub async fn list_project_comments(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Comment>>> {
    let comments = ops::comments::list_project_comments(&state.db, &actor, project_id).await?;
    Ok(Json(comments))
}

/// Lists comments on a task, oldest first
pub async fn list_task_comments(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Comment>>> {
    let comments = ops::comments::list_task_comments(&state.db, &actor, task_id).await?;
    Ok(Json(comments))
}
