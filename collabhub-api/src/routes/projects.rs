/// Project endpoints
///
/// Project creation, lifecycle transitions and the view-gated reads that
/// hang off a project: the project itself, the listing of projects the
/// actor can see, and the activity feed.
///
/// # Endpoints
///
/// ```text
/// POST /api/v1/projects                        Create a project
/// GET  /api/v1/projects                        List visible projects
/// GET  /api/v1/projects/:project_id            Fetch a project
/// POST /api/v1/projects/:project_id/complete   Mark as completed
/// POST /api/v1/projects/:project_id/reopen     Reopen a completed project
/// GET  /api/v1/projects/:project_id/activity   Activity feed, newest first
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use collabhub_core::access::middleware::Actor;
use collabhub_core::models::activity::Activity;
use collabhub_core::models::project::{CreateProject, Project};
use collabhub_core::ops;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Request body for creating a project
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Project name
    #[validate(length(min = 1, max = 200, message = "Project name must be 1-200 characters"))]
    pub name: String,

    /// Optional description
    #[serde(default)]
    pub description: String,
}

/// Query parameters for the activity feed
#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    /// Page size (default 50, capped at 200)
    pub limit: Option<i64>,

    /// Rows to skip
    pub offset: Option<i64>,
}

/// Creates a project owned by the actor
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/projects
/// ```
///
/// # Request
///
/// ```json
/// {
///   "name": "Launch",
///   "description": "Everything for the Q3 launch"
/// }
/// ```
///
/// The actor becomes the owner and receives an `owner`-role membership;
/// the project feed opens with a creation entry.
pub async fn create_project(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.validate()?;

    tracing::debug!(actor_id = %actor.id, name = %req.name, "Creating project");

    let project = ops::projects::create_project(
        &state.db,
        &actor,
        CreateProject {
            name: req.name,
            description: req.description,
        },
    )
    .await?;

    Ok(Json(project))
}

/// Lists projects the actor owns or has joined
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = ops::projects::list_projects(&state.db, &actor).await?;
    Ok(Json(projects))
}

/// Fetches a project the actor can view
pub async fn get_project(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    let project = ops::projects::get_project(&state.db, &actor, project_id).await?;
    Ok(Json(project))
}

/// Marks a project as completed
///
/// Owner-only. Completing an already-completed project is a `409`.
pub async fn complete_project(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    let project = ops::projects::complete_project(&state.db, &actor, project_id).await?;
    Ok(Json(project))
}

/// Reopens a completed project
///
/// Owner-only. Reopening an active project is a `409`.
pub async fn reopen_project(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    let project = ops::projects::reopen_project(&state.db, &actor, project_id).await?;
    Ok(Json(project))
}

/// Lists the project's activity feed, newest first
pub async fn list_activity(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(project_id): Path<Uuid>,
    Query(query): Query<ActivityQuery>,
) -> ApiResult<Json<Vec<Activity>>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);

    let activities =
        ops::projects::list_activity(&state.db, &actor, project_id, limit, offset).await?;

    Ok(Json(activities))
}
