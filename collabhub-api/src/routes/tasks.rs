/// Task endpoints
///
/// Task creation and listing live under the owning project; everything
/// else addresses the task directly. All mutations are edit-gated in the
/// core; reads require view access.
///
/// # Endpoints
///
/// ```text
/// POST   /api/v1/projects/:project_id/tasks        Create a task
/// GET    /api/v1/projects/:project_id/tasks        List tasks (status filter)
/// GET    /api/v1/tasks/:task_id                    Fetch a task with assignees
/// PATCH  /api/v1/tasks/:task_id                    Update task fields
/// POST   /api/v1/tasks/:task_id/assignees          Add assignees
/// DELETE /api/v1/tasks/:task_id/assignees/:user_id Remove an assignee
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use collabhub_core::access::middleware::Actor;
use collabhub_core::models::task::{CreateTask, Task, TaskPriority, TaskStatus, UpdateTask};
use collabhub_core::ops;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request body for creating a task
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 200, message = "Task title must be 1-200 characters"))]
    pub title: String,

    /// Optional description
    #[serde(default)]
    pub description: String,

    /// Initial status (defaults to `todo`)
    pub status: Option<TaskStatus>,

    /// Priority (defaults to `medium`)
    pub priority: Option<TaskPriority>,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// Initial assignees; must be project members
    #[serde(default)]
    pub assignees: Vec<Uuid>,
}

impl From<CreateTaskRequest> for CreateTask {
    fn from(req: CreateTaskRequest) -> Self {
        CreateTask {
            title: req.title,
            description: req.description,
            status: req.status.unwrap_or(TaskStatus::Todo),
            priority: req.priority.unwrap_or(TaskPriority::Medium),
            due_date: req.due_date,
            assignees: req.assignees,
        }
    }
}

/// Request body for updating a task
///
/// Omitted fields stay untouched; `"due_date": null` clears the date.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 200, message = "Task title must be 1-200 characters"))]
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New priority
    pub priority: Option<TaskPriority>,

    /// New due date; an explicit null clears it
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<NaiveDate>>,
}

impl From<UpdateTaskRequest> for UpdateTask {
    fn from(req: UpdateTaskRequest) -> Self {
        UpdateTask {
            title: req.title,
            description: req.description,
            status: req.status,
            priority: req.priority,
            due_date: req.due_date,
        }
    }
}

/// Distinguishes an absent field from an explicit null
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// Query parameters for listing tasks
#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    /// Restrict the listing to one status
    pub status: Option<TaskStatus>,
}

/// Request body for adding assignees
#[derive(Debug, Deserialize)]
pub struct AddAssigneesRequest {
    /// Users to assign; must be project members
    pub user_ids: Vec<Uuid>,
}

/// Response for assignee additions
#[derive(Debug, Serialize)]
pub struct AddAssigneesResponse {
    /// Users actually added (already-assigned users are skipped)
    pub added: Vec<Uuid>,
}

/// Task detail response
#[derive(Debug, Serialize)]
pub struct TaskDetailResponse {
    /// The task row
    #[serde(flatten)]
    pub task: Task,

    /// Current assignees
    pub assignees: Vec<Uuid>,
}

/// Creates a task in a project
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/projects/:project_id/tasks
/// ```
///
/// # Request
///
/// ```json
/// {
///   "title": "Write the runbook",
///   "description": "",
///   "priority": "high",
///   "due_date": "2026-09-01",
///   "assignees": ["b3c94f6a-8d21-4f0e-9c37-2a4f3a1d9b10"]
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: assignees are not members or exceed the cap
/// - `403 Forbidden`: actor cannot edit the project
/// - `409 Conflict`: the project is completed
/// - `422 Unprocessable Entity`: empty or overlong title
pub async fn create_task(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    tracing::debug!(project_id = %project_id, title = %req.title, "Creating task");

    let task =
        ops::tasks::create_task(&state.db, &actor, project_id, req.into(), state.limits()).await?;

    Ok(Json(task))
}

/// Lists a project's tasks, optionally filtered by status
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(project_id): Path<Uuid>,
    Query(query): Query<TaskListQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = ops::tasks::list_tasks(&state.db, &actor, project_id, query.status).await?;
    Ok(Json(tasks))
}

/// Fetches a task together with its assignees
pub async fn get_task(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<TaskDetailResponse>> {
    let (task, assignees) = ops::tasks::get_task(&state.db, &actor, task_id).await?;

    Ok(Json(TaskDetailResponse { task, assignees }))
}

/// Updates task fields
pub async fn update_task(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    let task = ops::tasks::update_task(&state.db, &actor, task_id, req.into()).await?;

    Ok(Json(task))
}

/// Adds assignees to a task
///
/// Returns only the users actually added; assigning someone twice is not
/// an error. The resulting set must stay within the configured cap.
pub async fn add_assignees(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<AddAssigneesRequest>,
) -> ApiResult<Json<AddAssigneesResponse>> {
    let added =
        ops::tasks::add_assignees(&state.db, &actor, task_id, req.user_ids, state.limits()).await?;

    Ok(Json(AddAssigneesResponse { added }))
}

/// Removes an assignee from a task
pub async fn remove_assignee(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((task_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    ops::tasks::remove_assignee(&state.db, &actor, task_id, user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
