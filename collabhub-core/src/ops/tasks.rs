/// Task operations: creation, field updates, and the assignee set
///
/// Task mutations are edit-gated. Assignee changes use set semantics: adding
/// is a union, only newly inserted users fan out, and the configured cap
/// applies to the resulting set inside the same transaction, so an
/// over-limit request persists nothing.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::access::middleware::Actor;
use crate::access::resolver;
use crate::error::{CoreError, CoreResult};
use crate::fanout::{engine, DomainEvent};
use crate::models::membership::Membership;
use crate::models::project::{Project, ProjectStatus};
use crate::models::task::{CreateTask, Task, TaskStatus, UpdateTask};

use super::Limits;

/// Creates a task in a project
///
/// Edit-gated; rejected with InvalidState on a completed project. The
/// initial assignee set is validated and written in the same transaction,
/// and only the assignees actually inserted are notified.
pub async fn create_task(
    pool: &PgPool,
    actor: &Actor,
    project_id: Uuid,
    data: CreateTask,
    limits: Limits,
) -> CoreResult<Task> {
    let project = Project::find_by_id(pool, project_id)
        .await?
        .ok_or(CoreError::NotFound("Project"))?;

    resolver::require_edit(pool, &project, actor.id).await?;

    if project.status == ProjectStatus::Completed {
        return Err(CoreError::InvalidState(
            "Cannot create tasks on a completed project".to_string(),
        ));
    }

    let assignee_ids = data.assignees.clone();

    let mut tx = pool.begin().await?;

    let task = Task::create(&mut tx, project_id, Some(actor.id), data).await?;

    let added = insert_assignees(
        &mut tx,
        project.id,
        task.id,
        &assignee_ids,
        limits.max_task_assignees,
    )
    .await?;

    engine::dispatch(
        &mut tx,
        &DomainEvent::TaskCreated {
            project: project.clone(),
            task: task.clone(),
        },
    )
    .await?;

    if !added.is_empty() {
        engine::dispatch(
            &mut tx,
            &DomainEvent::AssigneesAdded {
                project,
                task: task.clone(),
                user_ids: added,
            },
        )
        .await?;
    }

    tx.commit().await?;

    tracing::info!(task_id = %task.id, project_id = %project_id, "Created task");

    Ok(task)
}

/// Updates a task's fields
///
/// Edit-gated. Field updates have no fanout of their own.
pub async fn update_task(
    pool: &PgPool,
    actor: &Actor,
    task_id: Uuid,
    data: UpdateTask,
) -> CoreResult<Task> {
    let task = Task::find_by_id(pool, task_id)
        .await?
        .ok_or(CoreError::NotFound("Task"))?;
    let project = Project::find_by_id(pool, task.project_id)
        .await?
        .ok_or(CoreError::NotFound("Project"))?;

    resolver::require_edit(pool, &project, actor.id).await?;

    let task = Task::update(pool, task_id, data)
        .await?
        .ok_or(CoreError::NotFound("Task"))?;

    Ok(task)
}

/// Fetches a task and its assignee set
pub async fn get_task(pool: &PgPool, actor: &Actor, task_id: Uuid) -> CoreResult<(Task, Vec<Uuid>)> {
    let task = Task::find_by_id(pool, task_id)
        .await?
        .ok_or(CoreError::NotFound("Task"))?;
    let project = Project::find_by_id(pool, task.project_id)
        .await?
        .ok_or(CoreError::NotFound("Project"))?;

    resolver::require_view(pool, &project, actor.id).await?;

    let assignees = Task::list_assignees(pool, task_id).await?;

    Ok((task, assignees))
}

/// Lists a project's tasks, optionally filtered by status
pub async fn list_tasks(
    pool: &PgPool,
    actor: &Actor,
    project_id: Uuid,
    status: Option<TaskStatus>,
) -> CoreResult<Vec<Task>> {
    let project = Project::find_by_id(pool, project_id)
        .await?
        .ok_or(CoreError::NotFound("Project"))?;

    resolver::require_view(pool, &project, actor.id).await?;

    let tasks = match status {
        Some(status) => Task::list_by_status(pool, project_id, status).await?,
        None => Task::list_by_project(pool, project_id).await?,
    };

    Ok(tasks)
}

/// Adds users to a task's assignee set
///
/// Returns the ids actually inserted; users already assigned are skipped
/// and receive no second notification.
pub async fn add_assignees(
    pool: &PgPool,
    actor: &Actor,
    task_id: Uuid,
    user_ids: Vec<Uuid>,
    limits: Limits,
) -> CoreResult<Vec<Uuid>> {
    let task = Task::find_by_id(pool, task_id)
        .await?
        .ok_or(CoreError::NotFound("Task"))?;
    let project = Project::find_by_id(pool, task.project_id)
        .await?
        .ok_or(CoreError::NotFound("Project"))?;

    resolver::require_edit(pool, &project, actor.id).await?;

    let mut tx = pool.begin().await?;

    let added = insert_assignees(
        &mut tx,
        project.id,
        task.id,
        &user_ids,
        limits.max_task_assignees,
    )
    .await?;

    if !added.is_empty() {
        engine::dispatch(
            &mut tx,
            &DomainEvent::AssigneesAdded {
                project,
                task: task.clone(),
                user_ids: added.clone(),
            },
        )
        .await?;
    }

    tx.commit().await?;

    Ok(added)
}

/// Removes a user from a task's assignee set
///
/// Edit-gated; no fanout.
pub async fn remove_assignee(
    pool: &PgPool,
    actor: &Actor,
    task_id: Uuid,
    user_id: Uuid,
) -> CoreResult<()> {
    let task = Task::find_by_id(pool, task_id)
        .await?
        .ok_or(CoreError::NotFound("Task"))?;
    let project = Project::find_by_id(pool, task.project_id)
        .await?
        .ok_or(CoreError::NotFound("Project"))?;

    resolver::require_edit(pool, &project, actor.id).await?;

    if !Task::remove_assignee(pool, task_id, user_id).await? {
        return Err(CoreError::NotFound("Assignee"));
    }

    Ok(())
}

/// Validates and inserts assignees inside the mutation's transaction
///
/// Assignees must be members of the task's project, and the resulting set
/// must not exceed the cap. The cap is checked after the insert; a
/// violation surfaces as a validation error and the caller's transaction
/// rolls back, so nothing persists.
async fn insert_assignees(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
    task_id: Uuid,
    user_ids: &[Uuid],
    max_assignees: i64,
) -> CoreResult<Vec<Uuid>> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }

    let non_members = Membership::filter_non_members(tx, project_id, user_ids).await?;
    if !non_members.is_empty() {
        let ids = non_members
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(CoreError::Validation(format!(
            "Assignees must be project members: {}",
            ids
        )));
    }

    let added = Task::add_assignees(tx, task_id, user_ids).await?;

    let total = Task::count_assignees(tx, task_id).await?;
    if total > max_assignees {
        return Err(CoreError::Validation(format!(
            "A task can have at most {} assignees",
            max_assignees
        )));
    }

    Ok(added)
}
