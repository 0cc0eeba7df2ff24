/// Comment operations
///
/// Commenting requires view access on the resolved project: any member can
/// participate in discussion, including viewers. Creating a comment fans
/// out the feed entry and any mention notifications atomically with the
/// comment row.

use sqlx::PgPool;
use uuid::Uuid;

use crate::access::middleware::Actor;
use crate::access::resolver;
use crate::error::{CoreError, CoreResult};
use crate::fanout::{engine, DomainEvent};
use crate::models::comment::{Comment, CreateComment};
use crate::models::project::Project;
use crate::models::task::Task;

/// Creates a comment on a project or task
///
/// The target must be exactly one of project/task; task comments resolve
/// their project through the task.
pub async fn create_comment(
    pool: &PgPool,
    actor: &Actor,
    data: CreateComment,
) -> CoreResult<Comment> {
    let project = super::resolve_target(pool, data.project_id, data.task_id).await?;

    resolver::require_view(pool, &project, actor.id).await?;

    let mut tx = pool.begin().await?;

    let comment = Comment::create(&mut tx, actor.id, data).await?;

    engine::dispatch(
        &mut tx,
        &DomainEvent::CommentAdded {
            project,
            comment: comment.clone(),
            author: actor.clone(),
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(comment_id = %comment.id, author_id = %actor.id, "Created comment");

    Ok(comment)
}

/// Lists comments attached directly to a project, oldest first
pub async fn list_project_comments(
    pool: &PgPool,
    actor: &Actor,
    project_id: Uuid,
) -> CoreResult<Vec<Comment>> {
    let project = Project::find_by_id(pool, project_id)
        .await?
        .ok_or(CoreError::NotFound("Project"))?;

    resolver::require_view(pool, &project, actor.id).await?;

    let comments = Comment::list_by_project(pool, project_id).await?;
    Ok(comments)
}

/// Lists comments on a task, oldest first
pub async fn list_task_comments(
    pool: &PgPool,
    actor: &Actor,
    task_id: Uuid,
) -> CoreResult<Vec<Comment>> {
    let task = Task::find_by_id(pool, task_id)
        .await?
        .ok_or(CoreError::NotFound("Task"))?;
    let project = Project::find_by_id(pool, task.project_id)
        .await?
        .ok_or(CoreError::NotFound("Project"))?;

    resolver::require_view(pool, &project, actor.id).await?;

    let comments = Comment::list_by_task(pool, task_id).await?;
    Ok(comments)
}
