/// Project operations: creation, lifecycle, and view-gated reads
///
/// Creating a project also creates the owner's own `owner`-role membership
/// in the same transaction, so ownership and membership start out in sync.
/// The lifecycle transitions (complete / reopen) are owner-gated and
/// append their own feed entries.

use sqlx::PgPool;
use uuid::Uuid;

use crate::access::middleware::Actor;
use crate::access::resolver;
use crate::error::{CoreError, CoreResult};
use crate::fanout::{engine, DomainEvent};
use crate::models::activity::Activity;
use crate::models::membership::{CreateMembership, Membership, MembershipRole};
use crate::models::project::{CreateProject, Project};

/// Creates a project owned by the actor
///
/// The owner's auto-membership fans out as a member-added event, which the
/// engine self-suppresses, so the feed shows a single creation entry.
pub async fn create_project(
    pool: &PgPool,
    actor: &Actor,
    data: CreateProject,
) -> CoreResult<Project> {
    let mut tx = pool.begin().await?;

    let project = Project::create(&mut tx, actor.id, data).await?;

    let membership = Membership::create(
        &mut tx,
        CreateMembership {
            project_id: project.id,
            user_id: actor.id,
            role: MembershipRole::Owner,
        },
    )
    .await?;

    engine::dispatch(
        &mut tx,
        &DomainEvent::ProjectCreated {
            project: project.clone(),
        },
    )
    .await?;
    engine::dispatch(
        &mut tx,
        &DomainEvent::MemberAdded {
            project: project.clone(),
            membership,
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(project_id = %project.id, owner_id = %actor.id, "Created project");

    Ok(project)
}

/// Marks a project as completed
///
/// Owner-gated. Completing an already-completed project is an invalid
/// transition.
pub async fn complete_project(
    pool: &PgPool,
    actor: &Actor,
    project_id: Uuid,
) -> CoreResult<Project> {
    let project = Project::find_by_id(pool, project_id)
        .await?
        .ok_or(CoreError::NotFound("Project"))?;

    resolver::require_manage(&project, actor.id)?;

    let mut tx = pool.begin().await?;

    let project = Project::mark_completed(&mut tx, project_id)
        .await?
        .ok_or_else(|| CoreError::InvalidState("Project is already completed".to_string()))?;

    engine::dispatch(
        &mut tx,
        &DomainEvent::ProjectCompleted {
            project: project.clone(),
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(project_id = %project.id, "Marked project as completed");

    Ok(project)
}

/// Reopens a completed project
///
/// Owner-gated. Reopening a project that is not completed is an invalid
/// transition.
pub async fn reopen_project(pool: &PgPool, actor: &Actor, project_id: Uuid) -> CoreResult<Project> {
    let project = Project::find_by_id(pool, project_id)
        .await?
        .ok_or(CoreError::NotFound("Project"))?;

    resolver::require_manage(&project, actor.id)?;

    let mut tx = pool.begin().await?;

    let project = Project::reopen(&mut tx, project_id)
        .await?
        .ok_or_else(|| CoreError::InvalidState("Project is not completed".to_string()))?;

    engine::dispatch(
        &mut tx,
        &DomainEvent::ProjectReopened {
            project: project.clone(),
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(project_id = %project.id, "Reopened project");

    Ok(project)
}

/// Fetches a project the actor can view
pub async fn get_project(pool: &PgPool, actor: &Actor, project_id: Uuid) -> CoreResult<Project> {
    let project = Project::find_by_id(pool, project_id)
        .await?
        .ok_or(CoreError::NotFound("Project"))?;

    resolver::require_view(pool, &project, actor.id).await?;

    Ok(project)
}

/// Lists the projects the actor can see (member or owner)
pub async fn list_projects(pool: &PgPool, actor: &Actor) -> CoreResult<Vec<Project>> {
    let projects = Project::list_for_user(pool, actor.id).await?;
    Ok(projects)
}

/// Lists a project's activity feed, newest first
pub async fn list_activity(
    pool: &PgPool,
    actor: &Actor,
    project_id: Uuid,
    limit: i64,
    offset: i64,
) -> CoreResult<Vec<Activity>> {
    let project = Project::find_by_id(pool, project_id)
        .await?
        .ok_or(CoreError::NotFound("Project"))?;

    resolver::require_view(pool, &project, actor.id).await?;

    let activities = Activity::list_by_project(pool, project_id, limit, offset).await?;
    Ok(activities)
}
