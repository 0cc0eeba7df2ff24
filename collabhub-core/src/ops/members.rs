/// Member management operations
///
/// All mutations here are owner-gated (`require_manage`). The owner's own
/// position is protected: the owner cannot be added again, removed, or
/// re-roled, and the `owner` role itself is never grantable through these
/// operations. Member listings only require view access.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::access::middleware::Actor;
use crate::access::resolver;
use crate::error::{CoreError, CoreResult};
use crate::fanout::{engine, DomainEvent};
use crate::models::membership::{CreateMembership, Membership, MembershipRole, ProjectMember};
use crate::models::project::Project;
use crate::models::user::User;

/// Input for adding a member to a project
#[derive(Debug, Clone, Deserialize)]
pub struct AddMember {
    /// User to add
    pub user_id: Uuid,

    /// Role to grant (defaults to viewer)
    #[serde(default = "default_role")]
    pub role: MembershipRole,
}

fn default_role() -> MembershipRole {
    MembershipRole::Viewer
}

/// Adds a user to a project
///
/// The target user must exist and must not already hold a membership. The
/// added user is notified and the feed records the addition.
pub async fn add_member(
    pool: &PgPool,
    actor: &Actor,
    project_id: Uuid,
    data: AddMember,
) -> CoreResult<Membership> {
    let project = Project::find_by_id(pool, project_id)
        .await?
        .ok_or(CoreError::NotFound("Project"))?;

    resolver::require_manage(&project, actor.id)?;

    if data.role == MembershipRole::Owner {
        return Err(CoreError::Validation(
            "The owner role cannot be granted through member management".to_string(),
        ));
    }

    User::find_by_id(pool, data.user_id)
        .await?
        .ok_or(CoreError::NotFound("User"))?;

    if data.user_id == project.owner_id {
        return Err(CoreError::Validation(
            "The project owner cannot be added as a member".to_string(),
        ));
    }

    if Membership::find(pool, project_id, data.user_id).await?.is_some() {
        return Err(CoreError::Validation(
            "User is already a member of this project".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    let membership = Membership::create(
        &mut tx,
        CreateMembership {
            project_id,
            user_id: data.user_id,
            role: data.role,
        },
    )
    .await?;

    engine::dispatch(
        &mut tx,
        &DomainEvent::MemberAdded {
            project,
            membership: membership.clone(),
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        project_id = %project_id,
        user_id = %membership.user_id,
        role = membership.role.as_str(),
        "Added project member"
    );

    Ok(membership)
}

/// Removes a member from a project
///
/// The project owner cannot be removed. Removal has no fanout.
pub async fn remove_member(
    pool: &PgPool,
    actor: &Actor,
    project_id: Uuid,
    user_id: Uuid,
) -> CoreResult<()> {
    let project = Project::find_by_id(pool, project_id)
        .await?
        .ok_or(CoreError::NotFound("Project"))?;

    resolver::require_manage(&project, actor.id)?;

    if user_id == project.owner_id {
        return Err(CoreError::Validation(
            "The project owner cannot be removed".to_string(),
        ));
    }

    if !Membership::delete(pool, project_id, user_id).await? {
        return Err(CoreError::NotFound("Membership"));
    }

    tracing::info!(project_id = %project_id, user_id = %user_id, "Removed project member");

    Ok(())
}

/// Changes a member's role
///
/// The owner's membership is untouchable and `owner` is not assignable.
/// Role changes have no fanout.
pub async fn change_member_role(
    pool: &PgPool,
    actor: &Actor,
    project_id: Uuid,
    user_id: Uuid,
    role: MembershipRole,
) -> CoreResult<Membership> {
    let project = Project::find_by_id(pool, project_id)
        .await?
        .ok_or(CoreError::NotFound("Project"))?;

    resolver::require_manage(&project, actor.id)?;

    if role == MembershipRole::Owner {
        return Err(CoreError::Validation(
            "The owner role cannot be granted through member management".to_string(),
        ));
    }

    if user_id == project.owner_id {
        return Err(CoreError::Validation(
            "The project owner's role cannot be changed".to_string(),
        ));
    }

    let membership = Membership::update_role(pool, project_id, user_id, role)
        .await?
        .ok_or(CoreError::NotFound("Membership"))?;

    tracing::info!(
        project_id = %project_id,
        user_id = %user_id,
        role = role.as_str(),
        "Changed member role"
    );

    Ok(membership)
}

/// Lists a project's members with usernames
pub async fn list_members(
    pool: &PgPool,
    actor: &Actor,
    project_id: Uuid,
) -> CoreResult<Vec<ProjectMember>> {
    let project = Project::find_by_id(pool, project_id)
        .await?
        .ok_or(CoreError::NotFound("Project"))?;

    resolver::require_view(pool, &project, actor.id).await?;

    let members = Membership::list_with_users(pool, project_id).await?;
    Ok(members)
}
