/// Role resolution and capability checks
///
/// Every project-scoped operation gates on one of three capabilities before
/// touching data:
///
/// 1. **view**: the user has any membership row in the project, or is the
///    project owner
/// 2. **edit**: the user's role is owner or editor, or the user is the
///    project owner
/// 3. **manage**: the user is the project owner (`projects.owner_id`)
///
/// The asymmetry is intentional. Roles grant content access; managing
/// members and the project lifecycle is bound to the owner column so a
/// membership row with role `owner` on its own never confers manage rights.
///
/// # Example
///
/// ```no_run
/// use collabhub_core::access::resolver::{require_view, require_manage};
/// use collabhub_core::models::project::Project;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// async fn check(pool: &PgPool, project: &Project, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
///     // Read access goes through the membership store
///     require_view(pool, project, user_id).await?;
///
///     // Manage access is a pure owner check
///     require_manage(project, user_id)?;
///     Ok(())
/// }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::membership::{Membership, MembershipRole};
use crate::models::project::Project;

/// Error type for capability checks
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// User has no membership in the project and is not its owner
    #[error("Not a member of project {0}")]
    NotMember(Uuid),

    /// User can view but not edit content
    #[error("Role {actual:?} cannot edit content in project {project_id}")]
    CannotEdit {
        project_id: Uuid,
        actual: MembershipRole,
    },

    /// Only the project owner can perform this operation
    #[error("Only the owner can manage project {0}")]
    NotOwner(Uuid),

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Resolves a user's role in a project
///
/// Returns the membership role, or None when the user has no membership row.
/// The owner column is not consulted here; callers that treat the owner
/// specially do so through the capability checks below.
pub async fn resolve_role(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<Option<MembershipRole>, sqlx::Error> {
    Membership::get_role(pool, project_id, user_id).await
}

/// Checks if a user can view a project
///
/// Any membership row grants view access; the project owner can always view.
pub async fn can_view(pool: &PgPool, project: &Project, user_id: Uuid) -> Result<bool, sqlx::Error> {
    if project.owner_id == user_id {
        return Ok(true);
    }
    Membership::is_member(pool, project.id, user_id).await
}

/// Checks if a user can create and edit content in a project
///
/// Owner and editor roles grant edit access; the project owner can always
/// edit.
pub async fn can_edit(pool: &PgPool, project: &Project, user_id: Uuid) -> Result<bool, sqlx::Error> {
    if project.owner_id == user_id {
        return Ok(true);
    }
    let role = resolve_role(pool, project.id, user_id).await?;
    Ok(role.map(|r| r.can_edit_content()).unwrap_or(false))
}

/// Checks if a user can manage a project (members, lifecycle)
///
/// A pure owner-column check; no database access needed.
pub fn can_manage(project: &Project, user_id: Uuid) -> bool {
    project.owner_id == user_id
}

/// Requires view access, returning an error on denial
///
/// # Errors
///
/// Returns `AccessError::NotMember` if the user has neither a membership nor
/// ownership
pub async fn require_view(
    pool: &PgPool,
    project: &Project,
    user_id: Uuid,
) -> Result<(), AccessError> {
    if can_view(pool, project, user_id).await? {
        Ok(())
    } else {
        Err(AccessError::NotMember(project.id))
    }
}

/// Requires edit access, returning an error on denial
///
/// # Errors
///
/// Returns:
/// - `AccessError::CannotEdit` if the user is a viewer
/// - `AccessError::NotMember` if the user has no membership at all
pub async fn require_edit(
    pool: &PgPool,
    project: &Project,
    user_id: Uuid,
) -> Result<(), AccessError> {
    if project.owner_id == user_id {
        return Ok(());
    }

    match resolve_role(pool, project.id, user_id).await? {
        Some(role) if role.can_edit_content() => Ok(()),
        Some(role) => Err(AccessError::CannotEdit {
            project_id: project.id,
            actual: role,
        }),
        None => Err(AccessError::NotMember(project.id)),
    }
}

/// Requires manage access, returning an error on denial
///
/// # Errors
///
/// Returns `AccessError::NotOwner` if the user is not the project owner
pub fn require_manage(project: &Project, user_id: Uuid) -> Result<(), AccessError> {
    if can_manage(project, user_id) {
        Ok(())
    } else {
        Err(AccessError::NotOwner(project.id))
    }
}
