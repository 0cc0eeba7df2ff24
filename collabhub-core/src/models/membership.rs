/// Membership model and database operations
///
/// This module provides the Membership model for user-project relationships.
/// It implements a many-to-many relationship between users and projects with
/// a per-project role that drives the capability checks in `access`.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE membership_role AS ENUM ('owner', 'editor', 'viewer');
///
/// CREATE TABLE memberships (
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role membership_role NOT NULL DEFAULT 'viewer',
///     added_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (project_id, user_id)
/// );
/// ```
///
/// # Roles
///
/// - **owner**: Edit content; the project owner additionally manages members
/// - **editor**: Create and edit tasks, comments, and files
/// - **viewer**: Read-only access
///
/// Managing members and the project lifecycle is tied to `projects.owner_id`,
/// not to the role column. The role only distinguishes edit from read access.
///
/// # Example
///
/// ```no_run
/// use collabhub_core::models::membership::{Membership, MembershipRole};
/// use collabhub_core::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let project_id = Uuid::new_v4();
/// let user_id = Uuid::new_v4();
///
/// // Check whether a user can see the project
/// let is_member = Membership::is_member(&pool, project_id, user_id).await?;
///
/// if let Some(role) = Membership::get_role(&pool, project_id, user_id).await? {
///     println!("role: {}", role.as_str());
/// }
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Per-project roles for memberships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "membership_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MembershipRole {
    /// Full content access; granted to the project owner on creation
    Owner,

    /// Can create and edit tasks, comments, and files
    Editor,

    /// Read-only access to project content
    Viewer,
}

impl MembershipRole {
    /// Converts role to its storage string
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipRole::Owner => "owner",
            MembershipRole::Editor => "editor",
            MembershipRole::Viewer => "viewer",
        }
    }

    /// Human-readable role name as it appears in notification messages
    pub fn display_name(&self) -> &'static str {
        match self {
            MembershipRole::Owner => "Owner",
            MembershipRole::Editor => "Editor",
            MembershipRole::Viewer => "Viewer",
        }
    }

    /// Can create and edit tasks, comments, and files
    pub fn can_edit_content(&self) -> bool {
        matches!(self, MembershipRole::Owner | MembershipRole::Editor)
    }
}

/// Membership model representing a user-project relationship with role
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    /// Project ID
    pub project_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role within the project
    pub role: MembershipRole,

    /// When the user was added to the project
    pub added_at: DateTime<Utc>,
}

/// Input for creating a new membership
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembership {
    /// Project ID
    pub project_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role to assign (defaults to Viewer)
    #[serde(default = "default_role")]
    pub role: MembershipRole,
}

fn default_role() -> MembershipRole {
    MembershipRole::Viewer
}

/// Membership joined with the member's username, for member listings
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProjectMember {
    /// User ID
    pub user_id: Uuid,

    /// Username of the member
    pub username: String,

    /// Role within the project
    pub role: MembershipRole,

    /// When the user was added to the project
    pub added_at: DateTime<Utc>,
}

impl Membership {
    /// Creates a new membership (adds user to project)
    ///
    /// Runs inside the caller's transaction so the member-added fanout
    /// commits atomically with the row.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Membership already exists (unique constraint violation)
    /// - Project or user doesn't exist (foreign key violation)
    /// - Database connection fails
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        data: CreateMembership,
    ) -> Result<Self, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO memberships (project_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING project_id, user_id, role, added_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.user_id)
        .bind(data.role)
        .fetch_one(&mut **tx)
        .await?;

        Ok(membership)
    }

    /// Finds a specific membership by project and user
    ///
    /// # Returns
    ///
    /// The membership if found, None otherwise
    pub async fn find(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT project_id, user_id, role, added_at
            FROM memberships
            WHERE project_id = $1 AND user_id = $2
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(membership)
    }

    /// Checks if a user is a member of a project (any role)
    pub async fn is_member(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM memberships
                WHERE project_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Gets a user's role in a project
    ///
    /// # Returns
    ///
    /// The user's role if they are a member, None otherwise
    pub async fn get_role(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<MembershipRole>, sqlx::Error> {
        let role: Option<MembershipRole> = sqlx::query_scalar(
            r#"
            SELECT role FROM memberships
            WHERE project_id = $1 AND user_id = $2
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(role)
    }

    /// Updates a user's role in a project
    ///
    /// # Returns
    ///
    /// The updated membership if found, None if the membership doesn't exist
    pub async fn update_role(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
        role: MembershipRole,
    ) -> Result<Option<Self>, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            UPDATE memberships
            SET role = $3
            WHERE project_id = $1 AND user_id = $2
            RETURNING project_id, user_id, role, added_at
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .bind(role)
        .fetch_optional(pool)
        .await?;

        Ok(membership)
    }

    /// Deletes a membership (removes user from project)
    ///
    /// # Returns
    ///
    /// True if the membership was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, project_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM memberships WHERE project_id = $1 AND user_id = $2"
        )
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all members of a project
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let memberships = sqlx::query_as::<_, Membership>(
            r#"
            SELECT project_id, user_id, role, added_at
            FROM memberships
            WHERE project_id = $1
            ORDER BY added_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(memberships)
    }

    /// Lists members of a project joined with their usernames
    ///
    /// Used by the member listing endpoint so clients don't need a second
    /// round trip to resolve user ids.
    pub async fn list_with_users(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<ProjectMember>, sqlx::Error> {
        let members = sqlx::query_as::<_, ProjectMember>(
            r#"
            SELECT m.user_id, u.username, m.role, m.added_at
            FROM memberships m
            INNER JOIN users u ON u.id = m.user_id
            WHERE m.project_id = $1
            ORDER BY m.added_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Returns the subset of `user_ids` that are NOT members of the project
    ///
    /// Assignee validation runs inside the assignment transaction, so this
    /// takes the transaction rather than the pool.
    pub async fn filter_non_members(
        tx: &mut Transaction<'_, Postgres>,
        project_id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let non_members: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT uid FROM UNNEST($2::uuid[]) AS t(uid)
            WHERE NOT EXISTS (
                SELECT 1 FROM memberships m
                WHERE m.project_id = $1 AND m.user_id = uid
            )
            "#,
        )
        .bind(project_id)
        .bind(user_ids)
        .fetch_all(&mut **tx)
        .await?;

        Ok(non_members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_role_as_str() {
        assert_eq!(MembershipRole::Owner.as_str(), "owner");
        assert_eq!(MembershipRole::Editor.as_str(), "editor");
        assert_eq!(MembershipRole::Viewer.as_str(), "viewer");
    }

    #[test]
    fn test_membership_role_display_name() {
        assert_eq!(MembershipRole::Owner.display_name(), "Owner");
        assert_eq!(MembershipRole::Editor.display_name(), "Editor");
        assert_eq!(MembershipRole::Viewer.display_name(), "Viewer");
    }

    #[test]
    fn test_role_edit_capability() {
        assert!(MembershipRole::Owner.can_edit_content());
        assert!(MembershipRole::Editor.can_edit_content());
        assert!(!MembershipRole::Viewer.can_edit_content());
    }

    #[test]
    fn test_create_membership_default_role() {
        assert_eq!(default_role(), MembershipRole::Viewer);
    }

    // Integration tests for database operations are in tests/ at the crate root
}
