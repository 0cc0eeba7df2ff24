/// Project model and database operations
///
/// Projects are the collaboration boundary: memberships, tasks, comments,
/// files, and the activity feed all hang off a project. Creation and the
/// status transitions run inside the caller's transaction so their fanout
/// effects commit atomically with the row change.
///
/// # Lifecycle
///
/// ```text
/// active ⇄ completed
/// ```
///
/// A completed project rejects new tasks until it is reopened.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_status AS ENUM ('active', 'completed');
///
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(200) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     status project_status NOT NULL DEFAULT 'active',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    /// Open for new tasks, comments, and files
    Active,

    /// Closed out by the owner; task creation is rejected
    Completed,
}

impl ProjectStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
        }
    }
}

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Project name (appears in activity and notification messages)
    pub name: String,

    /// Free-form description
    pub description: String,

    /// User who owns the project
    ///
    /// The owner is the only user who can manage members or change the
    /// project status, independent of any membership row.
    pub owner_id: Uuid,

    /// Current lifecycle status
    pub status: ProjectStatus,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    /// Project name
    pub name: String,

    /// Optional description (defaults to empty)
    #[serde(default)]
    pub description: String,
}

impl Project {
    /// Creates a new project owned by `owner_id`
    ///
    /// Runs inside the caller's transaction; the owner membership row and the
    /// creation activity are written in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Owner doesn't exist (foreign key violation)
    /// - Database connection fails
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        owner_id: Uuid,
        data: CreateProject,
    ) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description, owner_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, owner_id, status, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(owner_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    ///
    /// # Returns
    ///
    /// The project if found, None otherwise
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, owner_id, status, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Transitions the project to completed
    ///
    /// Only applies when the project is currently active; returns None when
    /// the row is missing or the status does not match.
    pub async fn mark_completed(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET status = 'completed',
                updated_at = NOW()
            WHERE id = $1 AND status = 'active'
            RETURNING id, name, description, owner_id, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(project)
    }

    /// Transitions the project back to active
    ///
    /// Only applies when the project is currently completed; returns None
    /// when the row is missing or the status does not match.
    pub async fn reopen(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET status = 'active',
                updated_at = NOW()
            WHERE id = $1 AND status = 'completed'
            RETURNING id, name, description, owner_id, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(project)
    }

    /// Lists the projects a user can see
    ///
    /// Visibility is membership OR ownership. The owner field grants
    /// visibility even when no membership row exists for the owner.
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT p.id, p.name, p.description, p.owner_id, p.status, p.created_at, p.updated_at
            FROM projects p
            WHERE p.owner_id = $1
               OR EXISTS (
                   SELECT 1 FROM memberships m
                   WHERE m.project_id = p.id AND m.user_id = $1
               )
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_status_as_str() {
        assert_eq!(ProjectStatus::Active.as_str(), "active");
        assert_eq!(ProjectStatus::Completed.as_str(), "completed");
    }

    #[test]
    fn test_create_project_default_description() {
        let data: CreateProject = serde_json::from_str(r#"{"name": "Website Redesign"}"#).unwrap();
        assert_eq!(data.name, "Website Redesign");
        assert_eq!(data.description, "");
    }
}
