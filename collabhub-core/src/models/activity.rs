/// Activity model and database operations
///
/// Activities form the per-project audit feed. Every mutation that fans out
/// appends exactly one activity row describing what happened, inside the same
/// transaction as the mutation itself.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE activities (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     actor_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     kind VARCHAR(32) NOT NULL,
///     description TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Kinds of activity feed entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// Project was created
    ProjectCreated,

    /// A user was added to the project
    MemberAdded,

    /// A task was created
    TaskCreated,

    /// A comment was posted on the project or one of its tasks
    CommentAdded,

    /// A file was uploaded
    FileUploaded,

    /// The owner marked the project as completed
    ProjectCompleted,

    /// The owner reopened the project
    ProjectReopened,
}

impl ActivityKind {
    /// Converts kind to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::ProjectCreated => "project_created",
            ActivityKind::MemberAdded => "member_added",
            ActivityKind::TaskCreated => "task_created",
            ActivityKind::CommentAdded => "comment_added",
            ActivityKind::FileUploaded => "file_uploaded",
            ActivityKind::ProjectCompleted => "project_completed",
            ActivityKind::ProjectReopened => "project_reopened",
        }
    }

    /// Parses kind from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "project_created" => Some(ActivityKind::ProjectCreated),
            "member_added" => Some(ActivityKind::MemberAdded),
            "task_created" => Some(ActivityKind::TaskCreated),
            "comment_added" => Some(ActivityKind::CommentAdded),
            "file_uploaded" => Some(ActivityKind::FileUploaded),
            "project_completed" => Some(ActivityKind::ProjectCompleted),
            "project_reopened" => Some(ActivityKind::ProjectReopened),
            _ => None,
        }
    }
}

/// Activity feed entry
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Activity {
    /// Unique activity ID
    pub id: Uuid,

    /// Project the activity belongs to
    pub project_id: Uuid,

    /// User the activity is about (not always the user who acted; adding a
    /// member records the added user as the actor)
    pub actor_id: Uuid,

    /// Activity kind
    pub kind: String,

    /// Human-readable description
    pub description: String,

    /// When the activity was recorded
    pub created_at: DateTime<Utc>,
}

/// Input for appending an activity entry
#[derive(Debug, Clone)]
pub struct CreateActivity {
    /// Project the activity belongs to
    pub project_id: Uuid,

    /// User the activity is about
    pub actor_id: Uuid,

    /// Activity kind
    pub kind: ActivityKind,

    /// Human-readable description
    pub description: String,
}

impl Activity {
    /// Appends an activity entry
    ///
    /// Runs inside the mutation's transaction; the feed never shows an
    /// activity for a mutation that rolled back.
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        data: CreateActivity,
    ) -> Result<Self, sqlx::Error> {
        let activity = sqlx::query_as::<_, Activity>(
            r#"
            INSERT INTO activities (project_id, actor_id, kind, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, project_id, actor_id, kind, description, created_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.actor_id)
        .bind(data.kind.as_str())
        .bind(data.description)
        .fetch_one(&mut **tx)
        .await?;

        Ok(activity)
    }

    /// Lists a project's activity feed, newest first
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let activities = sqlx::query_as::<_, Activity>(
            r#"
            SELECT id, project_id, actor_id, kind, description, created_at
            FROM activities
            WHERE project_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(project_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(activities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_kind_round_trip() {
        let kinds = [
            ActivityKind::ProjectCreated,
            ActivityKind::MemberAdded,
            ActivityKind::TaskCreated,
            ActivityKind::CommentAdded,
            ActivityKind::FileUploaded,
            ActivityKind::ProjectCompleted,
            ActivityKind::ProjectReopened,
        ];

        for kind in kinds {
            assert_eq!(ActivityKind::from_str(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_activity_kind_from_str_unknown() {
        assert_eq!(ActivityKind::from_str("task_deleted"), None);
        assert_eq!(ActivityKind::from_str(""), None);
    }
}
