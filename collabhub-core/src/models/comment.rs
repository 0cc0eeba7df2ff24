/// Comment model and database operations
///
/// A comment is attached to exactly one target: either a project or a task.
/// The schema enforces the exclusivity with a CHECK constraint and the
/// operations layer rejects malformed targets before the insert.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID REFERENCES projects(id) ON DELETE CASCADE,
///     task_id UUID REFERENCES tasks(id) ON DELETE CASCADE,
///     author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     body TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CHECK ((project_id IS NULL) <> (task_id IS NULL))
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Comment on a project or a task
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    /// Unique comment ID
    pub id: Uuid,

    /// Project target (None when the comment is on a task)
    pub project_id: Option<Uuid>,

    /// Task target (None when the comment is on a project)
    pub task_id: Option<Uuid>,

    /// User who wrote the comment
    pub author_id: Uuid,

    /// Comment body; `@username` tokens in here become mention notifications
    pub body: String,

    /// When the comment was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new comment
///
/// Exactly one of `project_id` and `task_id` must be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComment {
    /// Project target
    pub project_id: Option<Uuid>,

    /// Task target
    pub task_id: Option<Uuid>,

    /// Comment body
    pub body: String,
}

impl Comment {
    /// Creates a new comment
    ///
    /// Runs inside the caller's transaction so the comment activity and any
    /// mention notifications commit atomically with the comment row.
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        author_id: Uuid,
        data: CreateComment,
    ) -> Result<Self, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (project_id, task_id, author_id, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id, project_id, task_id, author_id, body, created_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.task_id)
        .bind(author_id)
        .bind(data.body)
        .fetch_one(&mut **tx)
        .await?;

        Ok(comment)
    }

    /// Lists comments attached directly to a project, oldest first
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, project_id, task_id, author_id, body, created_at
            FROM comments
            WHERE project_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    /// Lists comments on a task, oldest first
    pub async fn list_by_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, project_id, task_id, author_id, body, created_at
            FROM comments
            WHERE task_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_comment_targets_deserialize() {
        let on_project: CreateComment = serde_json::from_str(
            r#"{"project_id": "7f8de4c8-0e39-4f68-9e5b-0a8f3f0b2a11", "body": "hi"}"#,
        )
        .unwrap();
        assert!(on_project.project_id.is_some());
        assert!(on_project.task_id.is_none());

        let on_task: CreateComment = serde_json::from_str(
            r#"{"task_id": "7f8de4c8-0e39-4f68-9e5b-0a8f3f0b2a11", "body": "hi"}"#,
        )
        .unwrap();
        assert!(on_task.project_id.is_none());
        assert!(on_task.task_id.is_some());
    }
}
