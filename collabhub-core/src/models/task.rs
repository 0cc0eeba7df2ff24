/// Task model and database operations
///
/// Tasks live inside a project and carry a status, a priority, and a set of
/// assignees. The assignee set is a separate join table so additions can be
/// detected precisely (only newly inserted rows trigger assignment
/// notifications).
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('todo', 'in_progress', 'done');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     title VARCHAR(200) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     status task_status NOT NULL DEFAULT 'todo',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     due_date DATE,
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE task_assignees (
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     assigned_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (task_id, user_id)
/// );
/// ```
///
/// Assignees must be members of the task's project, and the set is capped
/// (default 5, configurable). Both rules are enforced by the operations
/// layer inside the assignment transaction.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Task workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// Being worked on
    InProgress,

    /// Finished
    Done,
}

impl TaskStatus {
    /// Converts status to its storage string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    /// Converts priority to its storage string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Project this task belongs to
    pub project_id: Uuid,

    /// Task title (appears in activity and notification messages)
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Current workflow status
    pub status: TaskStatus,

    /// Priority
    pub priority: TaskPriority,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// User who created the task (nullable if user deleted)
    pub created_by: Option<Uuid>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Task title
    pub title: String,

    /// Optional description (defaults to empty)
    #[serde(default)]
    pub description: String,

    /// Initial status (defaults to todo)
    #[serde(default = "default_status")]
    pub status: TaskStatus,

    /// Priority (defaults to medium)
    #[serde(default = "default_priority")]
    pub priority: TaskPriority,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// Initial assignees (user ids, must be project members)
    #[serde(default)]
    pub assignees: Vec<Uuid>,
}

fn default_status() -> TaskStatus {
    TaskStatus::Todo
}

fn default_priority() -> TaskPriority {
    TaskPriority::Medium
}

/// Input for updating a task
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New priority
    pub priority: Option<TaskPriority>,

    /// New due date (use Some(None) to clear)
    pub due_date: Option<Option<NaiveDate>>,
}

impl Task {
    /// Creates a new task in a project
    ///
    /// Assignees from `data` are NOT inserted here; `add_assignees` handles
    /// the join table inside the same transaction so additions can be
    /// validated and notified.
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        project_id: Uuid,
        created_by: Option<Uuid>,
        data: CreateTask,
    ) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (project_id, title, description, status, priority, due_date, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, project_id, title, description, status, priority, due_date,
                      created_by, created_at, updated_at
            "#,
        )
        .bind(project_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.due_date)
        .bind(created_by)
        .fetch_one(&mut **tx)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, title, description, status, priority, due_date,
                   created_by, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Updates a task's fields
    ///
    /// Only non-None fields in `data` will be updated. The `updated_at`
    /// timestamp is automatically set to the current time.
    ///
    /// # Returns
    ///
    /// The updated task if found, None if the task doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, project_id, title, description, status, priority, \
             due_date, created_by, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Lists tasks in a project, newest first
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, title, description, status, priority, due_date,
                   created_by, created_at, updated_at
            FROM tasks
            WHERE project_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists tasks in a project filtered by status
    pub async fn list_by_status(
        pool: &PgPool,
        project_id: Uuid,
        status: TaskStatus,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, title, description, status, priority, due_date,
                   created_by, created_at, updated_at
            FROM tasks
            WHERE project_id = $1 AND status = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(project_id)
        .bind(status)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Adds users to the task's assignee set
    ///
    /// Set semantics: already-assigned users are skipped via ON CONFLICT, and
    /// only the newly inserted user ids are returned. Callers fan out
    /// assignment notifications for exactly those ids.
    pub async fn add_assignees(
        tx: &mut Transaction<'_, Postgres>,
        task_id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let added: Vec<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO task_assignees (task_id, user_id)
            SELECT DISTINCT $1, uid FROM UNNEST($2::uuid[]) AS t(uid)
            ON CONFLICT (task_id, user_id) DO NOTHING
            RETURNING user_id
            "#,
        )
        .bind(task_id)
        .bind(user_ids)
        .fetch_all(&mut **tx)
        .await?;

        Ok(added)
    }

    /// Removes a user from the task's assignee set
    ///
    /// # Returns
    ///
    /// True if the user was assigned, false if they weren't
    pub async fn remove_assignee(
        pool: &PgPool,
        task_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM task_assignees WHERE task_id = $1 AND user_id = $2"
        )
        .bind(task_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists the task's assignee user ids
    pub async fn list_assignees(pool: &PgPool, task_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let assignees: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT user_id FROM task_assignees
            WHERE task_id = $1
            ORDER BY assigned_at ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(assignees)
    }

    /// Counts the task's assignees inside the assignment transaction
    ///
    /// The cap on assignees is checked against this count after insertion;
    /// a violation rolls the whole transaction back.
    pub async fn count_assignees(
        tx: &mut Transaction<'_, Postgres>,
        task_id: Uuid,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM task_assignees WHERE task_id = $1"
        )
        .bind(task_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(count)
    }
}
