/// File metadata model and database operations
///
/// CollabHub records metadata about uploaded files; the bytes themselves live
/// in external storage and are out of scope here. Like comments, a file is
/// attached to exactly one target: a project or a task.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE files (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID REFERENCES projects(id) ON DELETE CASCADE,
///     task_id UUID REFERENCES tasks(id) ON DELETE CASCADE,
///     uploaded_by UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     original_filename VARCHAR(255) NOT NULL,
///     size_bytes BIGINT NOT NULL,
///     uploaded_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CHECK ((project_id IS NULL) <> (task_id IS NULL))
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Metadata record for an uploaded file
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredFile {
    /// Unique file ID
    pub id: Uuid,

    /// Project target (None when the file is on a task)
    pub project_id: Option<Uuid>,

    /// Task target (None when the file is on a project)
    pub task_id: Option<Uuid>,

    /// User who uploaded the file
    pub uploaded_by: Uuid,

    /// Original filename as provided by the uploader
    pub original_filename: String,

    /// File size in bytes
    pub size_bytes: i64,

    /// When the file was uploaded
    pub uploaded_at: DateTime<Utc>,
}

/// Input for recording an uploaded file
///
/// Exactly one of `project_id` and `task_id` must be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStoredFile {
    /// Project target
    pub project_id: Option<Uuid>,

    /// Task target
    pub task_id: Option<Uuid>,

    /// Original filename
    pub original_filename: String,

    /// File size in bytes
    pub size_bytes: i64,
}

impl StoredFile {
    /// Records a new file
    ///
    /// Runs inside the caller's transaction so the upload activity commits
    /// atomically with the metadata row.
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        uploaded_by: Uuid,
        data: CreateStoredFile,
    ) -> Result<Self, sqlx::Error> {
        let file = sqlx::query_as::<_, StoredFile>(
            r#"
            INSERT INTO files (project_id, task_id, uploaded_by, original_filename, size_bytes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, project_id, task_id, uploaded_by, original_filename, size_bytes, uploaded_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.task_id)
        .bind(uploaded_by)
        .bind(data.original_filename)
        .bind(data.size_bytes)
        .fetch_one(&mut **tx)
        .await?;

        Ok(file)
    }

    /// Lists files attached directly to a project, newest first
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let files = sqlx::query_as::<_, StoredFile>(
            r#"
            SELECT id, project_id, task_id, uploaded_by, original_filename, size_bytes, uploaded_at
            FROM files
            WHERE project_id = $1
            ORDER BY uploaded_at DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(files)
    }

    /// Lists files attached to a task, newest first
    pub async fn list_by_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let files = sqlx::query_as::<_, StoredFile>(
            r#"
            SELECT id, project_id, task_id, uploaded_by, original_filename, size_bytes, uploaded_at
            FROM files
            WHERE task_id = $1
            ORDER BY uploaded_at DESC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(files)
    }
}

/// Extracts the lowercase extension from a filename
///
/// Returns None for filenames without an extension, including dotfiles like
/// `.gitignore` where the leading dot is part of the name.
pub fn file_extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
