/// File metadata operations
///
/// Only metadata is recorded; file content storage lives elsewhere. The
/// declared size is capped and the filename extension allow-listed before
/// anything is written. Uploading requires view access on the resolved
/// project, same as commenting.

use sqlx::PgPool;
use uuid::Uuid;

use crate::access::middleware::Actor;
use crate::access::resolver;
use crate::error::{CoreError, CoreResult};
use crate::fanout::{engine, DomainEvent};
use crate::models::project::Project;
use crate::models::stored_file::{CreateStoredFile, StoredFile};
use crate::models::task::Task;

use super::Limits;

/// File extensions accepted for upload
const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "xls", "xlsx", "png", "jpg", "jpeg"];

/// Records an uploaded file's metadata
///
/// The target must be exactly one of project/task. Validation failures
/// reject the upload before any row is written.
pub async fn record_file(
    pool: &PgPool,
    actor: &Actor,
    data: CreateStoredFile,
    limits: Limits,
) -> CoreResult<StoredFile> {
    let project = super::resolve_target(pool, data.project_id, data.task_id).await?;

    resolver::require_view(pool, &project, actor.id).await?;

    if data.size_bytes <= 0 {
        return Err(CoreError::Validation(
            "File size must be positive".to_string(),
        ));
    }
    if data.size_bytes > limits.max_file_size_bytes {
        return Err(CoreError::Validation(format!(
            "File size exceeds the maximum of {} bytes",
            limits.max_file_size_bytes
        )));
    }

    match file_extension(&data.original_filename) {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => {}
        Some(ext) => {
            return Err(CoreError::Validation(format!(
                "File extension .{} is not allowed",
                ext
            )))
        }
        None => {
            return Err(CoreError::Validation(
                "Filename has no extension".to_string(),
            ))
        }
    }

    let mut tx = pool.begin().await?;

    let file = StoredFile::create(&mut tx, actor.id, data).await?;

    engine::dispatch(
        &mut tx,
        &DomainEvent::FileUploaded {
            project,
            file: file.clone(),
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(file_id = %file.id, uploaded_by = %actor.id, "Recorded file upload");

    Ok(file)
}

/// Lists files attached directly to a project, newest first
pub async fn list_project_files(
    pool: &PgPool,
    actor: &Actor,
    project_id: Uuid,
) -> CoreResult<Vec<StoredFile>> {
    let project = Project::find_by_id(pool, project_id)
        .await?
        .ok_or(CoreError::NotFound("Project"))?;

    resolver::require_view(pool, &project, actor.id).await?;

    let files = StoredFile::list_by_project(pool, project_id).await?;
    Ok(files)
}

/// Lists files attached to a task, newest first
pub async fn list_task_files(
    pool: &PgPool,
    actor: &Actor,
    task_id: Uuid,
) -> CoreResult<Vec<StoredFile>> {
    let task = Task::find_by_id(pool, task_id)
        .await?
        .ok_or(CoreError::NotFound("Task"))?;
    let project = Project::find_by_id(pool, task.project_id)
        .await?
        .ok_or(CoreError::NotFound("Project"))?;

    resolver::require_view(pool, &project, actor.id).await?;

    let files = StoredFile::list_by_task(pool, task_id).await?;
    Ok(files)
}

/// Extracts the lowercased extension, None for extensionless names
///
/// Dotfiles like `.gitignore` count as having no extension.
fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .filter(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
        .map(|(_, ext)| ext.to_ascii_lowercase())
}
