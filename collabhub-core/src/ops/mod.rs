/// Operations layer: permission-gated orchestration of domain mutations
///
/// Every function here takes the actor explicitly; there is no ambient
/// request state. Mutations follow one shape: fetch the target, gate on the
/// required capability, validate the input, open a transaction, write the
/// domain rows, dispatch fanout, commit. An error at any point drops the
/// transaction, so feed and inbox rows never outlive a failed mutation.
///
/// Read operations gate on view access (except identity-scoped ones like
/// the notification inbox) and run directly against the pool.

pub mod comments;
pub mod files;
pub mod members;
pub mod notifications;
pub mod projects;
pub mod tasks;
pub mod users;

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::models::project::Project;
use crate::models::task::Task;

/// Tunable limits enforced by the operations layer
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Maximum number of assignees per task
    pub max_task_assignees: i64,

    /// Maximum declared file size in bytes
    pub max_file_size_bytes: i64,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_task_assignees: 5,
            max_file_size_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Resolves a comment/file target to the project that gates it
///
/// Exactly one of `project_id` / `task_id` must be set; a task target
/// resolves through the task's project.
async fn resolve_target(
    pool: &PgPool,
    project_id: Option<Uuid>,
    task_id: Option<Uuid>,
) -> CoreResult<Project> {
    match (project_id, task_id) {
        (Some(project_id), None) => Project::find_by_id(pool, project_id)
            .await?
            .ok_or(CoreError::NotFound("Project")),
        (None, Some(task_id)) => {
            let task = Task::find_by_id(pool, task_id)
                .await?
                .ok_or(CoreError::NotFound("Task"))?;
            Project::find_by_id(pool, task.project_id)
                .await?
                .ok_or(CoreError::NotFound("Project"))
        }
        _ => Err(CoreError::InvalidState(
            "Exactly one of project_id and task_id must be set".to_string(),
        )),
    }
}
