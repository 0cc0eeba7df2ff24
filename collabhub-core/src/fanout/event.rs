/// Domain events that drive notification and activity fanout
///
/// Every mutation that has side effects beyond its own row emits exactly one
/// event, dispatched explicitly by the operations layer inside the mutation's
/// transaction. Events carry row snapshots so the engine doesn't re-fetch
/// what the operation already loaded.

use uuid::Uuid;

use crate::access::middleware::Actor;
use crate::models::comment::Comment;
use crate::models::membership::Membership;
use crate::models::project::Project;
use crate::models::stored_file::StoredFile;
use crate::models::task::Task;

/// A mutation the fanout engine reacts to
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// A project was created by its owner
    ProjectCreated { project: Project },

    /// The owner marked the project as completed
    ProjectCompleted { project: Project },

    /// The owner reopened a completed project
    ProjectReopened { project: Project },

    /// A user was added to a project
    MemberAdded {
        project: Project,
        membership: Membership,
    },

    /// A task was created in a project
    TaskCreated { project: Project, task: Task },

    /// Users were newly added to a task's assignee set
    ///
    /// `user_ids` holds only the ids actually inserted; re-assignments of
    /// existing assignees never appear here.
    AssigneesAdded {
        project: Project,
        task: Task,
        user_ids: Vec<Uuid>,
    },

    /// A comment was posted on a project or task
    CommentAdded {
        project: Project,
        comment: Comment,
        author: Actor,
    },

    /// A file was uploaded to a project or task
    FileUploaded { project: Project, file: StoredFile },
}

impl DomainEvent {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::ProjectCreated { .. } => "project_created",
            DomainEvent::ProjectCompleted { .. } => "project_completed",
            DomainEvent::ProjectReopened { .. } => "project_reopened",
            DomainEvent::MemberAdded { .. } => "member_added",
            DomainEvent::TaskCreated { .. } => "task_created",
            DomainEvent::AssigneesAdded { .. } => "assignees_added",
            DomainEvent::CommentAdded { .. } => "comment_added",
            DomainEvent::FileUploaded { .. } => "file_uploaded",
        }
    }
}
