/// Event fanout engine
///
/// Translates one [`DomainEvent`] into the activity and notification rows it
/// implies. `dispatch` runs inside the emitting operation's transaction, so
/// the feed and the inbox commit or roll back together with the mutation
/// they describe.
///
/// # Suppression rules
///
/// Self-caused events produce no notification:
/// - adding the project owner as a member writes neither activity nor
///   notification (the owner's membership row is bookkeeping, not news)
/// - assigning the task's creator skips that creator's notification
/// - a comment author mentioning themselves is ignored
///
/// Mentions of unknown usernames and of non-members are dropped silently.
///
/// # Mention idempotence
///
/// Each mention notification carries a deterministic `dedupe_key` hashed
/// over (recipient, kind, project, task, actor). The key is unique in the
/// notifications table and the insert uses ON CONFLICT DO NOTHING, so the
/// same actor mentioning the same user on the same target again is a no-op
/// even under concurrent comment creation.

use sha2::{Digest, Sha256};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::access::middleware::Actor;
use crate::mentions::extract_mentions;
use crate::models::activity::{Activity, ActivityKind, CreateActivity};
use crate::models::comment::Comment;
use crate::models::notification::{CreateNotification, Notification, NotificationKind};
use crate::models::project::Project;

use super::event::DomainEvent;

/// Applies an event's fanout inside the emitting transaction
///
/// # Errors
///
/// Returns `sqlx::Error` if any row write fails; the caller's transaction
/// should then roll back, discarding the triggering mutation as well.
pub async fn dispatch(
    tx: &mut Transaction<'_, Postgres>,
    event: &DomainEvent,
) -> Result<(), sqlx::Error> {
    tracing::debug!(event = event.name(), "Dispatching fanout");

    match event {
        DomainEvent::ProjectCreated { project } => {
            Activity::create(
                tx,
                CreateActivity {
                    project_id: project.id,
                    actor_id: project.owner_id,
                    kind: ActivityKind::ProjectCreated,
                    description: format!("created project \"{}\"", project.name),
                },
            )
            .await?;
        }

        DomainEvent::ProjectCompleted { project } => {
            Activity::create(
                tx,
                CreateActivity {
                    project_id: project.id,
                    actor_id: project.owner_id,
                    kind: ActivityKind::ProjectCompleted,
                    description: "marked the project as completed".to_string(),
                },
            )
            .await?;
        }

        DomainEvent::ProjectReopened { project } => {
            Activity::create(
                tx,
                CreateActivity {
                    project_id: project.id,
                    actor_id: project.owner_id,
                    kind: ActivityKind::ProjectReopened,
                    description: "reopened the project".to_string(),
                },
            )
            .await?;
        }

        DomainEvent::MemberAdded {
            project,
            membership,
        } => {
            if membership.user_id != project.owner_id {
                let role = membership.role.display_name();

                Notification::create(
                    tx,
                    CreateNotification {
                        recipient_id: membership.user_id,
                        kind: NotificationKind::MemberAdded,
                        message: format!(
                            "You were added to project \"{}\" as {}",
                            project.name, role
                        ),
                        related_project_id: Some(project.id),
                        related_task_id: None,
                        dedupe_key: None,
                    },
                )
                .await?;

                // The feed records the added user, not the owner who added them
                Activity::create(
                    tx,
                    CreateActivity {
                        project_id: project.id,
                        actor_id: membership.user_id,
                        kind: ActivityKind::MemberAdded,
                        description: format!("was added to the project as {}", role),
                    },
                )
                .await?;
            }
        }

        DomainEvent::TaskCreated { project, task } => {
            Activity::create(
                tx,
                CreateActivity {
                    project_id: project.id,
                    actor_id: task.created_by.unwrap_or(project.owner_id),
                    kind: ActivityKind::TaskCreated,
                    description: format!("created task \"{}\"", task.title),
                },
            )
            .await?;
        }

        DomainEvent::AssigneesAdded {
            project,
            task,
            user_ids,
        } => {
            for &user_id in user_ids {
                if task.created_by == Some(user_id) {
                    continue;
                }

                Notification::create(
                    tx,
                    CreateNotification {
                        recipient_id: user_id,
                        kind: NotificationKind::TaskAssigned,
                        message: format!("You were assigned to task \"{}\"", task.title),
                        related_project_id: Some(project.id),
                        related_task_id: Some(task.id),
                        dedupe_key: None,
                    },
                )
                .await?;
            }
        }

        DomainEvent::CommentAdded {
            project,
            comment,
            author,
        } => {
            let target = if comment.task_id.is_some() {
                "task"
            } else {
                "project"
            };

            Activity::create(
                tx,
                CreateActivity {
                    project_id: project.id,
                    actor_id: author.id,
                    kind: ActivityKind::CommentAdded,
                    description: format!("commented on {}", target),
                },
            )
            .await?;

            fan_out_mentions(tx, project, comment, author).await?;
        }

        DomainEvent::FileUploaded { project, file } => {
            Activity::create(
                tx,
                CreateActivity {
                    project_id: project.id,
                    actor_id: file.uploaded_by,
                    kind: ActivityKind::FileUploaded,
                    description: format!("uploaded file \"{}\"", file.original_filename),
                },
            )
            .await?;
        }
    }

    Ok(())
}

/// Turns the @mentions in a comment into notifications
///
/// Each distinct mentioned username yields at most one notification.
/// Candidates are dropped when the username doesn't resolve, the user is the
/// comment author, or the user can't view the project.
async fn fan_out_mentions(
    tx: &mut Transaction<'_, Postgres>,
    project: &Project,
    comment: &Comment,
    author: &Actor,
) -> Result<(), sqlx::Error> {
    for username in extract_mentions(&comment.body) {
        let Some(user_id) = find_user_id(tx, &username).await? else {
            tracing::debug!(username = %username, "Mentioned user does not exist, skipping");
            continue;
        };

        if user_id == author.id {
            continue;
        }

        if user_id != project.owner_id && !is_member(tx, project.id, user_id).await? {
            tracing::debug!(
                username = %username,
                project_id = %project.id,
                "Mentioned user is not a project member, skipping"
            );
            continue;
        }

        let created = Notification::create(
            tx,
            CreateNotification {
                recipient_id: user_id,
                kind: NotificationKind::Mention,
                message: format!("{} mentioned you in a comment", author.username),
                related_project_id: Some(project.id),
                related_task_id: comment.task_id,
                dedupe_key: Some(mention_dedupe_key(
                    user_id,
                    project.id,
                    comment.task_id,
                    author.id,
                )),
            },
        )
        .await?;

        if created.is_none() {
            tracing::debug!(
                username = %username,
                project_id = %project.id,
                "Mention notification already exists, skipping"
            );
        }
    }

    Ok(())
}

/// Computes the idempotency key for a mention notification
///
/// SHA-256 over (recipient, kind, project, task, actor). Deterministic, so
/// re-mentioning the same user on the same target by the same actor always
/// produces the same key and collides with the earlier row.
fn mention_dedupe_key(
    recipient_id: Uuid,
    project_id: Uuid,
    task_id: Option<Uuid>,
    actor_id: Uuid,
) -> String {
    let mut hasher = Sha256::new();

    hasher.update(recipient_id.as_bytes());
    hasher.update(NotificationKind::Mention.as_str().as_bytes());
    hasher.update(project_id.as_bytes());

    // Components are fixed-width, so an absent task can't be confused
    // with any other input
    if let Some(task_id) = task_id {
        hasher.update(task_id.as_bytes());
    }

    hasher.update(actor_id.as_bytes());

    hex::encode(hasher.finalize())
}

/// Resolves a username to a user ID inside the transaction
async fn find_user_id(
    tx: &mut Transaction<'_, Postgres>,
    username: &str,
) -> Result<Option<Uuid>, sqlx::Error> {
    let row: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(row.map(|(id,)| id))
}

/// Checks project membership inside the transaction
async fn is_member(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let (exists,): (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM memberships WHERE project_id = $1 AND user_id = $2)",
    )
    .bind(project_id)
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(exists)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupe_key_is_deterministic() {
        let recipient = Uuid::new_v4();
        let project = Uuid::new_v4();
        let task = Uuid::new_v4();
        let actor = Uuid::new_v4();

        let a = mention_dedupe_key(recipient, project, Some(task), actor);
        let b = mention_dedupe_key(recipient, project, Some(task), actor);

        assert_eq!(a, b);
        assert_eq!(a.len(), 64); // SHA-256 as hex
    }

    #[test]
    fn test_dedupe_key_varies_by_component() {
        let recipient = Uuid::new_v4();
        let project = Uuid::new_v4();
        let task = Uuid::new_v4();
        let actor = Uuid::new_v4();

        let base = mention_dedupe_key(recipient, project, Some(task), actor);

        assert_ne!(
            base,
            mention_dedupe_key(Uuid::new_v4(), project, Some(task), actor)
        );
        assert_ne!(
            base,
            mention_dedupe_key(recipient, Uuid::new_v4(), Some(task), actor)
        );
        assert_ne!(base, mention_dedupe_key(recipient, project, None, actor));
        assert_ne!(
            base,
            mention_dedupe_key(recipient, project, Some(task), Uuid::new_v4())
        );
    }

    #[test]
    fn test_dedupe_key_distinguishes_project_and_task_comments() {
        let recipient = Uuid::new_v4();
        let project = Uuid::new_v4();
        let actor = Uuid::new_v4();

        let on_project = mention_dedupe_key(recipient, project, None, actor);
        let on_task = mention_dedupe_key(recipient, project, Some(Uuid::new_v4()), actor);

        assert_ne!(on_project, on_task);
    }
}
