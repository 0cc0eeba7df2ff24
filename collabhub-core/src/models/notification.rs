/// Notification model and database operations
///
/// Notifications are the per-user inbox rows produced by the fanout engine.
/// The inbox is read with keyset pagination over `(created_at, id)` so a
/// page boundary stays stable while new notifications arrive.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE notifications (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     recipient_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     kind VARCHAR(20) NOT NULL,
///     message VARCHAR(255) NOT NULL,
///     related_project_id UUID REFERENCES projects(id) ON DELETE CASCADE,
///     related_task_id UUID REFERENCES tasks(id) ON DELETE CASCADE,
///     is_read BOOLEAN NOT NULL DEFAULT FALSE,
///     dedupe_key VARCHAR(64) UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// `dedupe_key` is set only for mention notifications. It is a content hash
/// over (recipient, kind, project, task, actor); inserting a duplicate is a
/// no-op via ON CONFLICT, which keeps repeated mentions from piling up.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Kinds of notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Recipient was added to a project
    MemberAdded,

    /// Recipient was assigned to a task
    TaskAssigned,

    /// Recipient was @mentioned in a comment
    Mention,
}

impl NotificationKind {
    /// Converts kind to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::MemberAdded => "member_added",
            NotificationKind::TaskAssigned => "task_assigned",
            NotificationKind::Mention => "mention",
        }
    }

    /// Parses kind from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "member_added" => Some(NotificationKind::MemberAdded),
            "task_assigned" => Some(NotificationKind::TaskAssigned),
            "mention" => Some(NotificationKind::Mention),
            _ => None,
        }
    }
}

/// Notification inbox row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    /// Unique notification ID
    pub id: Uuid,

    /// User this notification is for
    pub recipient_id: Uuid,

    /// Notification kind
    pub kind: String,

    /// Human-readable message
    pub message: String,

    /// Related project, if any
    pub related_project_id: Option<Uuid>,

    /// Related task, if any
    pub related_task_id: Option<Uuid>,

    /// Whether the recipient has read this notification
    pub is_read: bool,

    /// Content hash for mention deduplication (None for other kinds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedupe_key: Option<String>,

    /// When the notification was created
    pub created_at: DateTime<Utc>,
}

/// Input for inserting a notification
#[derive(Debug, Clone)]
pub struct CreateNotification {
    /// Recipient user ID
    pub recipient_id: Uuid,

    /// Notification kind
    pub kind: NotificationKind,

    /// Human-readable message
    pub message: String,

    /// Related project, if any
    pub related_project_id: Option<Uuid>,

    /// Related task, if any
    pub related_task_id: Option<Uuid>,

    /// Content hash for mention deduplication
    pub dedupe_key: Option<String>,
}

/// Opaque keyset cursor over `(created_at, id)`
///
/// Serialized as `"{created_at RFC3339}|{id}"`. Clients treat it as opaque
/// and pass it back verbatim to fetch the next page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationCursor {
    /// Creation time of the last row on the previous page
    pub created_at: DateTime<Utc>,

    /// ID of the last row on the previous page (tie-breaker)
    pub id: Uuid,
}

/// Error returned when a cursor string cannot be parsed
#[derive(Debug, Error)]
#[error("invalid notification cursor")]
pub struct CursorParseError;

impl fmt::Display for NotificationCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}",
            self.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            self.id
        )
    }
}

impl FromStr for NotificationCursor {
    type Err = CursorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ts, id) = s.split_once('|').ok_or(CursorParseError)?;
        let created_at = DateTime::parse_from_rfc3339(ts)
            .map_err(|_| CursorParseError)?
            .with_timezone(&Utc);
        let id = Uuid::parse_str(id).map_err(|_| CursorParseError)?;
        Ok(NotificationCursor { created_at, id })
    }
}

impl Notification {
    /// Inserts a notification
    ///
    /// # Returns
    ///
    /// The inserted notification, or None when `dedupe_key` collided with an
    /// existing row (the insert is silently skipped).
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        data: CreateNotification,
    ) -> Result<Option<Self>, sqlx::Error> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications
                (recipient_id, kind, message, related_project_id, related_task_id, dedupe_key)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (dedupe_key) DO NOTHING
            RETURNING id, recipient_id, kind, message, related_project_id, related_task_id,
                      is_read, dedupe_key, created_at
            "#,
        )
        .bind(data.recipient_id)
        .bind(data.kind.as_str())
        .bind(data.message)
        .bind(data.related_project_id)
        .bind(data.related_task_id)
        .bind(data.dedupe_key)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(notification)
    }

    /// Lists a recipient's notifications, newest first
    ///
    /// When a cursor is given, returns rows strictly before it in
    /// `(created_at, id)` order. The limit is applied after the cursor
    /// filter; callers build the next cursor from the last returned row.
    pub async fn list_for_recipient(
        pool: &PgPool,
        recipient_id: Uuid,
        cursor: Option<&NotificationCursor>,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let notifications = match cursor {
            Some(cursor) => {
                sqlx::query_as::<_, Notification>(
                    r#"
                    SELECT id, recipient_id, kind, message, related_project_id, related_task_id,
                           is_read, dedupe_key, created_at
                    FROM notifications
                    WHERE recipient_id = $1 AND (created_at, id) < ($2, $3)
                    ORDER BY created_at DESC, id DESC
                    LIMIT $4
                    "#,
                )
                .bind(recipient_id)
                .bind(cursor.created_at)
                .bind(cursor.id)
                .bind(limit)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Notification>(
                    r#"
                    SELECT id, recipient_id, kind, message, related_project_id, related_task_id,
                           is_read, dedupe_key, created_at
                    FROM notifications
                    WHERE recipient_id = $1
                    ORDER BY created_at DESC, id DESC
                    LIMIT $2
                    "#,
                )
                .bind(recipient_id)
                .bind(limit)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(notifications)
    }

    /// Counts a recipient's unread notifications
    pub async fn unread_count(pool: &PgPool, recipient_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND is_read = FALSE"
        )
        .bind(recipient_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Marks a notification as read
    ///
    /// Idempotent: marking an already-read notification succeeds and returns
    /// the row unchanged. Scoped to the recipient, so one user cannot mark
    /// another user's notifications.
    ///
    /// # Returns
    ///
    /// The notification if it exists and belongs to the recipient, None
    /// otherwise
    pub async fn mark_read(
        pool: &PgPool,
        recipient_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET is_read = TRUE
            WHERE id = $1 AND recipient_id = $2
            RETURNING id, recipient_id, kind, message, related_project_id, related_task_id,
                      is_read, dedupe_key, created_at
            "#,
        )
        .bind(id)
        .bind(recipient_id)
        .fetch_optional(pool)
        .await?;

        Ok(notification)
    }

    /// Builds the keyset cursor pointing at this row
    pub fn cursor(&self) -> NotificationCursor {
        NotificationCursor {
            created_at: self.created_at,
            id: self.id,
        }
    }

    /// Returns the in-app link target for this notification
    ///
    /// Task notifications link to the task page, project notifications to the
    /// project page, and anything else falls back to the inbox.
    pub fn link(&self) -> String {
        match (self.related_project_id, self.related_task_id) {
            (Some(project_id), Some(task_id)) => {
                format!("/projects/{}/tasks/{}/", project_id, task_id)
            }
            (Some(project_id), None) => format!("/projects/{}/", project_id),
            _ => "/notifications/".to_string(),
        }
    }
}
