/// Notification inbox operations
///
/// The inbox is identity-scoped: every operation acts on the actor's own
/// rows and no capability check is involved. A notification belonging to
/// another user is indistinguishable from a missing one.

use sqlx::PgPool;
use uuid::Uuid;

use crate::access::middleware::Actor;
use crate::error::{CoreError, CoreResult};
use crate::models::notification::{Notification, NotificationCursor};

/// Lists the actor's notifications, newest first
///
/// Returns the page and, when the page is full, an opaque cursor for the
/// next one. A malformed cursor is a validation error.
pub async fn list_notifications(
    pool: &PgPool,
    actor: &Actor,
    cursor: Option<&str>,
    limit: i64,
) -> CoreResult<(Vec<Notification>, Option<String>)> {
    let cursor = match cursor {
        Some(raw) => Some(
            raw.parse::<NotificationCursor>()
                .map_err(|_| CoreError::Validation("Invalid pagination cursor".to_string()))?,
        ),
        None => None,
    };

    let items = Notification::list_for_recipient(pool, actor.id, cursor.as_ref(), limit).await?;

    let next_cursor = if items.len() as i64 == limit {
        items.last().map(|n| n.cursor().to_string())
    } else {
        None
    };

    Ok((items, next_cursor))
}

/// Counts the actor's unread notifications
pub async fn unread_count(pool: &PgPool, actor: &Actor) -> CoreResult<i64> {
    let count = Notification::unread_count(pool, actor.id).await?;
    Ok(count)
}

/// Marks one of the actor's notifications as read
///
/// Idempotent. Returns the notification together with its redirect target
/// so clients can navigate to what the notification is about. A foreign or
/// missing notification is NotFound either way.
pub async fn mark_read(
    pool: &PgPool,
    actor: &Actor,
    notification_id: Uuid,
) -> CoreResult<(Notification, String)> {
    let notification = Notification::mark_read(pool, actor.id, notification_id)
        .await?
        .ok_or(CoreError::NotFound("Notification"))?;

    let redirect = notification.link();

    Ok((notification, redirect))
}
