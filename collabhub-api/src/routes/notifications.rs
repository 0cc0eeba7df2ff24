/// Notification inbox endpoints
///
/// The inbox is identity-scoped: every route acts on the actor's own rows
/// and a foreign notification is indistinguishable from a missing one.
/// Listing uses keyset pagination behind an opaque cursor.
///
/// # Endpoints
///
/// ```text
/// GET  /api/v1/notifications                          List, newest first
/// GET  /api/v1/notifications/unread_count             Unread badge count
/// POST /api/v1/notifications/:notification_id/read    Mark as read
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use collabhub_core::access::middleware::Actor;
use collabhub_core::models::notification::Notification;
use collabhub_core::ops;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Query parameters for listing notifications
#[derive(Debug, Deserialize)]
pub struct InboxQuery {
    /// Opaque cursor from a previous page
    pub cursor: Option<String>,

    /// Page size (default 20, capped at 100)
    pub limit: Option<i64>,
}

/// One page of the inbox
#[derive(Debug, Serialize)]
pub struct InboxResponse {
    /// Notifications, newest first
    pub notifications: Vec<Notification>,

    /// Cursor for the next page; absent on the last page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Unread count response
#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    /// Number of unread notifications
    pub unread: i64,
}

/// Mark-read response
#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    /// The notification, now read
    pub notification: Notification,

    /// Path of what the notification is about, for client navigation
    pub link: String,
}

/// Lists the actor's notifications, newest first
///
/// # Endpoint
///
/// ```text
/// GET /api/v1/notifications?cursor=...&limit=20
/// ```
///
/// # Response
///
/// ```json
/// {
///   "notifications": [ ... ],
///   "next_cursor": "2026-01-01T00:00:00.000000Z|0d4f7a3e-..."
/// }
/// ```
///
/// The cursor is opaque; clients pass it back verbatim. A malformed
/// cursor is a `400`.
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<InboxQuery>,
) -> ApiResult<Json<InboxResponse>> {
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    let (notifications, next_cursor) =
        ops::notifications::list_notifications(&state.db, &actor, query.cursor.as_deref(), limit)
            .await?;

    Ok(Json(InboxResponse {
        notifications,
        next_cursor,
    }))
}

/// Counts the actor's unread notifications
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<UnreadCountResponse>> {
    let unread = ops::notifications::unread_count(&state.db, &actor).await?;

    Ok(Json(UnreadCountResponse { unread }))
}

/// Marks one of the actor's notifications as read
///
/// Idempotent; marking twice is not an error. The response carries the
/// link the notification points at so clients can navigate to it.
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(notification_id): Path<Uuid>,
) -> ApiResult<Json<MarkReadResponse>> {
    let (notification, link) =
        ops::notifications::mark_read(&state.db, &actor, notification_id).await?;

    Ok(Json(MarkReadResponse { notification, link }))
}
