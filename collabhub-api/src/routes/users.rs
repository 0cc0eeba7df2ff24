/// User directory endpoints
///
/// A minimal directory standing in for an external account system. These
/// routes sit outside the actor gate: user rows must exist before the
/// `X-User-Id` header can resolve to anyone.
///
/// # Endpoints
///
/// ```text
/// POST /api/v1/users             Create a user
/// GET  /api/v1/users             List users (paginated, with total)
/// GET  /api/v1/users/:user_id    Fetch a single user
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use collabhub_core::models::user::{CreateUser, User};
use collabhub_core::ops;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request body for creating a user
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Username; doubles as the mention handle
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters"))]
    pub username: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Optional display name
    pub display_name: Option<String>,
}

/// Query parameters for listing users
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    /// Page size (default 50, capped at 200)
    pub limit: Option<i64>,

    /// Rows to skip
    pub offset: Option<i64>,
}

/// Response for user listings
#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    /// One page of users
    pub users: Vec<User>,

    /// Total directory size
    pub total: i64,
}

/// Creates a user
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/users
/// ```
///
/// # Request
///
/// ```json
/// {
///   "username": "alice",
///   "email": "alice@example.com",
///   "display_name": "Alice"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: username violates the mention-handle grammar
/// - `409 Conflict`: username or email already taken
/// - `422 Unprocessable Entity`: empty or overlong username, invalid email
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<Json<User>> {
    req.validate()?;

    tracing::debug!(username = %req.username, "Creating user");

    let user = ops::users::create_user(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            display_name: req.display_name,
        },
    )
    .await?;

    Ok(Json(user))
}

/// Fetches a single user by id
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    let user = ops::users::get_user(&state.db, user_id).await?;
    Ok(Json(user))
}

/// Lists users with the total directory size
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<ListUsersResponse>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);

    let (users, total) = ops::users::list_users(&state.db, limit, offset).await?;

    Ok(Json(ListUsersResponse { users, total }))
}
