/// Actor identification middleware for Axum
///
/// CollabHub sits behind a gateway that authenticates requests and forwards
/// the caller's identity in the `X-User-Id` header. This middleware parses
/// that header, verifies the user exists, and adds an [`Actor`] to request
/// extensions for handlers to extract.
///
/// There is no credential validation here; the header is trusted. Anything
/// stronger belongs in the gateway.
///
/// # Example
///
/// ```no_run
/// use axum::extract::Request;
/// use axum::middleware::{self, Next};
/// use axum::{routing::get, Extension, Router};
/// use collabhub_core::access::middleware::{actor_middleware, Actor};
/// use sqlx::PgPool;
///
/// async fn handler(Extension(actor): Extension<Actor>) -> String {
///     format!("Hello, {}!", actor.username)
/// }
///
/// fn router(pool: PgPool) -> Router {
///     Router::new().route("/projects", get(handler)).layer(
///         middleware::from_fn(move |req: Request, next: Next| {
///             let pool = pool.clone();
///             async move { actor_middleware(pool, req, next).await }
///         }),
///     )
/// }
/// ```

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::User;

/// Header carrying the authenticated user's id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated actor added to request extensions
///
/// Handlers extract it with Axum's `Extension` extractor. The username is
/// resolved once here so fanout messages don't re-fetch it per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    /// Authenticated user ID
    pub id: Uuid,

    /// Username, used in activity and mention messages
    pub username: String,
}

impl Actor {
    /// Builds an actor from a user row
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// Error type for actor identification
#[derive(Debug)]
pub enum ActorError {
    /// X-User-Id header is absent
    MissingHeader,

    /// X-User-Id header is not a valid UUID
    InvalidUserId(String),

    /// No user exists with the given id
    UnknownUser(Uuid),

    /// Database error
    DatabaseError(String),
}

impl IntoResponse for ActorError {
    fn into_response(self) -> Response {
        match self {
            ActorError::MissingHeader => {
                (StatusCode::UNAUTHORIZED, "Missing X-User-Id header").into_response()
            }
            ActorError::InvalidUserId(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ActorError::UnknownUser(_) => {
                (StatusCode::UNAUTHORIZED, "Unknown user").into_response()
            }
            ActorError::DatabaseError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Actor identification middleware
///
/// Reads `X-User-Id`, resolves the user, and adds an [`Actor`] extension.
///
/// # Errors
///
/// - 401 Unauthorized if the header is missing or no such user exists
/// - 400 Bad Request if the header is not a UUID
/// - 500 if the user lookup fails
pub async fn actor_middleware(
    pool: PgPool,
    mut req: Request,
    next: Next,
) -> Result<Response, ActorError> {
    let header = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ActorError::MissingHeader)?;

    let user_id = Uuid::parse_str(header)
        .map_err(|_| ActorError::InvalidUserId(format!("Invalid user id: {}", header)))?;

    let user = User::find_by_id(&pool, user_id)
        .await
        .map_err(|e| ActorError::DatabaseError(format!("Database error: {}", e)))?
        .ok_or(ActorError::UnknownUser(user_id))?;

    req.extensions_mut().insert(Actor::from_user(&user));

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_actor_from_user() {
        let user = User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            display_name: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let actor = Actor::from_user(&user);
        assert_eq!(actor.id, user.id);
        assert_eq!(actor.username, "alice");
    }

    #[test]
    fn test_actor_error_into_response() {
        let err = ActorError::MissingHeader;
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let err = ActorError::InvalidUserId("nope".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let err = ActorError::UnknownUser(Uuid::new_v4());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let err = ActorError::DatabaseError("boom".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
