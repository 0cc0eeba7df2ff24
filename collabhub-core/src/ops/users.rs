/// User directory operations
///
/// A minimal directory standing in for an external account system. The
/// username is the mention handle, so it is held to the same `\w+` grammar
/// the mention parser matches; anything else could never be mentioned.

use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::models::user::{CreateUser, User};

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w+$").expect("valid username regex"));

/// Creates a user
///
/// Uniqueness of username and email is enforced by the database; a
/// violation surfaces as a conflict at the API layer.
pub async fn create_user(pool: &PgPool, data: CreateUser) -> CoreResult<User> {
    if !USERNAME_RE.is_match(&data.username) {
        return Err(CoreError::Validation(
            "Username may contain only letters, digits and underscores".to_string(),
        ));
    }
    if data.username.len() > 150 {
        return Err(CoreError::Validation("Username is too long".to_string()));
    }

    let user = User::create(pool, data).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "Created user");

    Ok(user)
}

/// Fetches a user by id
pub async fn get_user(pool: &PgPool, user_id: Uuid) -> CoreResult<User> {
    User::find_by_id(pool, user_id)
        .await?
        .ok_or(CoreError::NotFound("User"))
}

/// Lists users with the total directory size
pub async fn list_users(pool: &PgPool, limit: i64, offset: i64) -> CoreResult<(Vec<User>, i64)> {
    let users = User::list(pool, limit, offset).await?;
    let total = User::count(pool).await?;
    Ok((users, total))
}
