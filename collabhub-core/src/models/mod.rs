/// Database models for CollabHub
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User directory entries that mentions and memberships refer to
/// - `project`: Collaboration projects with an owner and lifecycle status
/// - `membership`: User-project relationships with roles
/// - `task`: Tasks within a project, including the assignee join table
/// - `comment`: Comments on a project or a task
/// - `stored_file`: Metadata for uploaded files
/// - `activity`: Per-project audit feed entries
/// - `notification`: Per-user inbox rows with keyset pagination
///
/// # Example
///
/// ```no_run
/// use collabhub_core::models::user::{User, CreateUser};
/// use collabhub_core::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     username: "alice".to_string(),
///     email: "alice@example.com".to_string(),
///     display_name: None,
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod activity;
pub mod comment;
pub mod membership;
pub mod notification;
pub mod project;
pub mod stored_file;
pub mod task;
pub mod user;
