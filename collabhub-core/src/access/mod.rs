/// Access control for CollabHub
///
/// This module decides who can do what inside a project:
///
/// # Modules
///
/// - [`resolver`]: Role resolution and the view/edit/manage capability checks
/// - [`middleware`]: Axum middleware that turns the trusted `X-User-Id`
///   header into an [`middleware::Actor`] request extension
///
/// # Capability Model
///
/// - **view**: any membership row, or being the project owner
/// - **edit**: an owner or editor role, or being the project owner
/// - **manage**: being the project owner, full stop
///
/// Ownership is the `projects.owner_id` column, not the `owner` role value;
/// manage rights never derive from the role column alone.
///
/// # Example
///
/// ```no_run
/// use collabhub_core::access::resolver::require_edit;
/// use collabhub_core::models::project::Project;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project: Project, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// require_edit(&pool, &project, user_id).await?;
/// # Ok(())
/// # }
/// ```

pub mod middleware;
pub mod resolver;
