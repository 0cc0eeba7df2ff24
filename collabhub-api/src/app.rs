/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use collabhub_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = collabhub_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use collabhub_core::access::middleware::{actor_middleware, USER_ID_HEADER};
use collabhub_core::ops::Limits;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the operation limits configured for this deployment
    pub fn limits(&self) -> Limits {
        self.config.limits.to_limits()
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// The router is organized as follows:
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// └── /api/v1/                       # API v1 (versioned)
///     ├── /users/                    # User directory (public)
///     ├── /projects/                 # Projects, members, nested reads
///     ├── /tasks/                    # Tasks and assignees
///     ├── /comments/                 # Comment creation
///     ├── /files/                    # File metadata records
///     └── /notifications/            # The actor's inbox
/// ```
///
/// Everything under `/api/v1` except the user directory requires an
/// identified actor: the trusted `X-User-Id` header must name an existing
/// user. The directory stays open because user rows have to exist before
/// the header can resolve to anyone.
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Actor identification (gated route groups)
pub fn build_router(state: AppState) -> Router {
    // Import route handlers
    use crate::routes;

    // Health check (public, no actor)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // User directory (public)
    let user_routes = Router::new()
        .route(
            "/",
            post(routes::users::create_user).get(routes::users::list_users),
        )
        .route("/:user_id", get(routes::users::get_user));

    // Project routes; nested resources hang off the project id
    let project_routes = Router::new()
        .route(
            "/",
            post(routes::projects::create_project).get(routes::projects::list_projects),
        )
        .route("/:project_id", get(routes::projects::get_project))
        .route("/:project_id/complete", post(routes::projects::complete_project))
        .route("/:project_id/reopen", post(routes::projects::reopen_project))
        .route("/:project_id/activity", get(routes::projects::list_activity))
        .route(
            "/:project_id/members",
            post(routes::members::add_member).get(routes::members::list_members),
        )
        .route(
            "/:project_id/members/:user_id",
            patch(routes::members::change_member_role).delete(routes::members::remove_member),
        )
        .route(
            "/:project_id/tasks",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks),
        )
        .route("/:project_id/comments", get(routes::comments::list_project_comments))
        .route("/:project_id/files", get(routes::files::list_project_files));

    // Task routes addressed by task id
    let task_routes = Router::new()
        .route(
            "/:task_id",
            get(routes::tasks::get_task).patch(routes::tasks::update_task),
        )
        .route("/:task_id/assignees", post(routes::tasks::add_assignees))
        .route(
            "/:task_id/assignees/:user_id",
            delete(routes::tasks::remove_assignee),
        )
        .route("/:task_id/comments", get(routes::comments::list_task_comments))
        .route("/:task_id/files", get(routes::files::list_task_files));

    // Comment and file creation take their target in the body
    let comment_routes = Router::new().route("/", post(routes::comments::create_comment));
    let file_routes = Router::new().route("/", post(routes::files::record_file));

    // Notification inbox (identity-scoped)
    let notification_routes = Router::new()
        .route("/", get(routes::notifications::list_notifications))
        .route("/unread_count", get(routes::notifications::unread_count))
        .route("/:notification_id/read", post(routes::notifications::mark_read));

    // The actor gate applies to the groups nested before it; the user
    // directory is nested after and stays open
    let v1_routes = Router::new()
        .nest("/projects", project_routes)
        .nest("/tasks", task_routes)
        .nest("/comments", comment_routes)
        .nest("/files", file_routes)
        .nest("/notifications", notification_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            actor_layer,
        ))
        .nest("/users", user_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::CONTENT_TYPE,
                HeaderName::from_static(USER_ID_HEADER),
            ])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/api/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Actor identification middleware layer
///
/// Resolves the trusted `X-User-Id` header through the core middleware and
/// re-renders failures as JSON error envelopes. Handlers behind this layer
/// extract the actor with `Extension<Actor>`.
async fn actor_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    actor_middleware(state.db.clone(), req, next)
        .await
        .map_err(ApiError::from)
}
