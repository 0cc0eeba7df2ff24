/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `users`: User directory endpoints
/// - `projects`: Project creation, lifecycle and activity feed
/// - `members`: Project member management
/// - `tasks`: Tasks and their assignees
/// - `comments`: Comments on projects and tasks
/// - `files`: File metadata records
/// - `notifications`: The actor's notification inbox

pub mod comments;
pub mod files;
pub mod health;
pub mod members;
pub mod notifications;
pub mod projects;
pub mod tasks;
pub mod users;
