/// Integration tests for the CollabHub API
///
/// These tests drive the router end-to-end against a real database:
/// - Actor identification via the X-User-Id header
/// - Project lifecycle and membership roles
/// - Task creation, updates, and assignee rules
/// - Comments, mentions, and the notification inbox
/// - File metadata validation

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{request, TestContext};
use serde_json::json;
use tower::Service as _;
use uuid::Uuid;

/// Test that the health endpoint reports a connected database
#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = request(&ctx, "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert!(body["version"].is_string());
}

/// Test that gated endpoints reject requests without an X-User-Id header
#[tokio::test]
async fn test_actor_header_required() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = request(&ctx, "GET", "/api/v1/projects", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
    assert_eq!(body["message"], "Missing X-User-Id header");
}

/// Test that an X-User-Id with no matching user row is rejected
#[tokio::test]
async fn test_unknown_actor_rejected() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) =
        request(&ctx, "GET", "/api/v1/projects", Some(Uuid::new_v4()), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
    assert_eq!(body["message"], "Unknown user");
}

/// Test that a malformed X-User-Id header is a 400, not a 401
#[tokio::test]
async fn test_malformed_actor_header_rejected() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/projects")
        .header("x-user-id", "not-a-uuid")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "bad_request");
}

/// Test creating and fetching users through the public directory
#[tokio::test]
async fn test_user_directory_flow() {
    let ctx = TestContext::new().await.unwrap();

    let username = format!("walt_{}", &Uuid::new_v4().simple().to_string()[..8]);
    let (status, body) = request(
        &ctx,
        "POST",
        "/api/v1/users",
        None,
        Some(json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "display_name": "Walt"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], username);
    let user_id = body["id"].as_str().unwrap().to_string();

    // Lookup works without a header; the directory is the bootstrap surface
    let (status, body) = request(
        &ctx,
        "GET",
        &format!("/api/v1/users/{}", user_id),
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], username);

    let (status, body) = request(&ctx, "GET", "/api/v1/users?limit=10", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["users"].is_array());
    assert!(body["total"].as_i64().unwrap() >= 1);
}

/// Test that user payload and username grammar failures map to 422 and 400
#[tokio::test]
async fn test_user_validation() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = request(
        &ctx,
        "POST",
        "/api/v1/users",
        None,
        Some(json!({
            "username": "",
            "email": "not-an-email"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    let details = body["details"].as_array().unwrap();
    assert!(details.iter().any(|d| d["field"] == "username"));
    assert!(details.iter().any(|d| d["field"] == "email"));

    // Passes the payload checks, fails the domain's username grammar
    let (status, body) = request(
        &ctx,
        "POST",
        "/api/v1/users",
        None,
        Some(json!({
            "username": "has space",
            "email": "spaced@example.com"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

/// Test creating, listing, and fetching projects
#[tokio::test]
async fn test_project_crud_flow() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = request(
        &ctx,
        "POST",
        "/api/v1/projects",
        Some(ctx.owner.id),
        Some(json!({
            "name": "Apollo",
            "description": "Moonshot planning"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Apollo");
    assert_eq!(body["status"], "active");
    assert_eq!(body["owner_id"], ctx.owner.id.to_string());
    let project_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = request(&ctx, "GET", "/api/v1/projects", Some(ctx.owner.id), None).await;

    assert_eq!(status, StatusCode::OK);
    let projects = body.as_array().unwrap();
    assert!(projects.iter().any(|p| p["id"] == project_id.as_str()));

    let (status, body) = request(
        &ctx,
        "GET",
        &format!("/api/v1/projects/{}", project_id),
        Some(ctx.owner.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Apollo");

    let (status, body) = request(
        &ctx,
        "GET",
        &format!("/api/v1/projects/{}", Uuid::new_v4()),
        Some(ctx.owner.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

/// Test that non-members cannot see a project until they are added
#[tokio::test]
async fn test_project_access_gate() {
    let ctx = TestContext::new().await.unwrap();
    let outsider = ctx.create_user("outsider").await.unwrap();

    let (status, body) = request(
        &ctx,
        "POST",
        "/api/v1/projects",
        Some(ctx.owner.id),
        Some(json!({"name": "Skunkworks"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let project_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = request(
        &ctx,
        "GET",
        &format!("/api/v1/projects/{}", project_id),
        Some(outsider.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    // Adding without a role defaults to viewer
    let (status, body) = request(
        &ctx,
        "POST",
        &format!("/api/v1/projects/{}/members", project_id),
        Some(ctx.owner.id),
        Some(json!({"user_id": outsider.id})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "viewer");

    let (status, _) = request(
        &ctx,
        "GET",
        &format!("/api/v1/projects/{}", project_id),
        Some(outsider.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

/// Test adding, listing, re-roling, and removing members
#[tokio::test]
async fn test_member_roles_flow() {
    let ctx = TestContext::new().await.unwrap();
    let bob = ctx.create_user("bob").await.unwrap();

    let (status, body) = request(
        &ctx,
        "POST",
        "/api/v1/projects",
        Some(ctx.owner.id),
        Some(json!({"name": "Crewed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let project_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = request(
        &ctx,
        "POST",
        &format!("/api/v1/projects/{}/members", project_id),
        Some(ctx.owner.id),
        Some(json!({"user_id": bob.id, "role": "editor"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "editor");

    let (status, body) = request(
        &ctx,
        "PATCH",
        &format!("/api/v1/projects/{}/members/{}", project_id, bob.id),
        Some(ctx.owner.id),
        Some(json!({"role": "viewer"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "viewer");

    // Owner's implicit membership row makes two entries
    let (status, body) = request(
        &ctx,
        "GET",
        &format!("/api/v1/projects/{}/members", project_id),
        Some(ctx.owner.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let members = body.as_array().unwrap();
    assert_eq!(members.len(), 2);
    assert!(members
        .iter()
        .any(|m| m["username"] == ctx.owner.username.as_str() && m["role"] == "owner"));

    let (status, body) = request(
        &ctx,
        "DELETE",
        &format!("/api/v1/projects/{}/members/{}", project_id, bob.id),
        Some(ctx.owner.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = request(
        &ctx,
        "GET",
        &format!("/api/v1/projects/{}", project_id),
        Some(bob.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

/// Test that viewers can read but not create tasks
#[tokio::test]
async fn test_viewer_cannot_create_task() {
    let ctx = TestContext::new().await.unwrap();
    let carol = ctx.create_user("carol").await.unwrap();

    let (status, body) = request(
        &ctx,
        "POST",
        "/api/v1/projects",
        Some(ctx.owner.id),
        Some(json!({"name": "ReadOnly"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let project_id = body["id"].as_str().unwrap().to_string();

    let (status, _) = request(
        &ctx,
        "POST",
        &format!("/api/v1/projects/{}/members", project_id),
        Some(ctx.owner.id),
        Some(json!({"user_id": carol.id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(
        &ctx,
        "POST",
        &format!("/api/v1/projects/{}/tasks", project_id),
        Some(carol.id),
        Some(json!({"title": "Not allowed"})),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = request(
        &ctx,
        "GET",
        &format!("/api/v1/projects/{}/tasks", project_id),
        Some(carol.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

/// Test the task lifecycle: create with assignees, fetch, update, filter
#[tokio::test]
async fn test_task_lifecycle() {
    let ctx = TestContext::new().await.unwrap();
    let bob = ctx.create_user("bob").await.unwrap();

    let (status, body) = request(
        &ctx,
        "POST",
        "/api/v1/projects",
        Some(ctx.owner.id),
        Some(json!({"name": "Shipyard"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let project_id = body["id"].as_str().unwrap().to_string();

    let (status, _) = request(
        &ctx,
        "POST",
        &format!("/api/v1/projects/{}/members", project_id),
        Some(ctx.owner.id),
        Some(json!({"user_id": bob.id, "role": "editor"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(
        &ctx,
        "POST",
        &format!("/api/v1/projects/{}/tasks", project_id),
        Some(bob.id),
        Some(json!({
            "title": "Draft the hull",
            "assignees": [bob.id]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Draft the hull");
    assert_eq!(body["status"], "todo");
    assert_eq!(body["priority"], "medium");
    let task_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = request(
        &ctx,
        "GET",
        &format!("/api/v1/tasks/{}", task_id),
        Some(ctx.owner.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Draft the hull");
    assert_eq!(body["assignees"][0], bob.id.to_string());

    let (status, body) = request(
        &ctx,
        "PATCH",
        &format!("/api/v1/tasks/{}", task_id),
        Some(ctx.owner.id),
        Some(json!({"status": "done", "priority": "high"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "done");
    assert_eq!(body["priority"], "high");

    let (status, body) = request(
        &ctx,
        "GET",
        &format!("/api/v1/projects/{}/tasks?status=done", project_id),
        Some(ctx.owner.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = request(
        &ctx,
        "GET",
        &format!("/api/v1/projects/{}/tasks?status=todo", project_id),
        Some(ctx.owner.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

/// Test that assignees must be project members
#[tokio::test]
async fn test_assignee_rules() {
    let ctx = TestContext::new().await.unwrap();
    let outsider = ctx.create_user("outsider").await.unwrap();

    let (status, body) = request(
        &ctx,
        "POST",
        "/api/v1/projects",
        Some(ctx.owner.id),
        Some(json!({"name": "Roster"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let project_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = request(
        &ctx,
        "POST",
        &format!("/api/v1/projects/{}/tasks", project_id),
        Some(ctx.owner.id),
        Some(json!({
            "title": "Assign a stranger",
            "assignees": [outsider.id]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, body) = request(
        &ctx,
        "POST",
        &format!("/api/v1/projects/{}/tasks", project_id),
        Some(ctx.owner.id),
        Some(json!({"title": "Unassigned"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let task_id = body["id"].as_str().unwrap().to_string();

    let (status, _) = request(
        &ctx,
        "POST",
        &format!("/api/v1/tasks/{}/assignees", task_id),
        Some(ctx.owner.id),
        Some(json!({"user_ids": [outsider.id]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(
        &ctx,
        "POST",
        &format!("/api/v1/projects/{}/members", project_id),
        Some(ctx.owner.id),
        Some(json!({"user_id": outsider.id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(
        &ctx,
        "POST",
        &format!("/api/v1/tasks/{}/assignees", task_id),
        Some(ctx.owner.id),
        Some(json!({"user_ids": [outsider.id]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["added"][0], outsider.id.to_string());

    let (status, body) = request(
        &ctx,
        "DELETE",
        &format!("/api/v1/tasks/{}/assignees/{}", task_id, outsider.id),
        Some(ctx.owner.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());
}

/// Test that completing a project locks out task writes until reopened
#[tokio::test]
async fn test_completed_project_locks_writes() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = request(
        &ctx,
        "POST",
        "/api/v1/projects",
        Some(ctx.owner.id),
        Some(json!({"name": "Wrapped"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let project_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = request(
        &ctx,
        "POST",
        &format!("/api/v1/projects/{}/complete", project_id),
        Some(ctx.owner.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");

    let (status, body) = request(
        &ctx,
        "POST",
        &format!("/api/v1/projects/{}/complete", project_id),
        Some(ctx.owner.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (status, _) = request(
        &ctx,
        "POST",
        &format!("/api/v1/projects/{}/tasks", project_id),
        Some(ctx.owner.id),
        Some(json!({"title": "Too late"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = request(
        &ctx,
        "POST",
        &format!("/api/v1/projects/{}/reopen", project_id),
        Some(ctx.owner.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "active");

    let (status, _) = request(
        &ctx,
        "POST",
        &format!("/api/v1/projects/{}/tasks", project_id),
        Some(ctx.owner.id),
        Some(json!({"title": "Back in business"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

/// Test comment target rules and per-target listings
#[tokio::test]
async fn test_comment_targets() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = request(
        &ctx,
        "POST",
        "/api/v1/projects",
        Some(ctx.owner.id),
        Some(json!({"name": "Forum"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let project_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = request(
        &ctx,
        "POST",
        &format!("/api/v1/projects/{}/tasks", project_id),
        Some(ctx.owner.id),
        Some(json!({"title": "Discuss"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let task_id = body["id"].as_str().unwrap().to_string();

    // Both targets set
    let (status, body) = request(
        &ctx,
        "POST",
        "/api/v1/comments",
        Some(ctx.owner.id),
        Some(json!({
            "project_id": project_id,
            "task_id": task_id,
            "body": "Ambiguous"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    // Neither target set
    let (status, _) = request(
        &ctx,
        "POST",
        "/api/v1/comments",
        Some(ctx.owner.id),
        Some(json!({"body": "Lost"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Empty body fails payload validation
    let (status, body) = request(
        &ctx,
        "POST",
        "/api/v1/comments",
        Some(ctx.owner.id),
        Some(json!({"project_id": project_id, "body": ""})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");

    let (status, _) = request(
        &ctx,
        "POST",
        "/api/v1/comments",
        Some(ctx.owner.id),
        Some(json!({"project_id": project_id, "body": "On the project"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(
        &ctx,
        "POST",
        "/api/v1/comments",
        Some(ctx.owner.id),
        Some(json!({"task_id": task_id, "body": "On the task"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(
        &ctx,
        "GET",
        &format!("/api/v1/projects/{}/comments", project_id),
        Some(ctx.owner.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let comments = body.as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["body"], "On the project");

    let (status, body) = request(
        &ctx,
        "GET",
        &format!("/api/v1/tasks/{}/comments", task_id),
        Some(ctx.owner.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

/// Test the mention fanout: inbox, dedupe, unread count, mark-read link
#[tokio::test]
async fn test_mention_notification_flow() {
    let ctx = TestContext::new().await.unwrap();
    let bob = ctx.create_user("bob").await.unwrap();

    let (status, body) = request(
        &ctx,
        "POST",
        "/api/v1/projects",
        Some(ctx.owner.id),
        Some(json!({"name": "Mentions"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let project_id = body["id"].as_str().unwrap().to_string();

    let (status, _) = request(
        &ctx,
        "POST",
        &format!("/api/v1/projects/{}/members", project_id),
        Some(ctx.owner.id),
        Some(json!({"user_id": bob.id, "role": "editor"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(
        &ctx,
        "POST",
        "/api/v1/comments",
        Some(bob.id),
        Some(json!({
            "project_id": project_id,
            "body": format!("@{} please review", ctx.owner.username)
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // A second mention of the same user in the same place is deduplicated
    let (status, _) = request(
        &ctx,
        "POST",
        "/api/v1/comments",
        Some(bob.id),
        Some(json!({
            "project_id": project_id,
            "body": format!("@{} still waiting", ctx.owner.username)
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(
        &ctx,
        "GET",
        "/api/v1/notifications",
        Some(ctx.owner.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let notifications = body["notifications"].as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["kind"], "mention");
    assert_eq!(
        notifications[0]["message"],
        format!("{} mentioned you in a comment", bob.username)
    );
    let notification_id = notifications[0]["id"].as_str().unwrap().to_string();

    let (status, body) = request(
        &ctx,
        "GET",
        "/api/v1/notifications/unread_count",
        Some(ctx.owner.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unread"], 1);

    // Another user cannot mark it; the inbox is invisible across actors
    let (status, _) = request(
        &ctx,
        "POST",
        &format!("/api/v1/notifications/{}/read", notification_id),
        Some(bob.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = request(
        &ctx,
        "POST",
        &format!("/api/v1/notifications/{}/read", notification_id),
        Some(ctx.owner.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notification"]["is_read"], true);
    assert_eq!(body["link"], format!("/projects/{}/", project_id));

    // Marking again is idempotent
    let (status, _) = request(
        &ctx,
        "POST",
        &format!("/api/v1/notifications/{}/read", notification_id),
        Some(ctx.owner.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(
        &ctx,
        "GET",
        "/api/v1/notifications/unread_count",
        Some(ctx.owner.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unread"], 0);
}

/// Test inbox keyset pagination across mention notifications
#[tokio::test]
async fn test_inbox_pagination() {
    let ctx = TestContext::new().await.unwrap();
    let bob = ctx.create_user("bob").await.unwrap();

    let mut project_ids = Vec::new();
    for name in ["Alpha", "Beta", "Gamma"] {
        let (status, body) = request(
            &ctx,
            "POST",
            "/api/v1/projects",
            Some(ctx.owner.id),
            Some(json!({"name": name})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let project_id = body["id"].as_str().unwrap().to_string();

        let (status, _) = request(
            &ctx,
            "POST",
            &format!("/api/v1/projects/{}/members", project_id),
            Some(ctx.owner.id),
            Some(json!({"user_id": bob.id})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = request(
            &ctx,
            "POST",
            "/api/v1/comments",
            Some(bob.id),
            Some(json!({
                "project_id": project_id,
                "body": format!("@{} ping", ctx.owner.username)
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        project_ids.push(project_id);
    }

    let (status, body) = request(
        &ctx,
        "GET",
        "/api/v1/notifications?limit=2",
        Some(ctx.owner.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let page = body["notifications"].as_array().unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0]["related_project_id"], project_ids[2].as_str());
    assert_eq!(page[1]["related_project_id"], project_ids[1].as_str());

    // '|' is not a valid query character; send the cursor percent-encoded
    let cursor = body["next_cursor"].as_str().unwrap().replace('|', "%7C");

    let (status, body) = request(
        &ctx,
        "GET",
        &format!("/api/v1/notifications?limit=2&cursor={}", cursor),
        Some(ctx.owner.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let page = body["notifications"].as_array().unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0]["related_project_id"], project_ids[0].as_str());
    assert!(body.get("next_cursor").is_none());

    // A garbage cursor is rejected, not treated as page one
    let (status, body) = request(
        &ctx,
        "GET",
        "/api/v1/notifications?cursor=garbage",
        Some(ctx.owner.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

/// Test file metadata validation and per-target listings
#[tokio::test]
async fn test_file_rules() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = request(
        &ctx,
        "POST",
        "/api/v1/projects",
        Some(ctx.owner.id),
        Some(json!({"name": "Archive"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let project_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = request(
        &ctx,
        "POST",
        "/api/v1/files",
        Some(ctx.owner.id),
        Some(json!({
            "project_id": project_id,
            "original_filename": "spec.pdf",
            "size_bytes": 4096
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["original_filename"], "spec.pdf");

    // Extension allow-list
    let (status, body) = request(
        &ctx,
        "POST",
        "/api/v1/files",
        Some(ctx.owner.id),
        Some(json!({
            "project_id": project_id,
            "original_filename": "payload.sh",
            "size_bytes": 100
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    // Declared size must be positive and under the cap
    let (status, _) = request(
        &ctx,
        "POST",
        "/api/v1/files",
        Some(ctx.owner.id),
        Some(json!({
            "project_id": project_id,
            "original_filename": "empty.pdf",
            "size_bytes": 0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(
        &ctx,
        "POST",
        "/api/v1/files",
        Some(ctx.owner.id),
        Some(json!({
            "project_id": project_id,
            "original_filename": "huge.pdf",
            "size_bytes": 50 * 1024 * 1024
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = request(
        &ctx,
        "GET",
        &format!("/api/v1/projects/{}/files", project_id),
        Some(ctx.owner.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

/// Test the project activity feed ordering and access gate
#[tokio::test]
async fn test_activity_feed() {
    let ctx = TestContext::new().await.unwrap();
    let outsider = ctx.create_user("outsider").await.unwrap();

    let (status, body) = request(
        &ctx,
        "POST",
        "/api/v1/projects",
        Some(ctx.owner.id),
        Some(json!({"name": "Chronicle"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let project_id = body["id"].as_str().unwrap().to_string();

    let (status, _) = request(
        &ctx,
        "POST",
        &format!("/api/v1/projects/{}/tasks", project_id),
        Some(ctx.owner.id),
        Some(json!({"title": "Wire the keel"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(
        &ctx,
        "POST",
        "/api/v1/comments",
        Some(ctx.owner.id),
        Some(json!({"project_id": project_id, "body": "Logged"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(
        &ctx,
        "GET",
        &format!("/api/v1/projects/{}/activity", project_id),
        Some(ctx.owner.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let feed = body.as_array().unwrap();
    assert_eq!(feed.len(), 3);
    assert_eq!(feed[0]["kind"], "comment_added");
    assert_eq!(feed[1]["kind"], "task_created");
    assert_eq!(feed[2]["kind"], "project_created");

    let (status, _) = request(
        &ctx,
        "GET",
        &format!("/api/v1/projects/{}/activity", project_id),
        Some(outsider.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

/// Test file metadata recording, the extension allow-list, and listing
#[tokio::test]
async fn test_file_records() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = request(
        &ctx,
        "POST",
        "/api/v1/projects",
        Some(ctx.owner.id),
        Some(json!({"name": "Archive"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let project_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = request(
        &ctx,
        "POST",
        "/api/v1/files",
        Some(ctx.owner.id),
        Some(json!({
            "project_id": project_id,
            "original_filename": "plan.pdf",
            "size_bytes": 52000
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["original_filename"], "plan.pdf");
    assert_eq!(body["size_bytes"], 52000);
    assert_eq!(body["uploaded_by"], ctx.owner.id.to_string());

    // Disallowed extension never persists
    let (status, body) = request(
        &ctx,
        "POST",
        "/api/v1/files",
        Some(ctx.owner.id),
        Some(json!({
            "project_id": project_id,
            "original_filename": "malware.exe",
            "size_bytes": 100
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert_eq!(body["message"], "File extension .exe is not allowed");

    let (status, body) = request(
        &ctx,
        "GET",
        &format!("/api/v1/projects/{}/files", project_id),
        Some(ctx.owner.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let files = body.as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["original_filename"], "plan.pdf");

    let (status, body) = request(
        &ctx,
        "GET",
        &format!("/api/v1/projects/{}/activity", project_id),
        Some(ctx.owner.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["kind"], "file_uploaded");
    assert_eq!(body[0]["description"], "uploaded file \"plan.pdf\"");
}
