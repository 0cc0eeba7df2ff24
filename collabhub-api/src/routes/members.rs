/// Project member management endpoints
///
/// All mutations here are owner-only; listing requires view access. The
/// `owner` role is never grantable and the owner's own position cannot be
/// touched through these routes.
///
/// # Endpoints
///
/// ```text
/// POST   /api/v1/projects/:project_id/members             Add a member
/// GET    /api/v1/projects/:project_id/members             List members
/// PATCH  /api/v1/projects/:project_id/members/:user_id    Change a role
/// DELETE /api/v1/projects/:project_id/members/:user_id    Remove a member
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use collabhub_core::access::middleware::Actor;
use collabhub_core::models::membership::{Membership, MembershipRole, ProjectMember};
use collabhub_core::ops::{self, members::AddMember};
use serde::Deserialize;
use uuid::Uuid;

/// Request body for changing a member's role
#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    /// New role; `owner` is rejected
    pub role: MembershipRole,
}

/// Adds a user to the project
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/projects/:project_id/members
/// ```
///
/// # Request
///
/// ```json
/// {
///   "user_id": "b3c94f6a-8d21-4f0e-9c37-2a4f3a1d9b10",
///   "role": "editor"
/// }
/// ```
///
/// The role defaults to `viewer` when omitted. The added user is notified
/// and the feed records the addition.
pub async fn add_member(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<AddMember>,
) -> ApiResult<Json<Membership>> {
    tracing::debug!(project_id = %project_id, user_id = %req.user_id, "Adding member");

    let membership = ops::members::add_member(&state.db, &actor, project_id, req).await?;

    Ok(Json(membership))
}

/// Lists the project's members with usernames
pub async fn list_members(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<ProjectMember>>> {
    let members = ops::members::list_members(&state.db, &actor, project_id).await?;
    Ok(Json(members))
}

/// Changes a member's role
pub async fn change_member_role(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((project_id, user_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<ChangeRoleRequest>,
) -> ApiResult<Json<Membership>> {
    let membership =
        ops::members::change_member_role(&state.db, &actor, project_id, user_id, req.role).await?;

    Ok(Json(membership))
}

/// Removes a member from the project
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((project_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    ops::members::remove_member(&state.db, &actor, project_id, user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_member_role_defaults_to_viewer() {
        let req: AddMember =
            serde_json::from_str(r#"{"user_id": "b3c94f6a-8d21-4f0e-9c37-2a4f3a1d9b10"}"#)
                .unwrap();
        assert_eq!(req.role, MembershipRole::Viewer);
    }

    #[test]
    fn test_change_role_request_parses_roles() {
        let req: ChangeRoleRequest = serde_json::from_str(r#"{"role": "editor"}"#).unwrap();
        assert_eq!(req.role, MembershipRole::Editor);

        let req: ChangeRoleRequest = serde_json::from_str(r#"{"role": "viewer"}"#).unwrap();
        assert_eq!(req.role, MembershipRole::Viewer);

        assert!(serde_json::from_str::<ChangeRoleRequest>(r#"{"role": "admin"}"#).is_err());
    }
}
