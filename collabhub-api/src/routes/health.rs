/// Liveness endpoint
///
/// `GET /health` answers without authentication and reports whether the
/// service can reach its database. Deploy tooling keys off the `status`
/// field; everything else is informational.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use collabhub_core::db::pool;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: String,

    /// Crate version baked in at compile time
    pub version: String,

    /// "connected" or "disconnected"
    pub database: String,
}

/// Reports liveness plus database reachability
///
/// A degraded database does not fail the request; clients read the body.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let connected = pool::health_check(&state.db).await.is_ok();

    Ok(Json(HealthResponse {
        status: if connected { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if connected { "connected" } else { "disconnected" }.to_string(),
    }))
}
