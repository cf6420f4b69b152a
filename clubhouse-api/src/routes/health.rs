/// Liveness and readiness probe for the API server
///
/// `GET /health` is the only unauthenticated route outside `/v1`. It answers
/// 200 even when the database is unreachable; orchestration reads the
/// `status` field to decide whether to route traffic. "degraded" means the
/// process is up but the store round trip failed, which usually clears on
/// its own once the database is back.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: String,

    /// Crate version, for correlating deploys with behavior changes
    pub version: String,

    /// "connected" or "disconnected"
    pub database: String,
}

pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let db_ok = sqlx::query("SELECT 1").fetch_one(&state.db).await.is_ok();

    Ok(Json(HealthResponse {
        status: if db_ok { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if db_ok { "connected" } else { "disconnected" }.to_string(),
    }))
}
