//! Liveness probe for load balancers and deploy scripts.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{db::DbPool, error::ApiError, models::response::ApiResponse};

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: &'static str,
    pub checked_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub health: HealthStatus,
}

/// `GET /health`
///
/// Answers `{"stat": "ok", "health": {"status": "healthy", ...}}` once the
/// database accepts a query. Never gated by login, so monitoring needs no
/// credentials. A database failure surfaces as the usual code 1 envelope.
pub async fn health_check(
    State(pool): State<DbPool>,
) -> Result<Json<ApiResponse<HealthBody>>, ApiError> {
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&pool)
        .await?;

    Ok(Json(ApiResponse::ok(HealthBody {
        health: HealthStatus {
            status: "healthy",
            database: "connected",
            checked_at: Utc::now(),
        },
    })))
}
