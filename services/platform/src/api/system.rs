//! Health API handler.
//!
//! # Purpose and responsibility
//! Lightweight liveness/readiness probe for operators and load balancers.
//!
//! # Key invariants and assumptions
//! - Health checks must be fast and side-effect free.
//! - Public: no token required.
use crate::api::error::{ApiError, api_internal};
use crate::api::types::HealthStatus;
use crate::app::AppState;
use axum::Json;
use axum::extract::State;

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "system",
    responses(
        (status = 200, description = "Service health", body = HealthStatus),
        (status = 500, description = "Store unavailable", body = crate::api::types::ErrorResponse)
    )
)]
/// Return service health.
///
/// # What it does
/// Probes the backing store and answers `OK` when it responds.
///
/// # Errors
/// - Returns 500 if the storage health check fails.
pub(crate) async fn health(State(state): State<AppState>) -> Result<Json<HealthStatus>, ApiError> {
    if let Err(err) = state.store.health_check().await {
        return Err(api_internal("Storage unavailable", &err));
    }
    Ok(Json(HealthStatus {
        status: "OK".to_string(),
        message: "Server is running".to_string(),
    }))
}
