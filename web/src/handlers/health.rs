//! Health check endpoints.
//!
//! These endpoints are used by load balancers and monitoring systems
//! to verify service health. Neither runs the lifecycle engine.

use crate::state::ApiState;
use aapkaun_core::RequestEnvironment;
use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

/// Simple health check endpoint (for basic liveness).
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Readiness report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Readiness {
    /// `ready` once at least one endpoint is registered, `empty` otherwise.
    pub status: &'static str,
    /// Registered endpoint names, sorted.
    pub endpoints: Vec<String>,
}

/// Readiness check: the endpoint table is populated.
///
/// # Status Codes
///
/// - 200 OK: at least one endpoint registered
/// - 503 Service Unavailable: the table is empty
///
/// # Endpoint
///
/// ```text
/// GET /ready
/// ```
#[allow(clippy::unused_async)]
pub async fn readiness_check<E: RequestEnvironment>(
    State(state): State<ApiState<E>>,
) -> (StatusCode, Json<Readiness>) {
    let endpoints: Vec<String> = state.registry().names().map(str::to_string).collect();

    if endpoints.is_empty() {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(Readiness {
                status: "empty",
                endpoints,
            }),
        )
    } else {
        (
            StatusCode::OK,
            Json(Readiness {
                status: "ready",
                endpoints,
            }),
        )
    }
}
