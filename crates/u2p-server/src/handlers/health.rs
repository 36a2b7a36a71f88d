use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use u2p_git::MirrorHealth;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub backend: String,
    pub mirror: MirrorHealth,
}

/// Handler para GET /health
///
/// 200 con status UP mientras el mirror sea usable, 503 con DOWN si no.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let repository = state.repository();

    let (code, status) = match repository.health_check().await {
        Ok(()) => (StatusCode::OK, "UP"),
        Err(e) => {
            tracing::warn!(error = %e, "Mirror health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "DOWN")
        },
    };

    let body = HealthResponse {
        status: status.to_string(),
        backend: repository.name().to_string(),
        mirror: repository.health(),
    };

    (code, Json(body))
}
