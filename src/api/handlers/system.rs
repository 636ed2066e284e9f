use crate::api::models::HealthResponse;
use axum::Json;

/// Handler for GET /health - Liveness check, no API key required
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
