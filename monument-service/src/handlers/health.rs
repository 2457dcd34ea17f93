use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe. Always 200; reports whether the AI credential is present.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "monument-service",
            "version": env!("CARGO_PKG_VERSION"),
            "ai_configured": state.config.is_ai_configured(),
        })),
    )
}

/// Readiness probe. Not ready until an AI provider is configured.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    if state.provider.is_some() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
