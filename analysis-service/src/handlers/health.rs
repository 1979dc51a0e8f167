use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe. Reports provider configuration without calling either remote.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let classifier = state.analyzer.classifier();
    let narrator = state.analyzer.narrator();

    Json(json!({
        "status": "ok",
        "service": "analysis-service",
        "version": env!("CARGO_PKG_VERSION"),
        "providers": {
            "classifier": {
                "name": classifier.name(),
                "configured": classifier.is_configured(),
            },
            "narrator": {
                "name": narrator.name(),
                "model": narrator.model(),
                "configured": narrator.is_configured(),
            },
        }
    }))
}

/// Readiness probe: both providers must be configured.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    if state.analyzer.classifier().is_configured() && state.analyzer.narrator().is_configured() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
