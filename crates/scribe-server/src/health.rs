use axum::{Json, extract::State};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    message: String,
}

/// Health check handler
///
/// Answers without touching the speech model.
pub async fn health_handler(State(message): State<String>) -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok", message })
}
