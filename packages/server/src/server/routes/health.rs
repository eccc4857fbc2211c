use axum::{extract::Extension, Json};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    subscribed_topics: Vec<&'static str>,
}

/// Health check endpoint
///
/// The pipeline is in-process, so a running server with its stages wired
/// is healthy.
pub async fn health_handler(Extension(state): Extension<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        subscribed_topics: state.engine.bus().topics(),
    })
}
