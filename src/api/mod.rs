//! HTTP API handlers and shared state

pub mod callbacks;
pub mod intents;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use crate::health::HealthChecker;
use crate::services::reconciler::Reconciler;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct ApiState {
    pub reconciler: Arc<Reconciler>,
    pub health: HealthChecker,
}

/// GET /health
pub async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let status = state.health.check_health().await;

    let code = if status.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(status))
}
