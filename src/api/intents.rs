use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value as JsonValue};
use tracing::info;

use crate::api::ApiState;
use crate::error::AppError;

/// POST /api/stk/initiations
///
/// Trusted internal endpoint recording the synchronous push acknowledgment.
/// Unlike the callback endpoint, this one propagates precise error detail:
/// 400 naming the missing field, 409 on a duplicate key, 5xx on infra.
pub async fn log_initiation(
    State(state): State<ApiState>,
    Json(payload): Json<JsonValue>,
) -> Result<impl IntoResponse, AppError> {
    let intent = state.reconciler.create_intent(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": intent.id,
            "checkoutRequestID": intent.checkout_request_id,
        })),
    ))
}

/// GET /api/stk/intents
///
/// All intents newest first. An empty store is a normal state, answered
/// with an explicit message rather than a 404.
pub async fn list_intents(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, AppError> {
    let intents = state.reconciler.list_intents().await?;
    info!(count = intents.len(), "Listing payment intents");

    if intents.is_empty() {
        return Ok(Json(json!({
            "message": "No payment intents recorded yet",
            "intents": [],
        })));
    }

    Ok(Json(json!({
        "count": intents.len(),
        "intents": intents,
    })))
}

/// GET /api/stk/intents/{checkout_request_id}
pub async fn get_intent(
    State(state): State<ApiState>,
    Path(checkout_request_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let intent = state.reconciler.get_intent(&checkout_request_id).await?;
    Ok(Json(intent))
}
