use axum::{extract::State, response::IntoResponse, Json};
use serde_json::Value as JsonValue;
use tracing::{error, warn};

use crate::api::ApiState;
use crate::payments::ack;
use crate::services::reconciler::CallbackError;

/// POST /api/stk/callback
///
/// Untrusted webhook with at-least-once delivery. Every code path here must
/// terminate in the fixed acknowledgment structure; internal failure detail
/// goes to logs only, never onto the wire.
pub async fn stk_callback(
    State(state): State<ApiState>,
    Json(payload): Json<JsonValue>,
) -> impl IntoResponse {
    let result = state.reconciler.apply_callback(payload).await;

    match &result {
        // Applied / AlreadyFinal / Unmatched are logged inside the reconciler.
        Ok(_) => {}
        Err(CallbackError::Shape { message }) => {
            warn!(error = %message, "Rejecting structurally malformed callback");
        }
        Err(CallbackError::Store(e)) => {
            // Masked behind the canonical accept; operator alerting hangs
            // off this log line.
            error!(
                error = %e,
                "Store failure while reconciling callback; acknowledging anyway"
            );
        }
    }

    let (status, body) = ack::acknowledge(&result);
    (status, Json(body))
}
