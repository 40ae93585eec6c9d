//! Error response formatting
//!
//! Converts `AppError` into consistent JSON error responses on the trusted
//! API surface. The provider callback endpoint never goes through this path;
//! its responses are fixed by the acknowledgment policy.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorCode};

/// Standardized error response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,

    /// Machine-readable error code
    pub code: ErrorCode,

    /// Request ID for debugging and support
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// ISO 8601 timestamp of the error
    pub timestamp: String,

    /// Whether the client should retry the request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

impl ErrorResponse {
    pub fn from_app_error(error: &AppError) -> Self {
        Self {
            error: error.user_message(),
            code: error.error_code(),
            request_id: error.request_id.clone(),
            timestamp: Utc::now().to_rfc3339(),
            retryable: Some(error.is_retryable()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status_code.is_server_error() {
            tracing::error!(
                error = ?self,
                request_id = ?self.request_id,
                status = %status_code.as_u16(),
                "Server error occurred"
            );
        } else {
            tracing::warn!(
                error = ?self,
                request_id = ?self.request_id,
                status = %status_code.as_u16(),
                "Client error occurred"
            );
        }

        let error_response = ErrorResponse::from_app_error(&self);
        (status_code, Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_from_app_error() {
        let app_error = AppError::missing_field("CustomerMessage").with_request_id("req_123");

        let error_response = ErrorResponse::from_app_error(&app_error);

        assert_eq!(error_response.code, ErrorCode::ValidationError);
        assert_eq!(error_response.request_id, Some("req_123".to_string()));
        assert_eq!(
            error_response.error,
            "Missing required field: CustomerMessage"
        );
    }

    #[test]
    fn test_app_error_into_response() {
        let response = AppError::missing_field("CheckoutRequestID").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::duplicate_intent("ws_CO_1").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_error_body_names_missing_field() {
        let body = serde_json::to_value(ErrorResponse::from_app_error(&AppError::missing_field(
            "CustomerMessage",
        )))
        .unwrap();

        assert_eq!(
            body.get("error").and_then(|v| v.as_str()),
            Some("Missing required field: CustomerMessage")
        );
    }
}
