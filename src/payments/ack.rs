//! Provider acknowledgment policy.
//!
//! The provider retries any response other than the canonical accept, so
//! every reconciliation outcome AND every infrastructure failure collapses
//! to `200 {"ResultCode": 0, "ResultDesc": "Accepted"}`. The only rejection
//! is a structurally malformed envelope, which indicates an integration bug
//! rather than a legitimate duplicate or race. Masked failures must be
//! observable through logs instead; the handler is responsible for that.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::services::reconciler::{CallbackError, ReconcileOutcome};

/// Fixed wire response required by the provider protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderAck {
    #[serde(rename = "ResultCode")]
    pub result_code: i32,
    #[serde(rename = "ResultDesc")]
    pub result_desc: String,
}

impl ProviderAck {
    pub fn accepted() -> Self {
        Self {
            result_code: 0,
            result_desc: "Accepted".to_string(),
        }
    }

    pub fn rejected(desc: impl Into<String>) -> Self {
        Self {
            result_code: 1,
            result_desc: desc.into(),
        }
    }
}

/// Map a reconciliation result to the provider-facing response.
pub fn acknowledge(result: &Result<ReconcileOutcome, CallbackError>) -> (StatusCode, ProviderAck) {
    match result {
        Ok(_) => (StatusCode::OK, ProviderAck::accepted()),
        // Malformed sender: the one case a non-accepting response is allowed.
        Err(CallbackError::Shape { .. }) => (
            StatusCode::BAD_REQUEST,
            ProviderAck::rejected("Malformed callback payload"),
        ),
        // Store failure: accept anyway to suppress a retry storm.
        Err(CallbackError::Store(_)) => (StatusCode::OK, ProviderAck::accepted()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::error::DatabaseError;
    use crate::payments::types::PaymentStatus;

    fn outcome(kind: &str) -> Result<ReconcileOutcome, CallbackError> {
        let key = "ws_CO_27072017151044001".to_string();
        match kind {
            "applied" => Ok(ReconcileOutcome::Applied {
                checkout_request_id: key,
                status: PaymentStatus::Success,
            }),
            "already_final" => Ok(ReconcileOutcome::AlreadyFinal {
                checkout_request_id: key,
            }),
            "unmatched" => Ok(ReconcileOutcome::Unmatched {
                checkout_request_id: key,
            }),
            "timeout" => Err(CallbackError::Store(DatabaseError::timeout(
                "complete_if_pending exceeded deadline",
            ))),
            _ => unreachable!(),
        }
    }

    #[test]
    fn every_outcome_but_shape_error_is_accepted() {
        for kind in ["applied", "already_final", "unmatched", "timeout"] {
            let (status, ack) = acknowledge(&outcome(kind));
            assert_eq!(status, StatusCode::OK, "outcome {}", kind);
            assert_eq!(ack, ProviderAck::accepted(), "outcome {}", kind);
        }
    }

    #[test]
    fn shape_error_is_rejected_with_nonzero_code() {
        let result = Err(CallbackError::Shape {
            message: "missing field `stkCallback`".to_string(),
        });

        let (status, ack) = acknowledge(&result);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_ne!(ack.result_code, 0);
    }

    #[test]
    fn accepted_ack_serializes_to_provider_shape() {
        let body = serde_json::to_value(ProviderAck::accepted()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"ResultCode": 0, "ResultDesc": "Accepted"})
        );
    }
}
