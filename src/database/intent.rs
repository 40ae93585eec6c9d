//! Payment intent entity and the write shapes applied to it.

use bigdecimal::BigDecimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::payments::types::PaymentStatus;

/// A payment intent: the unit of reconciliation.
///
/// Created once by the initiation event, mutated at most once by the first
/// valid callback for its `checkout_request_id`, never deleted here.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PaymentIntent {
    pub id: Uuid,
    pub checkout_request_id: String,
    pub merchant_request_id: String,
    pub status: String,
    pub initiation_payload: serde_json::Value,
    pub callback_payload: Option<serde_json::Value>,
    pub result_code: Option<i64>,
    pub result_description: Option<String>,
    pub transaction_code: Option<String>,
    pub transaction_amount: Option<BigDecimal>,
    pub transaction_date: Option<String>,
    pub phone_number: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl PaymentIntent {
    pub fn payment_status(&self) -> PaymentStatus {
        PaymentStatus::parse(&self.status)
    }
}

/// Insert shape for a new (Pending) intent
#[derive(Debug, Clone)]
pub struct NewPaymentIntent {
    pub checkout_request_id: String,
    pub merchant_request_id: String,
    pub initiation_payload: serde_json::Value,
}

/// Patch applied by the first terminal callback
#[derive(Debug, Clone)]
pub struct CallbackPatch {
    pub status: PaymentStatus,
    pub result_code: Option<i64>,
    pub result_description: Option<String>,
    pub transaction_code: Option<String>,
    pub transaction_amount: Option<BigDecimal>,
    pub transaction_date: Option<String>,
    pub phone_number: Option<String>,
    pub callback_payload: serde_json::Value,
}

/// Result of the predicate-gated callback write.
///
/// `PredicateFailed` means the row exists but is no longer Pending, i.e. a
/// duplicate delivery or a race already resolved by an earlier callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    PredicateFailed,
    NotFound,
}
