//! Wire types for the STK push provider protocol.
//!
//! Both inbound payloads are validated once here, at the ingress boundary,
//! and handed to the reconciler as typed values. The raw JSON bodies are
//! preserved separately as audit blobs.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::AppError;

/// Domain status of a payment intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
    UserCancelled,
    InsufficientFunds,
    Unknown,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
            PaymentStatus::UserCancelled => "user_cancelled",
            PaymentStatus::InsufficientFunds => "insufficient_funds",
            PaymentStatus::Unknown => "unknown",
        }
    }

    /// Parse a stored status string; anything unrecognized degrades to
    /// Unknown rather than failing a read path.
    pub fn parse(value: &str) -> PaymentStatus {
        match value {
            "pending" => PaymentStatus::Pending,
            "success" => PaymentStatus::Success,
            "failed" => PaymentStatus::Failed,
            "user_cancelled" => PaymentStatus::UserCancelled,
            "insufficient_funds" => PaymentStatus::InsufficientFunds,
            _ => PaymentStatus::Unknown,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Initiation acknowledgment payload, as an optional-field schema.
///
/// Every field is optional at the serde level so a missing field surfaces
/// as a 400 naming the field instead of an opaque deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitiationRequest {
    #[serde(rename = "MerchantRequestID")]
    pub merchant_request_id: Option<String>,
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: Option<String>,
    #[serde(rename = "ResponseCode")]
    pub response_code: Option<String>,
    #[serde(rename = "ResponseDescription")]
    pub response_description: Option<String>,
    #[serde(rename = "CustomerMessage")]
    pub customer_message: Option<String>,
}

/// Validated initiation event consumed by the reconciler
#[derive(Debug, Clone)]
pub struct StkInitiation {
    pub merchant_request_id: String,
    pub checkout_request_id: String,
    pub response_code: String,
    pub response_description: String,
    pub customer_message: String,
}

impl InitiationRequest {
    /// Build from a raw JSON body. A non-object body degrades to the empty
    /// schema, so validation reports the first missing field.
    pub fn from_payload(payload: &JsonValue) -> Self {
        serde_json::from_value(payload.clone()).unwrap_or_default()
    }

    /// Check all required fields are present, naming the first one missing.
    pub fn validate(self) -> Result<StkInitiation, AppError> {
        let merchant_request_id = self
            .merchant_request_id
            .ok_or_else(|| AppError::missing_field("MerchantRequestID"))?;
        let checkout_request_id = self
            .checkout_request_id
            .ok_or_else(|| AppError::missing_field("CheckoutRequestID"))?;
        let response_code = self
            .response_code
            .ok_or_else(|| AppError::missing_field("ResponseCode"))?;
        let response_description = self
            .response_description
            .ok_or_else(|| AppError::missing_field("ResponseDescription"))?;
        let customer_message = self
            .customer_message
            .ok_or_else(|| AppError::missing_field("CustomerMessage"))?;

        Ok(StkInitiation {
            merchant_request_id,
            checkout_request_id,
            response_code,
            response_description,
            customer_message,
        })
    }
}

/// Provider callback envelope: `{"Body": {"stkCallback": {...}}}`.
///
/// The envelope and the correlation key are the only hard structural
/// requirements; everything else is tolerated as absent.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackEnvelope {
    #[serde(rename = "Body")]
    pub body: CallbackBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackBody {
    #[serde(rename = "stkCallback")]
    pub stk_callback: StkCallback,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StkCallback {
    #[serde(rename = "MerchantRequestID", default)]
    pub merchant_request_id: Option<String>,
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,
    #[serde(rename = "ResultCode", default)]
    pub result_code: Option<JsonValue>,
    #[serde(rename = "ResultDesc", default)]
    pub result_desc: Option<String>,
    #[serde(rename = "CallbackMetadata", default)]
    pub callback_metadata: Option<CallbackMetadata>,
}

impl StkCallback {
    /// The provider has been observed sending ResultCode both as a JSON
    /// number and as a string; anything else resolves to Unknown upstream.
    pub fn result_code_value(&self) -> Option<i64> {
        match self.result_code.as_ref()? {
            JsonValue::Number(n) => n.as_i64(),
            JsonValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackMetadata {
    #[serde(rename = "Item", default)]
    pub items: Vec<MetadataItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetadataItem {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value", default)]
    pub value: Option<JsonValue>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_customer_message_names_the_field() {
        let payload = json!({
            "MerchantRequestID": "29115-34620561-1",
            "CheckoutRequestID": "ws_CO_27072017151044001",
            "ResponseCode": "0",
            "ResponseDescription": "Success. Request accepted for processing"
        });

        let err = InitiationRequest::from_payload(&payload)
            .validate()
            .unwrap_err();

        assert_eq!(err.status_code(), 400);
        assert_eq!(
            err.user_message(),
            "Missing required field: CustomerMessage"
        );
    }

    #[test]
    fn complete_initiation_validates() {
        let payload = json!({
            "MerchantRequestID": "29115-34620561-1",
            "CheckoutRequestID": "ws_CO_27072017151044001",
            "ResponseCode": "0",
            "ResponseDescription": "Success. Request accepted for processing",
            "CustomerMessage": "Success. Request accepted for processing"
        });

        let init = InitiationRequest::from_payload(&payload)
            .validate()
            .expect("valid payload");
        assert_eq!(init.checkout_request_id, "ws_CO_27072017151044001");
    }

    #[test]
    fn non_object_body_reports_first_missing_field() {
        let err = InitiationRequest::from_payload(&json!([1, 2, 3]))
            .validate()
            .unwrap_err();
        assert_eq!(
            err.user_message(),
            "Missing required field: MerchantRequestID"
        );
    }

    #[test]
    fn envelope_without_stk_callback_fails_to_parse() {
        let payload = json!({"Body": {"unexpected": {}}});
        let parsed: Result<CallbackEnvelope, _> = serde_json::from_value(payload);
        assert!(parsed.is_err());
    }

    #[test]
    fn result_code_accepts_number_and_string() {
        let number: StkCallback = serde_json::from_value(json!({
            "CheckoutRequestID": "ws_CO_1",
            "ResultCode": 1032
        }))
        .unwrap();
        assert_eq!(number.result_code_value(), Some(1032));

        let string: StkCallback = serde_json::from_value(json!({
            "CheckoutRequestID": "ws_CO_1",
            "ResultCode": "0"
        }))
        .unwrap();
        assert_eq!(string.result_code_value(), Some(0));

        let garbage: StkCallback = serde_json::from_value(json!({
            "CheckoutRequestID": "ws_CO_1",
            "ResultCode": {"nested": true}
        }))
        .unwrap();
        assert_eq!(garbage.result_code_value(), None);
    }

    #[test]
    fn status_string_roundtrip() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Success,
            PaymentStatus::Failed,
            PaymentStatus::UserCancelled,
            PaymentStatus::InsufficientFunds,
            PaymentStatus::Unknown,
        ] {
            assert_eq!(PaymentStatus::parse(status.as_str()), status);
        }
        assert_eq!(PaymentStatus::parse("garbage"), PaymentStatus::Unknown);
    }
}
