//! Status resolution for provider callbacks.
//!
//! Pure mapping from result code plus optional metadata items to a domain
//! status and the transaction fields extracted from a success callback.
//! No I/O and no state; data-quality problems are logged, never raised.

use bigdecimal::BigDecimal;
use serde_json::Value as JsonValue;
use std::str::FromStr;
use tracing::warn;

use crate::payments::types::{CallbackMetadata, MetadataItem, PaymentStatus};

/// Transaction fields carried by a success callback's metadata block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFields {
    pub transaction_code: Option<String>,
    pub transaction_amount: Option<BigDecimal>,
    pub transaction_date: Option<String>,
    pub phone_number: Option<String>,
}

/// Outcome of status resolution
#[derive(Debug, Clone, PartialEq)]
pub struct StatusResolution {
    pub status: PaymentStatus,
    pub fields: ExtractedFields,
}

/// Resolve a callback's result code and metadata into a domain status.
///
/// Field extraction only runs for Success. A failure callback that happens
/// to carry a metadata block leaves every field null; malformed providers
/// do produce such payloads.
pub fn resolve(result_code: Option<i64>, metadata: Option<&CallbackMetadata>) -> StatusResolution {
    let status = match result_code {
        Some(0) => PaymentStatus::Success,
        Some(1032) => PaymentStatus::UserCancelled,
        Some(1) => PaymentStatus::InsufficientFunds,
        Some(_) => PaymentStatus::Failed,
        None => PaymentStatus::Unknown,
    };

    let fields = if status == PaymentStatus::Success {
        metadata
            .map(|m| extract_fields(&m.items))
            .unwrap_or_default()
    } else {
        ExtractedFields::default()
    };

    StatusResolution { status, fields }
}

fn extract_fields(items: &[MetadataItem]) -> ExtractedFields {
    ExtractedFields {
        transaction_code: lookup(items, "MpesaReceiptNumber"),
        transaction_amount: lookup(items, "Amount").and_then(parse_amount),
        transaction_date: lookup(items, "TransactionDate"),
        phone_number: lookup(items, "PhoneNumber"),
    }
}

/// First matching name wins when the provider duplicates an item.
fn lookup(items: &[MetadataItem], name: &str) -> Option<String> {
    items
        .iter()
        .find(|item| item.name == name)
        .and_then(|item| item.value.as_ref())
        .and_then(value_as_string)
}

fn value_as_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_amount(raw: String) -> Option<BigDecimal> {
    match BigDecimal::from_str(&raw) {
        Ok(amount) => Some(amount),
        Err(_) => {
            warn!(raw_amount = %raw, "Non-numeric Amount in success callback metadata");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata(items: JsonValue) -> CallbackMetadata {
        serde_json::from_value(json!({ "Item": items })).expect("valid metadata")
    }

    #[test]
    fn result_code_mapping_table() {
        let cases = [
            (Some(0), PaymentStatus::Success),
            (Some(1), PaymentStatus::InsufficientFunds),
            (Some(1032), PaymentStatus::UserCancelled),
            (Some(999), PaymentStatus::Failed),
            (Some(2001), PaymentStatus::Failed),
            (None, PaymentStatus::Unknown),
        ];

        for (code, expected) in cases {
            assert_eq!(resolve(code, None).status, expected, "code {:?}", code);
        }
    }

    #[test]
    fn success_extracts_transaction_fields() {
        let meta = metadata(json!([
            {"Name": "Amount", "Value": 100.50},
            {"Name": "MpesaReceiptNumber", "Value": "ABC123"},
            {"Name": "TransactionDate", "Value": 20191219102115u64},
            {"Name": "PhoneNumber", "Value": 254708374149u64}
        ]));

        let resolution = resolve(Some(0), Some(&meta));

        assert_eq!(resolution.status, PaymentStatus::Success);
        assert_eq!(
            resolution.fields.transaction_amount,
            Some(BigDecimal::from_str("100.5").unwrap())
        );
        assert_eq!(
            resolution.fields.transaction_code,
            Some("ABC123".to_string())
        );
        assert_eq!(
            resolution.fields.transaction_date,
            Some("20191219102115".to_string())
        );
        assert_eq!(
            resolution.fields.phone_number,
            Some("254708374149".to_string())
        );
    }

    #[test]
    fn first_matching_name_wins_on_duplicates() {
        let meta = metadata(json!([
            {"Name": "MpesaReceiptNumber", "Value": "FIRST"},
            {"Name": "MpesaReceiptNumber", "Value": "SECOND"}
        ]));

        let resolution = resolve(Some(0), Some(&meta));
        assert_eq!(
            resolution.fields.transaction_code,
            Some("FIRST".to_string())
        );
    }

    #[test]
    fn missing_names_yield_null_fields() {
        let meta = metadata(json!([{"Name": "Amount", "Value": "50"}]));

        let resolution = resolve(Some(0), Some(&meta));
        assert_eq!(
            resolution.fields.transaction_amount,
            Some(BigDecimal::from(50))
        );
        assert_eq!(resolution.fields.transaction_code, None);
        assert_eq!(resolution.fields.phone_number, None);
    }

    #[test]
    fn non_numeric_amount_yields_null_not_error() {
        let meta = metadata(json!([
            {"Name": "Amount", "Value": "not-a-number"},
            {"Name": "MpesaReceiptNumber", "Value": "XYZ9"}
        ]));

        let resolution = resolve(Some(0), Some(&meta));
        assert_eq!(resolution.status, PaymentStatus::Success);
        assert_eq!(resolution.fields.transaction_amount, None);
        assert_eq!(resolution.fields.transaction_code, Some("XYZ9".to_string()));
    }

    #[test]
    fn extraction_skipped_for_non_success_even_with_metadata() {
        let meta = metadata(json!([
            {"Name": "Amount", "Value": "100.50"},
            {"Name": "MpesaReceiptNumber", "Value": "ABC123"}
        ]));

        let resolution = resolve(Some(1032), Some(&meta));
        assert_eq!(resolution.status, PaymentStatus::UserCancelled);
        assert_eq!(resolution.fields, ExtractedFields::default());
    }
}
