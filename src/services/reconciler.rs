//! Payment-intent reconciliation.
//!
//! Correlates the synchronous initiation acknowledgment with the later
//! asynchronous provider callback, keyed by CheckoutRequestID. Duplicate and
//! racing callbacks are absorbed by the store's predicate-gated update;
//! orphan callbacks are logged but never fabricate records.

use serde_json::Value as JsonValue;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::database::error::DatabaseError;
use crate::database::intent::{CallbackPatch, NewPaymentIntent, PaymentIntent, UpdateOutcome};
use crate::database::repository::CorrelationStore;
use crate::error::AppError;
use crate::payments::resolver;
use crate::payments::types::{CallbackEnvelope, InitiationRequest, PaymentStatus};

/// Classification of a callback reconciliation attempt.
///
/// All three variants are successful attempts from the provider's point of
/// view; only `CallbackError` carries genuine failures.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// The intent transitioned to its terminal status
    Applied {
        checkout_request_id: String,
        status: PaymentStatus,
    },
    /// The intent was already terminal: duplicate delivery or a race
    /// resolved by an earlier callback
    AlreadyFinal { checkout_request_id: String },
    /// No intent exists for the key: the callback outran the initiation
    /// record, or references an unknown push
    Unmatched { checkout_request_id: String },
}

#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("malformed callback envelope: {message}")]
    Shape { message: String },
    #[error(transparent)]
    Store(#[from] DatabaseError),
}

/// Orchestrates intent creation and callback reconciliation against the
/// correlation store. Holds no state beyond the store handle; safe to share
/// across concurrent requests.
pub struct Reconciler {
    store: Arc<dyn CorrelationStore>,
    store_timeout: Duration,
}

impl Reconciler {
    pub fn new(store: Arc<dyn CorrelationStore>, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    /// Record a push initiation as a new Pending intent.
    ///
    /// The raw payload is preserved verbatim as the audit blob. A duplicate
    /// correlation key is surfaced as a conflict; this endpoint serves a
    /// trusted caller and is not subject to the acknowledgment policy.
    pub async fn create_intent(&self, raw_payload: JsonValue) -> Result<PaymentIntent, AppError> {
        let initiation = InitiationRequest::from_payload(&raw_payload).validate()?;

        let result = self
            .bounded("create", self.store.create(NewPaymentIntent {
                checkout_request_id: initiation.checkout_request_id.clone(),
                merchant_request_id: initiation.merchant_request_id.clone(),
                initiation_payload: raw_payload,
            }))
            .await;

        match result {
            Ok(intent) => {
                info!(
                    checkout_request_id = %intent.checkout_request_id,
                    merchant_request_id = %intent.merchant_request_id,
                    "Payment intent created"
                );
                Ok(intent)
            }
            Err(err) if err.is_unique_violation() => {
                Err(AppError::duplicate_intent(initiation.checkout_request_id))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Reconcile a provider callback against its intent.
    pub async fn apply_callback(
        &self,
        raw_payload: JsonValue,
    ) -> Result<ReconcileOutcome, CallbackError> {
        let envelope: CallbackEnvelope =
            serde_json::from_value(raw_payload.clone()).map_err(|e| CallbackError::Shape {
                message: e.to_string(),
            })?;
        let callback = envelope.body.stk_callback;
        let checkout_request_id = callback.checkout_request_id.clone();

        let resolution = resolver::resolve(
            callback.result_code_value(),
            callback.callback_metadata.as_ref(),
        );

        let patch = CallbackPatch {
            status: resolution.status,
            result_code: callback.result_code_value(),
            result_description: callback.result_desc.clone(),
            transaction_code: resolution.fields.transaction_code,
            transaction_amount: resolution.fields.transaction_amount,
            transaction_date: resolution.fields.transaction_date,
            phone_number: resolution.fields.phone_number,
            callback_payload: raw_payload,
        };

        let outcome = self
            .bounded(
                "complete_if_pending",
                self.store.complete_if_pending(&checkout_request_id, patch),
            )
            .await?;

        Ok(match outcome {
            UpdateOutcome::Applied => {
                info!(
                    checkout_request_id = %checkout_request_id,
                    status = %resolution.status,
                    "Callback reconciled; intent is now terminal"
                );
                ReconcileOutcome::Applied {
                    checkout_request_id,
                    status: resolution.status,
                }
            }
            UpdateOutcome::PredicateFailed => {
                // Benign: at-least-once delivery, or a race a prior callback won.
                info!(
                    checkout_request_id = %checkout_request_id,
                    "Duplicate callback absorbed; intent already terminal"
                );
                ReconcileOutcome::AlreadyFinal {
                    checkout_request_id,
                }
            }
            UpdateOutcome::NotFound => {
                warn!(
                    checkout_request_id = %checkout_request_id,
                    "Orphan callback: no matching intent recorded"
                );
                ReconcileOutcome::Unmatched {
                    checkout_request_id,
                }
            }
        })
    }

    /// All intents, newest first, for the listing endpoint.
    pub async fn list_intents(&self) -> Result<Vec<PaymentIntent>, AppError> {
        self.bounded("find_all", self.store.find_all())
            .await
            .map_err(AppError::from)
    }

    /// Look up a single intent by its correlation key.
    pub async fn get_intent(&self, checkout_request_id: &str) -> Result<PaymentIntent, AppError> {
        self.bounded(
            "find_by_checkout_id",
            self.store.find_by_checkout_id(checkout_request_id),
        )
        .await?
        .ok_or_else(|| AppError::intent_not_found(checkout_request_id))
    }

    /// Bound a store operation by the configured deadline. An elapsed timer
    /// becomes a database timeout so it flows through the same error paths
    /// as any other infrastructure failure.
    async fn bounded<T>(
        &self,
        operation: &str,
        fut: impl Future<Output = Result<T, DatabaseError>>,
    ) -> Result<T, DatabaseError> {
        match timeout(self.store_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(DatabaseError::timeout(format!(
                "{} exceeded {:?}",
                operation, self.store_timeout
            ))),
        }
    }
}
