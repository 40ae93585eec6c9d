//! Store contract for payment-intent correlation.
//!
//! The trait seam exists so the reconciler can be exercised against an
//! in-memory double; production uses the Postgres-backed repository.

use async_trait::async_trait;

use crate::database::error::DatabaseError;
use crate::database::intent::{CallbackPatch, NewPaymentIntent, PaymentIntent, UpdateOutcome};

#[async_trait]
pub trait CorrelationStore: Send + Sync {
    /// Insert a new Pending intent. Fails with a unique-violation error if
    /// the checkout request ID already exists (caller bug, not retryable).
    async fn create(&self, intent: NewPaymentIntent) -> Result<PaymentIntent, DatabaseError>;

    /// Apply a callback patch iff the row exists and is still Pending.
    ///
    /// Must be a single atomic operation against the backing store. This is
    /// the sole callback write path and the mechanism that makes the first
    /// terminal write win: concurrent or duplicate callbacks collapse to
    /// `PredicateFailed` no-ops.
    async fn complete_if_pending(
        &self,
        checkout_request_id: &str,
        patch: CallbackPatch,
    ) -> Result<UpdateOutcome, DatabaseError>;

    /// All intents, newest first. Listing only; not part of reconciliation.
    async fn find_all(&self) -> Result<Vec<PaymentIntent>, DatabaseError>;

    /// Look up a single intent by correlation key.
    async fn find_by_checkout_id(
        &self,
        checkout_request_id: &str,
    ) -> Result<Option<PaymentIntent>, DatabaseError>;
}
