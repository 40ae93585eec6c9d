//! Services module for business logic

pub mod reconciler;

pub use reconciler::{CallbackError, ReconcileOutcome, Reconciler};
