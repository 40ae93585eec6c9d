//! pesalog: STK push payment-intent tracking and callback reconciliation.
//!
//! Correlates the synchronous push-initiation acknowledgment with the
//! asynchronous provider result callback into one consistent record per
//! CheckoutRequestID, while honoring the provider's fixed acknowledgment
//! contract.

pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod health;
pub mod logging;
pub mod middleware;
pub mod payments;
pub mod services;
