//! Unified error handling for the pesalog service
//!
//! Maps every failure to an HTTP status, a machine-readable error code, and a
//! user-facing message. Provider-facing callback handling deliberately does
//! NOT route through this module for infrastructure failures; see
//! `payments::ack` for the acknowledgment policy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes for programmatic client handling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCode {
    #[serde(rename = "VALIDATION_ERROR")]
    ValidationError,
    #[serde(rename = "DUPLICATE_INTENT")]
    DuplicateIntent,
    #[serde(rename = "INTENT_NOT_FOUND")]
    IntentNotFound,
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError,
    #[serde(rename = "STORE_TIMEOUT")]
    StoreTimeout,
}

/// Domain-specific business logic errors
#[derive(Debug, Clone)]
pub enum DomainError {
    /// A payment intent already exists for the given correlation key
    DuplicateIntent { checkout_request_id: String },
    /// No payment intent exists for the given correlation key
    IntentNotFound { checkout_request_id: String },
}

/// Infrastructure-level errors (database, timeouts)
#[derive(Debug, Clone)]
pub enum InfrastructureError {
    /// Database connection or query failure
    Database { message: String, is_retryable: bool },
    /// A store operation exceeded its configured deadline
    Timeout { operation: String, timeout_ms: u64 },
}

/// Input validation errors.
///
/// Only the trusted initiation payload is validated through here; a
/// malformed callback envelope is a `CallbackError::Shape` handled by the
/// acknowledgment policy instead.
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// Required field missing from the initiation payload
    MissingField { field: String },
}

/// Unified application error type
#[derive(Debug, Clone)]
pub struct AppError {
    pub kind: AppErrorKind,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone)]
pub enum AppErrorKind {
    Domain(DomainError),
    Infrastructure(InfrastructureError),
    Validation(ValidationError),
}

impl AppError {
    pub fn new(kind: AppErrorKind) -> Self {
        Self {
            kind,
            request_id: None,
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::new(AppErrorKind::Validation(ValidationError::MissingField {
            field: field.into(),
        }))
    }

    pub fn duplicate_intent(checkout_request_id: impl Into<String>) -> Self {
        Self::new(AppErrorKind::Domain(DomainError::DuplicateIntent {
            checkout_request_id: checkout_request_id.into(),
        }))
    }

    pub fn intent_not_found(checkout_request_id: impl Into<String>) -> Self {
        Self::new(AppErrorKind::Domain(DomainError::IntentNotFound {
            checkout_request_id: checkout_request_id.into(),
        }))
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Map error to HTTP status code
    pub fn status_code(&self) -> u16 {
        match &self.kind {
            AppErrorKind::Domain(err) => match err {
                DomainError::DuplicateIntent { .. } => 409, // Conflict
                DomainError::IntentNotFound { .. } => 404,
            },
            // All infrastructure failure is 500 on the trusted surface; the
            // distinction between timeout and outage lives in the error code.
            AppErrorKind::Infrastructure(_) => 500,
            AppErrorKind::Validation(err) => match err {
                ValidationError::MissingField { .. } => 400,
            },
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> ErrorCode {
        match &self.kind {
            AppErrorKind::Domain(err) => match err {
                DomainError::DuplicateIntent { .. } => ErrorCode::DuplicateIntent,
                DomainError::IntentNotFound { .. } => ErrorCode::IntentNotFound,
            },
            AppErrorKind::Infrastructure(err) => match err {
                InfrastructureError::Database { .. } => ErrorCode::DatabaseError,
                InfrastructureError::Timeout { .. } => ErrorCode::StoreTimeout,
            },
            AppErrorKind::Validation(err) => match err {
                ValidationError::MissingField { .. } => ErrorCode::ValidationError,
            },
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match &self.kind {
            AppErrorKind::Domain(err) => match err {
                DomainError::DuplicateIntent {
                    checkout_request_id,
                } => {
                    format!(
                        "A payment intent already exists for checkout request '{}'",
                        checkout_request_id
                    )
                }
                DomainError::IntentNotFound {
                    checkout_request_id,
                } => {
                    format!(
                        "No payment intent found for checkout request '{}'",
                        checkout_request_id
                    )
                }
            },
            AppErrorKind::Infrastructure(_) => {
                "Service temporarily unavailable. Please try again later".to_string()
            }
            AppErrorKind::Validation(err) => match err {
                ValidationError::MissingField { field } => {
                    format!("Missing required field: {}", field)
                }
            },
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match &self.kind {
            AppErrorKind::Domain(_) => false,
            AppErrorKind::Infrastructure(err) => match err {
                InfrastructureError::Database { is_retryable, .. } => *is_retryable,
                InfrastructureError::Timeout { .. } => true,
            },
            AppErrorKind::Validation(_) => false,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for AppError {}

// Note: From<DatabaseError> is implemented in database/error.rs to avoid
// a circular dependency.
