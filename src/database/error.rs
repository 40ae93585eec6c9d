use crate::error::{AppError, AppErrorKind, InfrastructureError};
use std::fmt;

/// Database error with a classified kind
#[derive(Debug, Clone)]
pub struct DatabaseError {
    kind: DatabaseErrorKind,
}

#[derive(Debug, Clone)]
pub enum DatabaseErrorKind {
    /// A unique constraint was violated (duplicate correlation key)
    UniqueViolation { constraint: String },
    /// Entity lookup returned no rows
    NotFound { entity: String, id: String },
    /// The pool or statement timed out
    Timeout { message: String },
    /// Could not reach the database at all
    Connection { message: String },
    /// Anything sqlx reported that we do not classify further
    Unknown { message: String },
}

impl DatabaseError {
    pub fn new(kind: DatabaseErrorKind) -> Self {
        Self { kind }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(DatabaseErrorKind::Timeout {
            message: message.into(),
        })
    }

    pub fn kind(&self) -> &DatabaseErrorKind {
        &self.kind
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self.kind, DatabaseErrorKind::UniqueViolation { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, DatabaseErrorKind::Timeout { .. })
    }

    /// Classify a raw sqlx error
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        let kind = match &err {
            sqlx::Error::Database(db_err) => {
                if db_err.code().as_deref() == Some("23505") {
                    DatabaseErrorKind::UniqueViolation {
                        constraint: db_err
                            .constraint()
                            .unwrap_or("unknown constraint")
                            .to_string(),
                    }
                } else {
                    DatabaseErrorKind::Unknown {
                        message: db_err.to_string(),
                    }
                }
            }
            sqlx::Error::RowNotFound => DatabaseErrorKind::NotFound {
                entity: "row".to_string(),
                id: "unknown".to_string(),
            },
            sqlx::Error::PoolTimedOut => DatabaseErrorKind::Timeout {
                message: "timed out acquiring a connection from the pool".to_string(),
            },
            sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
                DatabaseErrorKind::Connection {
                    message: err.to_string(),
                }
            }
            _ => DatabaseErrorKind::Unknown {
                message: err.to_string(),
            },
        };

        Self { kind }
    }
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DatabaseErrorKind::UniqueViolation { constraint } => {
                write!(f, "unique constraint violated: {}", constraint)
            }
            DatabaseErrorKind::NotFound { entity, id } => {
                write!(f, "{} '{}' not found", entity, id)
            }
            DatabaseErrorKind::Timeout { message } => write!(f, "database timeout: {}", message),
            DatabaseErrorKind::Connection { message } => {
                write!(f, "database connection failure: {}", message)
            }
            DatabaseErrorKind::Unknown { message } => write!(f, "database error: {}", message),
        }
    }
}

impl std::error::Error for DatabaseError {}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        let kind = match err.kind() {
            DatabaseErrorKind::Timeout { message } => {
                AppErrorKind::Infrastructure(InfrastructureError::Timeout {
                    operation: message.clone(),
                    timeout_ms: 0,
                })
            }
            DatabaseErrorKind::Connection { message } => {
                AppErrorKind::Infrastructure(InfrastructureError::Database {
                    message: message.clone(),
                    is_retryable: true,
                })
            }
            other => AppErrorKind::Infrastructure(InfrastructureError::Database {
                message: format!("{:?}", other),
                is_retryable: false,
            }),
        };

        AppError::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_is_classified() {
        let err = DatabaseError::new(DatabaseErrorKind::UniqueViolation {
            constraint: "payment_intents_checkout_request_id_key".to_string(),
        });

        assert!(err.is_unique_violation());
        assert!(!err.is_timeout());
        assert!(err.to_string().contains("checkout_request_id"));
    }

    #[test]
    fn timeout_maps_to_retryable_app_error() {
        let err = DatabaseError::timeout("complete_if_pending exceeded 10s");
        assert!(err.is_timeout());

        let app: AppError = err.into();
        assert_eq!(app.status_code(), 500);
        assert_eq!(app.error_code(), crate::error::ErrorCode::StoreTimeout);
        assert!(app.is_retryable());
    }
}
