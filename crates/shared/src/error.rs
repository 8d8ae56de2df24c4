//! Application-wide error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error taxonomy.
///
/// Every fallible operation in the float engine maps its module error into
/// one of these variants at the service boundary. Errors that reject an
/// operation before any write (`Validation`, `NotFound`,
/// `InsufficientFloat`) guarantee that no state was changed.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input failed validation (missing ids, zero sums, wrong status).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Access denied.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Allocation target exceeds the available float.
    #[error("Insufficient float: requested {requested}, available {available}")]
    InsufficientFloat {
        /// The requested target sum.
        requested: Decimal,
        /// The total value available across the relevant stacks.
        available: Decimal,
    },

    /// Unconfirmed float stacks are blocking an open/close confirmation.
    #[error("Unconfirmed repositories: {0:?}")]
    Consistency(Vec<Uuid>),

    /// Conflict (e.g., repository already possessed by another session).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Consistency(_) | Self::Conflict(_) => 409,
            Self::InsufficientFloat { .. } => 422,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::InsufficientFloat { .. } => "INSUFFICIENT_FLOAT",
            Self::Consistency(_) => "UNCONFIRMED_REPOSITORIES",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AppError::Validation(String::new()).status_code(), 400);
        assert_eq!(AppError::Forbidden(String::new()).status_code(), 403);
        assert_eq!(AppError::NotFound(String::new()).status_code(), 404);
        assert_eq!(AppError::Consistency(vec![]).status_code(), 409);
        assert_eq!(AppError::Conflict(String::new()).status_code(), 409);
        assert_eq!(
            AppError::InsufficientFloat {
                requested: dec!(1000),
                available: dec!(500),
            }
            .status_code(),
            422
        );
        assert_eq!(AppError::Database(String::new()).status_code(), 500);
        assert_eq!(AppError::Internal(String::new()).status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::Validation(String::new()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(AppError::NotFound(String::new()).error_code(), "NOT_FOUND");
        assert_eq!(
            AppError::InsufficientFloat {
                requested: dec!(1),
                available: dec!(0),
            }
            .error_code(),
            "INSUFFICIENT_FLOAT"
        );
        assert_eq!(
            AppError::Consistency(vec![]).error_code(),
            "UNCONFIRMED_REPOSITORIES"
        );
        assert_eq!(AppError::Conflict(String::new()).error_code(), "CONFLICT");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Validation("inbound sum must be non-zero".into()).to_string(),
            "Validation error: inbound sum must be non-zero"
        );
        assert_eq!(
            AppError::InsufficientFloat {
                requested: dec!(1000),
                available: dec!(500),
            }
            .to_string(),
            "Insufficient float: requested 1000, available 500"
        );
    }
}
