//! Float stack error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use cambio_shared::AppError;

/// Errors that can occur when mutating a float stack.
#[derive(Debug, Error)]
pub enum FloatError {
    /// Counts must not be negative.
    #[error("Count must not be negative, got {0}")]
    NegativeCount(Decimal),

    /// A mutation would drive the stack's available units below zero.
    #[error("Stack {stack_id} would have negative availability: {available}")]
    NegativeAvailability {
        /// The stack whose availability would go negative.
        stack_id: Uuid,
        /// The availability the mutation would produce.
        available: Decimal,
    },

    /// The denomination is not accepted for float tracking.
    #[error("Denomination {0} is not accepted")]
    DenominationNotAccepted(Uuid),
}

impl From<FloatError> for AppError {
    fn from(err: FloatError) -> Self {
        match err {
            FloatError::NegativeCount(_) | FloatError::DenominationNotAccepted(_) => {
                Self::Validation(err.to_string())
            }
            FloatError::NegativeAvailability { .. } => Self::Conflict(err.to_string()),
        }
    }
}
