//! Allocation error types.

use rust_decimal::Decimal;
use thiserror::Error;

use cambio_shared::AppError;

/// Errors raised by the denomination allocator.
///
/// Every variant is raised before anything is staged or written; a failed
/// allocation leaves no trace.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// The target sum must be strictly positive.
    #[error("Allocation target must be positive, got {0}")]
    NonPositiveTarget(Decimal),

    /// The usage percentage must lie in [0, 100].
    #[error("Usage percentage must be within 0..=100, got {0}")]
    InvalidUsagePercentage(u8),

    /// The target exceeds the total value available across the stacks.
    #[error("Insufficient float: requested {requested}, available {available}")]
    InsufficientFloat {
        /// The requested target sum.
        requested: Decimal,
        /// The total value available.
        available: Decimal,
    },

    /// The greedy pass could not settle the full target.
    ///
    /// Reachable when the remaining target is not representable in the
    /// available denominations even though the total value suffices.
    #[error("Could not allocate remainder of {remaining} from available denominations")]
    UnallocatedRemainder {
        /// The value left unallocated after the final stack.
        remaining: Decimal,
    },
}

impl From<AllocationError> for AppError {
    fn from(err: AllocationError) -> Self {
        match err {
            AllocationError::NonPositiveTarget(_)
            | AllocationError::InvalidUsagePercentage(_) => Self::Validation(err.to_string()),
            AllocationError::InsufficientFloat {
                requested,
                available,
            } => Self::InsufficientFloat {
                requested,
                available,
            },
            AllocationError::UnallocatedRemainder { .. } => Self::Conflict(err.to_string()),
        }
    }
}
