//! Breakdown error types.

use rust_decimal::Decimal;
use thiserror::Error;

use cambio_shared::AppError;

use super::types::BreakableRef;

/// Errors that can occur in the breakdown lifecycle.
#[derive(Debug, Error)]
pub enum BreakdownError {
    /// No rows exist for the breakable.
    #[error("No breakdown rows exist for {0}")]
    NoRows(BreakableRef),

    /// Uncommit requested but no row has been committed.
    #[error("Nothing committed for {0}; uncommit requires committed rows")]
    NothingCommitted(BreakableRef),

    /// Delete requested but committed rows exist.
    #[error("Cannot delete breakdown rows for {0}: committed rows must be uncommitted first")]
    AlreadyCommitted(BreakableRef),

    /// The rows do not cover the breakable's target sum.
    #[error("Breakdown rows for {breakable} cover {actual}, expected {expected}")]
    CoverageMismatch {
        /// The breakable whose rows were checked.
        breakable: BreakableRef,
        /// The target sum the rows must cover.
        expected: Decimal,
        /// The sum the rows actually cover.
        actual: Decimal,
    },
}

impl From<BreakdownError> for AppError {
    fn from(err: BreakdownError) -> Self {
        match err {
            BreakdownError::NoRows(_) => Self::NotFound(err.to_string()),
            BreakdownError::NothingCommitted(_)
            | BreakdownError::AlreadyCommitted(_)
            | BreakdownError::CoverageMismatch { .. } => Self::Validation(err.to_string()),
        }
    }
}
