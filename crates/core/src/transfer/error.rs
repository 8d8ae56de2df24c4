//! Transfer error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use cambio_shared::AppError;

use crate::session::SessionStatus;

/// Errors that can occur when creating a float transfer.
#[derive(Debug, Error)]
pub enum TransferError {
    /// A transfer sum must be non-zero.
    #[error("{side} sum must be non-zero")]
    ZeroSum {
        /// Which side carried the zero sum ("outbound" or "inbound").
        side: &'static str,
    },

    /// A transfer sum must be positive.
    #[error("{side} sum must be positive, got {sum}")]
    NegativeSum {
        /// Which side carried the negative sum.
        side: &'static str,
        /// The offending sum.
        sum: Decimal,
    },

    /// Outbound and inbound repositories must differ.
    #[error("Cannot transfer from repository {0} to itself")]
    SameRepository(Uuid),

    /// Transfers require an open, trading session.
    #[error("Session is '{actual}', transfers require 'float_open_complete'")]
    SessionNotTrading {
        /// The session's actual status.
        actual: SessionStatus,
    },

    /// The supplied breakdowns do not cover the transfer sum.
    #[error("{side} breakdowns cover {actual}, expected {expected}")]
    CoverageMismatch {
        /// Which side failed coverage.
        side: &'static str,
        /// The sum the breakdowns must cover.
        expected: Decimal,
        /// The sum they actually cover.
        actual: Decimal,
    },
}

impl From<TransferError> for AppError {
    fn from(err: TransferError) -> Self {
        Self::Validation(err.to_string())
    }
}
