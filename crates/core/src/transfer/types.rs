//! Transfer domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a float transfer.
///
/// Transfers apply immediately, so a persisted transfer is either
/// completed or was cancelled by a later reversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    /// Applied to both repositories' stacks.
    Completed,
    /// Reversed after application.
    Cancelled,
}

impl TransferStatus {
    /// Parses a status from its string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Input for creating a float transfer.
#[derive(Debug, Clone)]
pub struct TransferInput {
    /// The session within which the float moves.
    pub session_id: Uuid,
    /// Repository the units leave.
    pub outbound_repository_id: Uuid,
    /// Repository the units arrive into.
    pub inbound_repository_id: Uuid,
    /// Ticker of the outbound sum.
    pub outbound_ticker: String,
    /// Ticker of the inbound sum.
    pub inbound_ticker: String,
    /// Value leaving the outbound repository. Must be positive.
    pub outbound_sum: Decimal,
    /// Value arriving into the inbound repository. Must be positive.
    pub inbound_sum: Decimal,
}

/// The counter deltas a transfer applies to one float stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferAdjustment {
    /// The stack to adjust.
    pub float_stack_id: Uuid,
    /// Delta for `transferred_during_session` (positive moves units out).
    pub transferred_delta: Decimal,
}
