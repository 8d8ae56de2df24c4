//! Breakdown domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of entity a breakdown belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakableKind {
    /// A customer order.
    Order,
    /// An inter-repository float transfer.
    Transfer,
    /// A currency swap.
    Swap,
}

impl BreakableKind {
    /// Parses a kind from its string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "order" => Some(Self::Order),
            "transfer" => Some(Self::Transfer),
            "swap" => Some(Self::Swap),
            _ => None,
        }
    }

    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Transfer => "transfer",
            Self::Swap => "swap",
        }
    }
}

/// Typed reference to a breakable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BreakableRef {
    /// The entity's kind.
    pub kind: BreakableKind,
    /// The entity's id.
    pub id: Uuid,
}

impl BreakableRef {
    /// Creates a reference to a breakable entity.
    #[must_use]
    pub const fn new(kind: BreakableKind, id: Uuid) -> Self {
        Self { kind, id }
    }
}

impl std::fmt::Display for BreakableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}

/// Direction of a breakdown relative to the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Units flow into the repository.
    Inbound,
    /// Units flow out of the repository.
    Outbound,
}

impl Direction {
    /// Parses a direction from its string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "inbound" => Some(Self::Inbound),
            "outbound" => Some(Self::Outbound),
            _ => None,
        }
    }

    /// Returns the string representation of the direction.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }
}

/// Lifecycle status of a breakdown row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakdownStatus {
    /// Staged but not yet applied to any stack.
    Created,
    /// Applied to its stack's spend accumulator.
    Committed,
    /// Reversed; the inverse adjustment has been applied.
    Cancelled,
}

impl BreakdownStatus {
    /// Parses a status from its string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "created" => Some(Self::Created),
            "committed" => Some(Self::Committed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Committed => "committed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// The four intentions a caller can apply to a breakable's rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakdownIntention {
    /// Replace any existing rows with freshly staged ones.
    Create,
    /// Apply staged rows to their stacks.
    Commit,
    /// Reverse committed rows exactly.
    Uncommit,
    /// Remove rows outright (pre-commit only).
    Delete,
}

/// One breakdown row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakdownRow {
    /// Unique identifier.
    pub id: Uuid,
    /// The entity this row belongs to.
    pub breakable: BreakableRef,
    /// The float stack providing or receiving the units.
    pub float_stack_id: Uuid,
    /// The denomination of the units.
    pub denomination_id: Uuid,
    /// Number of units.
    pub count: Decimal,
    /// Flow direction.
    pub direction: Direction,
    /// Face value of one unit.
    pub denominated_value: Decimal,
    /// Lifecycle status.
    pub status: BreakdownStatus,
}

/// A spend adjustment for one float stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackAdjustment {
    /// The stack to adjust.
    pub float_stack_id: Uuid,
    /// Delta for `spent_during_session` (positive consumes units).
    pub spent_delta: Decimal,
}

/// The rows to flip and stacks to adjust for a commit or uncommit.
#[derive(Debug, Clone, Default)]
pub struct BreakdownPlan {
    /// Ids of the rows whose status changes.
    pub row_ids: Vec<Uuid>,
    /// Per-stack spend adjustments, in row order.
    pub adjustments: Vec<StackAdjustment>,
}

impl BreakdownPlan {
    /// Returns whether the plan has nothing to apply.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_ids.is_empty()
    }
}
