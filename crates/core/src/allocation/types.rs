//! Allocation domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::breakdown::Direction;

/// Settlement priority for the allocator's stack ordering.
///
/// The ordering decides which denominations the greedy pass consumes
/// first; it is an explicit policy rather than a hard-coded sort so that
/// business preference can change without touching the algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationPolicy {
    /// Settle from the largest denomination down (the default).
    #[default]
    LargestFirst,
    /// Settle from the smallest denomination up.
    SmallestFirst,
}

/// Parameters for one allocation run.
#[derive(Debug, Clone)]
pub struct AllocationRequest {
    /// Flow direction the staged rows will carry.
    pub direction: Direction,
    /// The sum to break into denomination counts. Must be positive.
    pub target_sum: Decimal,
    /// Percentage of each non-final stack's availability the allocator
    /// may use. The remainder stays behind to preserve denomination
    /// diversity; the final stack always ignores this cap.
    pub usage_percentage: u8,
    /// Stack ordering policy.
    pub policy: AllocationPolicy,
}

impl AllocationRequest {
    /// Creates a request with the default largest-first policy.
    #[must_use]
    pub fn new(direction: Direction, target_sum: Decimal, usage_percentage: u8) -> Self {
        Self {
            direction,
            target_sum,
            usage_percentage,
            policy: AllocationPolicy::default(),
        }
    }
}

/// One staged allocation line: units of one stack pledged to a breakable.
///
/// Staged rows have not touched any stack; they become breakdown rows via
/// the CREATE intention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedBreakdown {
    /// The stack the units come from (or arrive into).
    pub float_stack_id: Uuid,
    /// The repository holding that stack.
    pub repository_id: Uuid,
    /// The denomination allocated.
    pub denomination_id: Uuid,
    /// Number of units allocated.
    pub count: Decimal,
    /// Flow direction.
    pub direction: Direction,
    /// Face value of one unit.
    pub denominated_value: Decimal,
}

impl StagedBreakdown {
    /// Monetary value of this line.
    #[must_use]
    pub fn value(&self) -> Decimal {
        self.count * self.denominated_value
    }
}
