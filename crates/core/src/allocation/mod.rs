//! Greedy denomination breakdown allocator.
//!
//! Converts a target sum into discrete per-stack unit counts drawn from
//! the available float of one ticker. The result is staged only; applying
//! it to stacks is the breakdown ledger's job.

pub mod allocator;
pub mod error;
pub mod types;

#[cfg(test)]
mod props;

pub use allocator::DenominationAllocator;
pub use error::AllocationError;
pub use types::{AllocationPolicy, AllocationRequest, StagedBreakdown};
