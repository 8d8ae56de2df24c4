//! Breakdown lifecycle planning.
//!
//! A breakdown allocates denomination units of a float stack to a
//! breakable entity (order, transfer, or swap) in a given direction.
//! Rows move through CREATED -> COMMITTED -> CANCELLED; committing
//! adjusts the linked stack's spend accumulator, uncommitting applies
//! the exact inverse.

pub mod error;
pub mod ledger;
pub mod types;

pub use error::BreakdownError;
pub use ledger::BreakdownLedger;
pub use types::{
    BreakableKind, BreakableRef, BreakdownIntention, BreakdownPlan, BreakdownRow, BreakdownStatus,
    Direction, StackAdjustment,
};
