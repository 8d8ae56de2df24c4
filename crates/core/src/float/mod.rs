//! Per-denomination float stacks.
//!
//! A float stack is the counter for one denomination in one repository
//! within one session. Stacks are created when a session opens (seeded
//! from their predecessor in the prior session), mutated by count entry,
//! confirmation, and breakdown commits, and never deleted - they form an
//! append-only chain across sessions.

pub mod error;
pub mod stack;
pub mod types;

pub use error::FloatError;
pub use types::{CountField, Denomination, FloatPhase, FloatStack};
