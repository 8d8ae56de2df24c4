//! Repository possession ledger.
//!
//! A repository (till, vault, wallet) is held exclusively by one session
//! at a time. Possession is expressed through access logs: one row per
//! (repository, session), with at most one unreleased row per repository.
//! The repository's reconciliation state is derived purely from the log's
//! timestamps.

pub mod error;
pub mod ledger;
pub mod types;

pub use error::AccessError;
pub use ledger::{derived_state, validate_possession};
pub use types::{AccessLog, RepositoryState};
