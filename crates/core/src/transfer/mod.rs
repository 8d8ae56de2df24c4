//! Inter-repository float transfers.
//!
//! A transfer moves a sum of one ticker between two repositories within
//! an open session. Unlike orders, transfers apply their breakdowns
//! immediately - there is no separate create/commit split.

pub mod error;
pub mod service;
pub mod types;

pub use error::TransferError;
pub use service::TransferService;
pub use types::{TransferAdjustment, TransferInput, TransferStatus};
