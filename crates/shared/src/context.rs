//! Request context carrying the acting identity.
//!
//! Identity is supplied by an external auth layer and passed explicitly
//! into every service call. Nothing in the engine re-derives it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The identity on whose behalf an operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting user.
    pub user_id: Uuid,
    /// The organization the user is acting within.
    pub organization_id: Uuid,
}

impl RequestContext {
    /// Creates a new request context.
    #[must_use]
    pub const fn new(user_id: Uuid, organization_id: Uuid) -> Self {
        Self {
            user_id,
            organization_id,
        }
    }
}
