//! Access ledger error types.

use thiserror::Error;
use uuid::Uuid;

use cambio_shared::AppError;

/// Errors that can occur in the repository access ledger.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The repository is already possessed by an unreleased session.
    #[error("Repository {repository_id} is already possessed by session {session_id}")]
    AlreadyPossessed {
        /// The contested repository.
        repository_id: Uuid,
        /// The session currently holding it.
        session_id: Uuid,
    },

    /// The access log has already been released.
    #[error("Access log {0} is already released")]
    AlreadyReleased(Uuid),
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::AlreadyPossessed { .. } => Self::Conflict(err.to_string()),
            AccessError::AlreadyReleased(_) => Self::Validation(err.to_string()),
        }
    }
}
