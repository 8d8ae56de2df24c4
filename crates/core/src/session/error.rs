//! Session error types.

use thiserror::Error;
use uuid::Uuid;

use cambio_shared::AppError;

use super::types::{FloatAction, SessionStatus};

/// Errors that can occur in the session state machine.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The action is not valid from the session's current status.
    #[error("Cannot apply action '{action}' from status '{from}'")]
    InvalidTransition {
        /// The status the session was in.
        from: SessionStatus,
        /// The attempted action.
        action: FloatAction,
    },

    /// The operation requires a different session status.
    #[error("Session is '{actual}', expected '{expected}'")]
    WrongStatus {
        /// The required status.
        expected: SessionStatus,
        /// The session's actual status.
        actual: SessionStatus,
    },

    /// Unconfirmed float stacks are blocking a confirmation.
    ///
    /// Carries the exact set of repository ids whose stacks still lack
    /// the matching confirmed timestamp.
    #[error("Repositories with unconfirmed float stacks: {0:?}")]
    UnconfirmedRepositories(Vec<Uuid>),

    /// The user is not an authorized member of the session.
    #[error("User {user_id} is not authorized for session {session_id}")]
    NotAuthorized {
        /// The offending user.
        user_id: Uuid,
        /// The session they tried to touch.
        session_id: Uuid,
    },

    /// The user already works another active session.
    #[error("User {user_id} already has an active session {active_session_id}")]
    AlreadyInSession {
        /// The user attempting to join.
        user_id: Uuid,
        /// The session they are already in.
        active_session_id: Uuid,
    },

    /// The session has reached its terminal status.
    #[error("Session {0} is closed")]
    SessionClosed(Uuid),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidTransition { .. }
            | SessionError::WrongStatus { .. }
            | SessionError::SessionClosed(_) => Self::Validation(err.to_string()),
            SessionError::UnconfirmedRepositories(ids) => Self::Consistency(ids),
            SessionError::NotAuthorized { .. } => Self::Forbidden(err.to_string()),
            SessionError::AlreadyInSession { .. } => Self::Conflict(err.to_string()),
        }
    }
}
