//! The session lifecycle state machine.
//!
//! All transitions are pure functions over (status, action); persistence
//! applies the returned status together with the matching timestamps
//! inside one database transaction.

use uuid::Uuid;

use super::error::SessionError;
use super::types::{CxSession, FloatAction, SessionStatus};
use crate::float::{CountField, FloatPhase, FloatStack};

/// Stateless engine for session lifecycle decisions.
pub struct SessionStateMachine;

impl SessionStateMachine {
    /// The start transition: begins a reconciliation leg or abandons a
    /// started close.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` for any (status, action)
    /// pair outside the transition table.
    pub fn start(
        status: SessionStatus,
        action: FloatAction,
    ) -> Result<SessionStatus, SessionError> {
        match (status, action) {
            (SessionStatus::Dormant, FloatAction::Open) => Ok(SessionStatus::FloatOpenStart),
            (SessionStatus::FloatOpenComplete, FloatAction::Close) => {
                Ok(SessionStatus::FloatCloseStart)
            }
            (SessionStatus::FloatCloseStart, FloatAction::CancelClose) => {
                Ok(SessionStatus::FloatOpenComplete)
            }
            (from, action) => Err(SessionError::InvalidTransition { from, action }),
        }
    }

    /// The confirm transition: records that a leg's counts are confirmed.
    ///
    /// The caller must have verified stack confirmations first (see
    /// `check_confirmations`).
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` for any (status, action)
    /// pair outside the transition table.
    pub fn confirm(
        status: SessionStatus,
        action: FloatAction,
    ) -> Result<SessionStatus, SessionError> {
        match (status, action) {
            (SessionStatus::FloatOpenStart, FloatAction::Open) => {
                Ok(SessionStatus::FloatOpenConfirm)
            }
            (SessionStatus::FloatCloseStart, FloatAction::Close) => {
                Ok(SessionStatus::FloatCloseConfirm)
            }
            (from, action) => Err(SessionError::InvalidTransition { from, action }),
        }
    }

    /// The complete transition: finishes a confirmed leg.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::WrongStatus` when the leg has not been
    /// confirmed.
    pub fn complete(
        status: SessionStatus,
        phase: FloatPhase,
    ) -> Result<SessionStatus, SessionError> {
        match (status, phase) {
            (SessionStatus::FloatOpenConfirm, FloatPhase::Open) => {
                Ok(SessionStatus::FloatOpenComplete)
            }
            (SessionStatus::FloatCloseConfirm, FloatPhase::Close) => {
                Ok(SessionStatus::FloatCloseComplete)
            }
            (actual, FloatPhase::Open) => Err(SessionError::WrongStatus {
                expected: SessionStatus::FloatOpenConfirm,
                actual,
            }),
            (actual, FloatPhase::Close) => Err(SessionError::WrongStatus {
                expected: SessionStatus::FloatCloseConfirm,
                actual,
            }),
        }
    }

    /// The finalize transition: ends the session after close completes.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::WrongStatus` unless the close leg is
    /// complete.
    pub fn finalize(status: SessionStatus) -> Result<SessionStatus, SessionError> {
        match status {
            SessionStatus::FloatCloseComplete => Ok(SessionStatus::Closed),
            actual => Err(SessionError::WrongStatus {
                expected: SessionStatus::FloatCloseComplete,
                actual,
            }),
        }
    }

    /// Verifies that every stack carries the confirmed timestamp for a
    /// phase.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnconfirmedRepositories` carrying the
    /// deduplicated, sorted set of repository ids whose stacks are still
    /// unconfirmed.
    pub fn check_confirmations(
        stacks: &[FloatStack],
        phase: FloatPhase,
    ) -> Result<(), SessionError> {
        let mut blocking: Vec<Uuid> = stacks
            .iter()
            .filter(|s| !s.is_confirmed(phase))
            .map(|s| s.repository_id)
            .collect();
        blocking.sort_unstable();
        blocking.dedup();

        if blocking.is_empty() {
            Ok(())
        } else {
            Err(SessionError::UnconfirmedRepositories(blocking))
        }
    }

    /// Verifies that a user is an authorized member of the session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotAuthorized` otherwise.
    pub fn ensure_member(session: &CxSession, user_id: Uuid) -> Result<(), SessionError> {
        if session.is_member(user_id) {
            Ok(())
        } else {
            Err(SessionError::NotAuthorized {
                user_id,
                session_id: session.id,
            })
        }
    }

    /// Verifies that the session is trading (float open and not closing).
    ///
    /// # Errors
    ///
    /// Returns `SessionError::WrongStatus` otherwise.
    pub fn ensure_trading(status: SessionStatus) -> Result<(), SessionError> {
        if status.is_trading() {
            Ok(())
        } else {
            Err(SessionError::WrongStatus {
                expected: SessionStatus::FloatOpenComplete,
                actual: status,
            })
        }
    }

    /// Verifies that a user may join a session.
    ///
    /// `active_session_id` is the session the user currently points at,
    /// if any; a user holds at most one such pointer.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SessionClosed` for a terminal session or
    /// `SessionError::AlreadyInSession` when the user works another one.
    pub fn validate_join(
        session: &CxSession,
        user_id: Uuid,
        active_session_id: Option<Uuid>,
    ) -> Result<(), SessionError> {
        if session.status.is_terminal() {
            return Err(SessionError::SessionClosed(session.id));
        }
        match active_session_id {
            Some(active) if active != session.id => Err(SessionError::AlreadyInSession {
                user_id,
                active_session_id: active,
            }),
            _ => Ok(()),
        }
    }

    /// Verifies that a count field may be recorded in the session's
    /// current status.
    ///
    /// Open counts belong to the open leg, close counts to the close leg,
    /// and midday spot checks to the trading window in between.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::WrongStatus` otherwise.
    pub fn validate_count_entry(
        status: SessionStatus,
        field: CountField,
    ) -> Result<(), SessionError> {
        let expected = match field {
            CountField::Open => SessionStatus::FloatOpenStart,
            CountField::Close => SessionStatus::FloatCloseStart,
            CountField::Midday => SessionStatus::FloatOpenComplete,
        };
        if status == expected {
            Ok(())
        } else {
            Err(SessionError::WrongStatus {
                expected,
                actual: status,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use crate::float::Denomination;

    fn stack_for_repo(repository_id: Uuid, confirmed_open: bool) -> FloatStack {
        let denom = Denomination {
            id: Uuid::new_v4(),
            ticker: "USD".to_string(),
            value: dec!(20),
            accepted: true,
        };
        let mut stack =
            FloatStack::open(Uuid::new_v4(), repository_id, &denom, None).unwrap();
        if confirmed_open {
            stack.confirm(FloatPhase::Open, Utc::now());
        }
        stack
    }

    #[rstest]
    #[case(SessionStatus::Dormant, FloatAction::Open, SessionStatus::FloatOpenStart)]
    #[case(
        SessionStatus::FloatOpenComplete,
        FloatAction::Close,
        SessionStatus::FloatCloseStart
    )]
    #[case(
        SessionStatus::FloatCloseStart,
        FloatAction::CancelClose,
        SessionStatus::FloatOpenComplete
    )]
    fn test_start_transitions(
        #[case] from: SessionStatus,
        #[case] action: FloatAction,
        #[case] expected: SessionStatus,
    ) {
        assert_eq!(SessionStateMachine::start(from, action).unwrap(), expected);
    }

    #[rstest]
    #[case(SessionStatus::Dormant, FloatAction::Close)]
    #[case(SessionStatus::Dormant, FloatAction::CancelClose)]
    #[case(SessionStatus::FloatOpenStart, FloatAction::Open)]
    #[case(SessionStatus::FloatOpenComplete, FloatAction::Open)]
    #[case(SessionStatus::Closed, FloatAction::Close)]
    fn test_start_invalid_transitions(#[case] from: SessionStatus, #[case] action: FloatAction) {
        assert!(matches!(
            SessionStateMachine::start(from, action),
            Err(SessionError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_confirm_transitions() {
        assert_eq!(
            SessionStateMachine::confirm(SessionStatus::FloatOpenStart, FloatAction::Open)
                .unwrap(),
            SessionStatus::FloatOpenConfirm
        );
        assert_eq!(
            SessionStateMachine::confirm(SessionStatus::FloatCloseStart, FloatAction::Close)
                .unwrap(),
            SessionStatus::FloatCloseConfirm
        );
        assert!(matches!(
            SessionStateMachine::confirm(SessionStatus::Dormant, FloatAction::Open),
            Err(SessionError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_complete_transitions() {
        assert_eq!(
            SessionStateMachine::complete(SessionStatus::FloatOpenConfirm, FloatPhase::Open)
                .unwrap(),
            SessionStatus::FloatOpenComplete
        );
        assert_eq!(
            SessionStateMachine::complete(SessionStatus::FloatCloseConfirm, FloatPhase::Close)
                .unwrap(),
            SessionStatus::FloatCloseComplete
        );
        assert!(matches!(
            SessionStateMachine::complete(SessionStatus::FloatOpenStart, FloatPhase::Open),
            Err(SessionError::WrongStatus { .. })
        ));
    }

    #[test]
    fn test_finalize() {
        assert_eq!(
            SessionStateMachine::finalize(SessionStatus::FloatCloseComplete).unwrap(),
            SessionStatus::Closed
        );
        assert!(matches!(
            SessionStateMachine::finalize(SessionStatus::FloatOpenComplete),
            Err(SessionError::WrongStatus { .. })
        ));
    }

    #[test]
    fn test_full_lifecycle_path() {
        let mut status = SessionStatus::Dormant;
        status = SessionStateMachine::start(status, FloatAction::Open).unwrap();
        status = SessionStateMachine::confirm(status, FloatAction::Open).unwrap();
        status = SessionStateMachine::complete(status, FloatPhase::Open).unwrap();
        status = SessionStateMachine::start(status, FloatAction::Close).unwrap();
        status = SessionStateMachine::confirm(status, FloatAction::Close).unwrap();
        status = SessionStateMachine::complete(status, FloatPhase::Close).unwrap();
        status = SessionStateMachine::finalize(status).unwrap();
        assert_eq!(status, SessionStatus::Closed);
    }

    #[test]
    fn test_cancel_close_round_trip() {
        let mut status = SessionStatus::FloatOpenComplete;
        status = SessionStateMachine::start(status, FloatAction::Close).unwrap();
        status = SessionStateMachine::start(status, FloatAction::CancelClose).unwrap();
        assert_eq!(status, SessionStatus::FloatOpenComplete);
    }

    #[test]
    fn test_check_confirmations_lists_blocking_repositories() {
        let till = Uuid::new_v4();
        let vault = Uuid::new_v4();
        let stacks = vec![
            stack_for_repo(till, true),
            stack_for_repo(till, false),
            stack_for_repo(till, false),
            stack_for_repo(vault, true),
        ];

        let result = SessionStateMachine::check_confirmations(&stacks, FloatPhase::Open);
        match result {
            Err(SessionError::UnconfirmedRepositories(ids)) => {
                // The unconfirmed till appears exactly once; the fully
                // confirmed vault does not appear.
                assert_eq!(ids, vec![till]);
            }
            other => panic!("expected UnconfirmedRepositories, got {other:?}"),
        }
    }

    #[test]
    fn test_check_confirmations_all_confirmed() {
        let stacks = vec![
            stack_for_repo(Uuid::new_v4(), true),
            stack_for_repo(Uuid::new_v4(), true),
        ];
        assert!(SessionStateMachine::check_confirmations(&stacks, FloatPhase::Open).is_ok());
    }

    #[test]
    fn test_check_confirmations_close_phase_independent() {
        // Open confirmations say nothing about the close leg.
        let stacks = vec![stack_for_repo(Uuid::new_v4(), true)];
        assert!(matches!(
            SessionStateMachine::check_confirmations(&stacks, FloatPhase::Close),
            Err(SessionError::UnconfirmedRepositories(_))
        ));
    }

    #[test]
    fn test_ensure_member() {
        let org = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let outsider = Uuid::new_v4();
        let session = CxSession::new(org, owner);

        assert!(SessionStateMachine::ensure_member(&session, owner).is_ok());
        assert!(matches!(
            SessionStateMachine::ensure_member(&session, outsider),
            Err(SessionError::NotAuthorized { .. })
        ));
    }

    #[test]
    fn test_validate_join_rules() {
        let session = CxSession::new(Uuid::new_v4(), Uuid::new_v4());
        let user = Uuid::new_v4();

        assert!(SessionStateMachine::validate_join(&session, user, None).is_ok());
        // Re-joining the session you already point at is fine.
        assert!(SessionStateMachine::validate_join(&session, user, Some(session.id)).is_ok());

        let elsewhere = Uuid::new_v4();
        assert!(matches!(
            SessionStateMachine::validate_join(&session, user, Some(elsewhere)),
            Err(SessionError::AlreadyInSession { .. })
        ));

        let mut closed = CxSession::new(Uuid::new_v4(), Uuid::new_v4());
        closed.status = SessionStatus::Closed;
        assert!(matches!(
            SessionStateMachine::validate_join(&closed, user, None),
            Err(SessionError::SessionClosed(_))
        ));
    }

    #[rstest]
    #[case(CountField::Open, SessionStatus::FloatOpenStart, true)]
    #[case(CountField::Open, SessionStatus::FloatOpenComplete, false)]
    #[case(CountField::Close, SessionStatus::FloatCloseStart, true)]
    #[case(CountField::Close, SessionStatus::FloatOpenStart, false)]
    #[case(CountField::Midday, SessionStatus::FloatOpenComplete, true)]
    #[case(CountField::Midday, SessionStatus::FloatCloseStart, false)]
    fn test_validate_count_entry(
        #[case] field: CountField,
        #[case] status: SessionStatus,
        #[case] ok: bool,
    ) {
        assert_eq!(
            SessionStateMachine::validate_count_entry(status, field).is_ok(),
            ok
        );
    }

    #[test]
    fn test_ensure_trading() {
        assert!(SessionStateMachine::ensure_trading(SessionStatus::FloatOpenComplete).is_ok());
        assert!(matches!(
            SessionStateMachine::ensure_trading(SessionStatus::FloatCloseStart),
            Err(SessionError::WrongStatus { .. })
        ));
    }
}
