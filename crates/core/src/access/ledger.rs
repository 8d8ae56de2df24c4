//! Derived repository state and possession rules.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::error::AccessError;
use super::types::{AccessLog, RepositoryState};

/// Derives a repository's reconciliation state from its access log.
///
/// Total over all timestamp combinations, with fixed precedence: a set
/// close-confirm wins over a set close-start, which wins over a set
/// open-confirm, which wins over a set open-start. A fully blank log is
/// dormant, and so is a fully closed-out one.
#[must_use]
pub fn derived_state(log: &AccessLog) -> RepositoryState {
    if log.close_confirmed_at.is_some() {
        RepositoryState::Dormant
    } else if log.close_started_at.is_some() {
        RepositoryState::CloseStart
    } else if log.open_confirmed_at.is_some() {
        RepositoryState::OpenConfirmed
    } else if log.open_started_at.is_some() {
        RepositoryState::OpenStart
    } else {
        RepositoryState::Dormant
    }
}

/// Validates that a repository can be possessed.
///
/// `existing` is the repository's current unreleased access log, if any.
///
/// # Errors
///
/// Returns `AccessError::AlreadyPossessed` if an unreleased log exists.
pub fn validate_possession(existing: Option<&AccessLog>) -> Result<(), AccessError> {
    match existing {
        Some(log) if log.is_held() => Err(AccessError::AlreadyPossessed {
            repository_id: log.repository_id,
            session_id: log.session_id,
        }),
        _ => Ok(()),
    }
}

impl AccessLog {
    /// Marks the start of open counting.
    pub fn start_open(&mut self, at: DateTime<Utc>, by: Uuid) {
        self.open_started_at = Some(at);
        self.open_started_by = Some(by);
    }

    /// Marks open counts confirmed.
    pub fn confirm_open(&mut self, at: DateTime<Utc>, by: Uuid) {
        self.open_confirmed_at = Some(at);
        self.open_confirmed_by = Some(by);
    }

    /// Marks the start of close counting.
    pub fn start_close(&mut self, at: DateTime<Utc>, by: Uuid) {
        self.close_started_at = Some(at);
        self.close_started_by = Some(by);
    }

    /// Clears the close-start markers when a close is cancelled.
    ///
    /// Float-stack counters are untouched; only the log reverts.
    pub fn cancel_close(&mut self) {
        self.close_started_at = None;
        self.close_started_by = None;
    }

    /// Marks close counts confirmed.
    pub fn confirm_close(&mut self, at: DateTime<Utc>, by: Uuid) {
        self.close_confirmed_at = Some(at);
        self.close_confirmed_by = Some(by);
    }

    /// Releases possession.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::AlreadyReleased` if the log was already
    /// released.
    pub fn release(&mut self, at: DateTime<Utc>) -> Result<(), AccessError> {
        if self.released_at.is_some() {
            return Err(AccessError::AlreadyReleased(self.id));
        }
        self.released_at = Some(at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_log() -> AccessLog {
        AccessLog::possess(Uuid::new_v4(), Uuid::new_v4(), Utc::now())
    }

    #[test]
    fn test_derived_state_blank_is_dormant() {
        assert_eq!(derived_state(&blank_log()), RepositoryState::Dormant);
    }

    #[test]
    fn test_derived_state_open_start() {
        let mut log = blank_log();
        log.start_open(Utc::now(), Uuid::new_v4());
        assert_eq!(derived_state(&log), RepositoryState::OpenStart);
    }

    #[test]
    fn test_derived_state_open_confirmed() {
        let mut log = blank_log();
        log.start_open(Utc::now(), Uuid::new_v4());
        log.confirm_open(Utc::now(), Uuid::new_v4());
        assert_eq!(derived_state(&log), RepositoryState::OpenConfirmed);
    }

    #[test]
    fn test_derived_state_close_start() {
        let mut log = blank_log();
        log.start_open(Utc::now(), Uuid::new_v4());
        log.confirm_open(Utc::now(), Uuid::new_v4());
        log.start_close(Utc::now(), Uuid::new_v4());
        assert_eq!(derived_state(&log), RepositoryState::CloseStart);
    }

    #[test]
    fn test_derived_state_all_set_is_dormant() {
        let user = Uuid::new_v4();
        let mut log = blank_log();
        log.start_open(Utc::now(), user);
        log.confirm_open(Utc::now(), user);
        log.start_close(Utc::now(), user);
        log.confirm_close(Utc::now(), user);
        assert_eq!(derived_state(&log), RepositoryState::Dormant);
    }

    #[test]
    fn test_derived_state_precedence_skips_missing_earlier_marks() {
        // Precedence is fixed: close-start wins even if open marks were
        // never set.
        let mut log = blank_log();
        log.start_close(Utc::now(), Uuid::new_v4());
        assert_eq!(derived_state(&log), RepositoryState::CloseStart);
    }

    #[test]
    fn test_cancel_close_reverts_to_open_confirmed() {
        let user = Uuid::new_v4();
        let mut log = blank_log();
        log.start_open(Utc::now(), user);
        log.confirm_open(Utc::now(), user);
        log.start_close(Utc::now(), user);

        log.cancel_close();
        assert_eq!(derived_state(&log), RepositoryState::OpenConfirmed);
        assert!(log.close_started_at.is_none());
        assert!(log.close_started_by.is_none());
    }

    #[test]
    fn test_validate_possession_free_repository() {
        assert!(validate_possession(None).is_ok());
    }

    #[test]
    fn test_validate_possession_held_repository() {
        let log = blank_log();
        let result = validate_possession(Some(&log));
        assert!(matches!(result, Err(AccessError::AlreadyPossessed { .. })));
    }

    #[test]
    fn test_validate_possession_released_repository() {
        let mut log = blank_log();
        log.release(Utc::now()).unwrap();
        assert!(validate_possession(Some(&log)).is_ok());
    }

    #[test]
    fn test_release_twice_fails() {
        let mut log = blank_log();
        log.release(Utc::now()).unwrap();
        let result = log.release(Utc::now());
        assert!(matches!(result, Err(AccessError::AlreadyReleased(_))));
    }
}
