//! Access ledger domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reconciliation state of a repository, derived from its open access log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepositoryState {
    /// Not currently in a reconciliation phase.
    Dormant,
    /// Open counting has started.
    OpenStart,
    /// Open counts are confirmed; the repository is trading.
    OpenConfirmed,
    /// Close counting has started.
    CloseStart,
}

impl RepositoryState {
    /// Returns the string representation of the state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Dormant => "dormant",
            Self::OpenStart => "open_start",
            Self::OpenConfirmed => "open_confirmed",
            Self::CloseStart => "close_start",
        }
    }
}

/// Possession record for one repository within one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessLog {
    /// Unique identifier.
    pub id: Uuid,
    /// The possessed repository.
    pub repository_id: Uuid,
    /// The possessing session.
    pub session_id: Uuid,
    /// When possession was taken.
    pub possessed_at: DateTime<Utc>,
    /// When possession was released; `None` while held.
    pub released_at: Option<DateTime<Utc>>,
    /// When open counting started.
    pub open_started_at: Option<DateTime<Utc>>,
    /// Who started open counting.
    pub open_started_by: Option<Uuid>,
    /// When open counts were confirmed.
    pub open_confirmed_at: Option<DateTime<Utc>>,
    /// Who confirmed open counts.
    pub open_confirmed_by: Option<Uuid>,
    /// When close counting started.
    pub close_started_at: Option<DateTime<Utc>>,
    /// Who started close counting.
    pub close_started_by: Option<Uuid>,
    /// When close counts were confirmed.
    pub close_confirmed_at: Option<DateTime<Utc>>,
    /// Who confirmed close counts.
    pub close_confirmed_by: Option<Uuid>,
}

impl AccessLog {
    /// Creates a possession record for a repository and session.
    #[must_use]
    pub fn possess(repository_id: Uuid, session_id: Uuid, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            repository_id,
            session_id,
            possessed_at: at,
            released_at: None,
            open_started_at: None,
            open_started_by: None,
            open_confirmed_at: None,
            open_confirmed_by: None,
            close_started_at: None,
            close_started_by: None,
            close_confirmed_at: None,
            close_confirmed_by: None,
        }
    }

    /// Returns whether possession is still held.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.released_at.is_none()
    }
}
