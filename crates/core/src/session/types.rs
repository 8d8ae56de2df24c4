//! Session domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a trading session.
///
/// The open leg mirrors the close leg: counting starts, counts are
/// confirmed per repository, and the leg completes. Only the state
/// machine's transitions move a session between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Created but float opening has not started.
    Dormant,
    /// Open counting is in progress.
    FloatOpenStart,
    /// Open counts confirmed; completion pending.
    FloatOpenConfirm,
    /// The float is open; trading may proceed.
    FloatOpenComplete,
    /// Close counting is in progress.
    FloatCloseStart,
    /// Close counts confirmed; completion pending.
    FloatCloseConfirm,
    /// The float is closed and reconciled.
    FloatCloseComplete,
    /// The session is finished; repositories are released.
    Closed,
}

impl SessionStatus {
    /// Parses a status from its string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "dormant" => Some(Self::Dormant),
            "float_open_start" => Some(Self::FloatOpenStart),
            "float_open_confirm" => Some(Self::FloatOpenConfirm),
            "float_open_complete" => Some(Self::FloatOpenComplete),
            "float_close_start" => Some(Self::FloatCloseStart),
            "float_close_confirm" => Some(Self::FloatCloseConfirm),
            "float_close_complete" => Some(Self::FloatCloseComplete),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Dormant => "dormant",
            Self::FloatOpenStart => "float_open_start",
            Self::FloatOpenConfirm => "float_open_confirm",
            Self::FloatOpenComplete => "float_open_complete",
            Self::FloatCloseStart => "float_close_start",
            Self::FloatCloseConfirm => "float_close_confirm",
            Self::FloatCloseComplete => "float_close_complete",
            Self::Closed => "closed",
        }
    }

    /// Returns whether the session is trading (float open, not closing).
    #[must_use]
    pub fn is_trading(&self) -> bool {
        matches!(self, Self::FloatOpenComplete)
    }

    /// Returns whether the session has reached a terminal status.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The action driving a start or confirm transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloatAction {
    /// Begin (or confirm) the opening reconciliation.
    Open,
    /// Begin (or confirm) the closing reconciliation.
    Close,
    /// Abandon a started close and return to trading.
    CancelClose,
}

impl FloatAction {
    /// Parses an action from its string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "open" => Some(Self::Open),
            "close" => Some(Self::Close),
            "cancel_close" => Some(Self::CancelClose),
            _ => None,
        }
    }

    /// Returns the string representation of the action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::CancelClose => "cancel_close",
        }
    }
}

impl std::fmt::Display for FloatAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trading session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CxSession {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// The user who created the session.
    pub user_id: Uuid,
    /// Lifecycle status.
    pub status: SessionStatus,
    /// When open counting started, and by whom.
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
    /// Users authorized to work this session.
    pub authorized_user_ids: Vec<Uuid>,
}

impl CxSession {
    /// Creates a dormant session with the creator as its first member.
    #[must_use]
    pub fn new(organization_id: Uuid, user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            organization_id,
            user_id,
            status: SessionStatus::Dormant,
            open_started_at: None,
            open_started_by: None,
            open_confirmed_at: None,
            open_confirmed_by: None,
            close_started_at: None,
            close_started_by: None,
            close_confirmed_at: None,
            close_confirmed_by: None,
            authorized_user_ids: vec![user_id],
        }
    }

    /// Returns whether a user is authorized to work this session.
    #[must_use]
    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.authorized_user_ids.contains(&user_id)
    }
}
