//! Float stack domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which physical count a user is recording on a stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountField {
    /// The count taken when the session's float is opened.
    Open,
    /// The count taken when the session's float is closed.
    Close,
    /// An optional spot-check count taken mid-session.
    Midday,
}

/// The two reconciliation phases of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatPhase {
    /// Opening reconciliation.
    Open,
    /// Closing reconciliation.
    Close,
}

/// A currency denomination - read-only reference data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denomination {
    /// Unique identifier.
    pub id: Uuid,
    /// Ticker of the currency this denomination belongs to (e.g. "USD").
    pub ticker: String,
    /// Face value of one unit of this denomination.
    pub value: Decimal,
    /// Whether the organization accepts this denomination.
    pub accepted: bool,
}

/// The per-denomination counter for one repository within one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatStack {
    /// Unique identifier.
    pub id: Uuid,
    /// The session this stack belongs to.
    pub session_id: Uuid,
    /// The repository holding the physical units.
    pub repository_id: Uuid,
    /// The denomination being counted.
    pub denomination_id: Uuid,
    /// Ticker of the denomination's currency.
    pub ticker: String,
    /// Face value of one unit.
    pub denominated_value: Decimal,
    /// Units counted at float open.
    pub open_count: Decimal,
    /// Units counted at float close.
    pub close_count: Decimal,
    /// Units counted at the optional midday spot check.
    pub midday_count: Decimal,
    /// The predecessor stack's close count, carried forward as the
    /// expected opening position.
    pub last_session_count: Decimal,
    /// Net units consumed by committed breakdowns this session.
    pub spent_during_session: Decimal,
    /// Net units moved out by transfers this session.
    pub transferred_during_session: Decimal,
    /// Spot rate captured at open, if any.
    pub open_spot: Option<Decimal>,
    /// Spot rate captured at close, if any.
    pub close_spot: Option<Decimal>,
    /// When the open count was confirmed.
    pub open_confirmed_at: Option<DateTime<Utc>>,
    /// When the close count was confirmed.
    pub close_confirmed_at: Option<DateTime<Utc>>,
    /// Lineage link to the equivalent stack in the prior session.
    pub previous_session_float_stack_id: Option<Uuid>,
}
