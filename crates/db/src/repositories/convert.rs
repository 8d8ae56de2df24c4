//! Conversions between entity models and core domain types.

use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

use cambio_core::access::AccessLog;
use cambio_core::breakdown::{
    BreakableKind, BreakableRef, BreakdownRow, BreakdownStatus, Direction,
};
use cambio_core::float::FloatStack;
use cambio_core::session::{CxSession, SessionStatus};
use cambio_shared::AppError;

use crate::entities::{breakdowns, cx_sessions, float_stacks, repository_access_logs};

pub(crate) fn utc(dt: DateTimeWithTimeZone) -> DateTime<Utc> {
    dt.with_timezone(&Utc)
}

pub(crate) fn utc_opt(dt: Option<DateTimeWithTimeZone>) -> Option<DateTime<Utc>> {
    dt.map(utc)
}

/// Parses a persisted status string, treating unknown values as data
/// corruption rather than user error.
fn parse_or_internal<T>(parsed: Option<T>, what: &str, raw: &str) -> Result<T, AppError> {
    parsed.ok_or_else(|| AppError::Internal(format!("unknown {what} '{raw}' in database")))
}

pub(crate) fn session_to_domain(
    model: &cx_sessions::Model,
    authorized_user_ids: Vec<Uuid>,
) -> Result<CxSession, AppError> {
    Ok(CxSession {
        id: model.id,
        organization_id: model.organization_id,
        user_id: model.user_id,
        status: parse_or_internal(
            SessionStatus::parse(&model.status),
            "session status",
            &model.status,
        )?,
        open_started_at: utc_opt(model.open_started_at),
        open_started_by: model.open_started_by,
        open_confirmed_at: utc_opt(model.open_confirmed_at),
        open_confirmed_by: model.open_confirmed_by,
        close_started_at: utc_opt(model.close_started_at),
        close_started_by: model.close_started_by,
        close_confirmed_at: utc_opt(model.close_confirmed_at),
        close_confirmed_by: model.close_confirmed_by,
        authorized_user_ids,
    })
}

pub(crate) fn stack_to_domain(model: &float_stacks::Model) -> FloatStack {
    FloatStack {
        id: model.id,
        session_id: model.session_id,
        repository_id: model.repository_id,
        denomination_id: model.denomination_id,
        ticker: model.ticker.clone(),
        denominated_value: model.denominated_value,
        open_count: model.open_count,
        close_count: model.close_count,
        midday_count: model.midday_count,
        last_session_count: model.last_session_count,
        spent_during_session: model.spent_during_session,
        transferred_during_session: model.transferred_during_session,
        open_spot: model.open_spot,
        close_spot: model.close_spot,
        open_confirmed_at: utc_opt(model.open_confirmed_at),
        close_confirmed_at: utc_opt(model.close_confirmed_at),
        previous_session_float_stack_id: model.previous_session_float_stack_id,
    }
}

pub(crate) fn access_log_to_domain(model: &repository_access_logs::Model) -> AccessLog {
    AccessLog {
        id: model.id,
        repository_id: model.repository_id,
        session_id: model.session_id,
        possessed_at: utc(model.possessed_at),
        released_at: utc_opt(model.released_at),
        open_started_at: utc_opt(model.open_started_at),
        open_started_by: model.open_started_by,
        open_confirmed_at: utc_opt(model.open_confirmed_at),
        open_confirmed_by: model.open_confirmed_by,
        close_started_at: utc_opt(model.close_started_at),
        close_started_by: model.close_started_by,
        close_confirmed_at: utc_opt(model.close_confirmed_at),
        close_confirmed_by: model.close_confirmed_by,
    }
}

pub(crate) fn breakdown_to_domain(model: &breakdowns::Model) -> Result<BreakdownRow, AppError> {
    Ok(BreakdownRow {
        id: model.id,
        breakable: BreakableRef::new(
            parse_or_internal(
                BreakableKind::parse(&model.breakable_kind),
                "breakable kind",
                &model.breakable_kind,
            )?,
            model.breakable_id,
        ),
        float_stack_id: model.float_stack_id,
        denomination_id: model.denomination_id,
        count: model.count,
        direction: parse_or_internal(
            Direction::parse(&model.direction),
            "breakdown direction",
            &model.direction,
        )?,
        denominated_value: model.denominated_value,
        status: parse_or_internal(
            BreakdownStatus::parse(&model.status),
            "breakdown status",
            &model.status,
        )?,
    })
}
