//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Every mutating operation takes an explicit
//! `RequestContext` and runs inside one database transaction.

pub mod activity;
pub mod breakdown;
mod convert;
pub mod float_stack;
pub mod session;
pub mod transfer;

pub use activity::{ActivityEvent, ActivityLogRepository};
pub use breakdown::BreakdownRepository;
pub use float_stack::{CountEntry, FloatStackRepository};
pub use session::{RepositoryFloat, SessionFloat, SessionFloatRepository, TickerFloat};
pub use transfer::TransferRepository;

use cambio_core::session::CxSession;
use cambio_shared::AppError;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entities::{cx_sessions, session_members};

/// Maps a database error into the application taxonomy.
pub(crate) fn db_err(err: DbErr) -> AppError {
    AppError::Database(err.to_string())
}

/// Loads a session with its active membership as a core domain value.
pub(crate) async fn load_session_domain<C: ConnectionTrait>(
    conn: &C,
    session_id: Uuid,
) -> Result<CxSession, AppError> {
    let model = cx_sessions::Entity::find_by_id(session_id)
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| AppError::NotFound(format!("session {session_id}")))?;

    let members = session_members::Entity::find()
        .filter(session_members::Column::SessionId.eq(session_id))
        .filter(session_members::Column::LeftAt.is_null())
        .all(conn)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(|m| m.user_id)
        .collect();

    convert::session_to_domain(&model, members)
}
