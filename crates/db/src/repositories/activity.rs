//! Best-effort activity log sink.
//!
//! The append contract: an activity row is written for every notable
//! operation, but a failing append must never fail or roll back the
//! primary operation - it is logged at WARN and swallowed.

use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::Value;
use uuid::Uuid;

use cambio_shared::{AppError, RequestContext};

use super::db_err;
use crate::entities::activity_logs;

/// One activity event to append.
#[derive(Debug, Clone)]
pub struct ActivityEvent {
    /// Event name, e.g. `float.open.start`.
    pub event: &'static str,
    /// The session the event belongs to, if any.
    pub session_id: Option<Uuid>,
    /// A related entity (transfer, breakdown, repository), if any.
    pub reference_id: Option<Uuid>,
    /// Free-form operator comment.
    pub comment: Option<String>,
    /// Structured metadata.
    pub meta: Option<Value>,
}

impl ActivityEvent {
    /// Creates an event for a session.
    #[must_use]
    pub fn session(event: &'static str, session_id: Uuid) -> Self {
        Self {
            event,
            session_id: Some(session_id),
            reference_id: None,
            comment: None,
            meta: None,
        }
    }

    /// Attaches a reference entity id.
    #[must_use]
    pub fn with_reference(mut self, reference_id: Uuid) -> Self {
        self.reference_id = Some(reference_id);
        self
    }

    /// Attaches structured metadata.
    #[must_use]
    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Append-only activity log repository.
#[derive(Debug, Clone)]
pub struct ActivityLogRepository {
    db: DatabaseConnection,
}

impl ActivityLogRepository {
    /// Creates a new activity log repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Appends an activity row.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails. Most callers want `record`
    /// instead, which honors the best-effort contract.
    pub async fn append(
        &self,
        ctx: &RequestContext,
        event: ActivityEvent,
    ) -> Result<activity_logs::Model, AppError> {
        let now = chrono::Utc::now().into();

        let row = activity_logs::ActiveModel {
            id: Set(Uuid::new_v4()),
            event: Set(event.event.to_string()),
            user_id: Set(ctx.user_id),
            organization_id: Set(ctx.organization_id),
            session_id: Set(event.session_id),
            reference_id: Set(event.reference_id),
            comment: Set(event.comment),
            meta: Set(event.meta),
            created_at: Set(now),
        };

        row.insert(&self.db).await.map_err(db_err)
    }

    /// Appends an activity row, swallowing any failure.
    ///
    /// The primary operation has already committed by the time this runs;
    /// a sink failure is observability loss, not a correctness problem.
    pub async fn record(&self, ctx: &RequestContext, event: ActivityEvent) {
        let name = event.event;
        if let Err(err) = self.append(ctx, event).await {
            tracing::warn!(event = name, error = %err, "activity log append failed");
        }
    }
}
