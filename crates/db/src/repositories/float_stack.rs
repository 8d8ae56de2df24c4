//! Float stack repository: count entry and per-repository confirmation.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use uuid::Uuid;

use cambio_core::float::{CountField, FloatPhase};
use cambio_core::session::SessionStateMachine;
use cambio_shared::{AppError, RequestContext};

use super::activity::{ActivityEvent, ActivityLogRepository};
use super::convert::stack_to_domain;
use super::{db_err, load_session_domain};
use crate::entities::{float_stacks, repository_access_logs};

/// One recorded count for one stack.
#[derive(Debug, Clone)]
pub struct CountEntry {
    /// The stack being counted.
    pub float_stack_id: Uuid,
    /// Which count the value belongs to.
    pub field: CountField,
    /// The counted number of units.
    pub value: Decimal,
    /// Spot rate captured alongside an open or close count, if any.
    pub spot: Option<Decimal>,
}

/// Float stack repository.
#[derive(Debug, Clone)]
pub struct FloatStackRepository {
    db: DatabaseConnection,
}

impl FloatStackRepository {
    /// Creates a new float stack repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records physical counts for a repository's stacks.
    ///
    /// Counts only - confirmation is the separate
    /// `confirm_repository_float`. Concurrent writers are not versioned;
    /// the last write wins per field.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` when a count is negative, the
    /// session status does not match the count field, or a stack does not
    /// belong to the given repository and session.
    pub async fn update_repository_float(
        &self,
        ctx: &RequestContext,
        repository_id: Uuid,
        session_id: Uuid,
        counts: &[CountEntry],
    ) -> Result<Vec<float_stacks::Model>, AppError> {
        let session = load_session_domain(&self.db, session_id).await?;
        SessionStateMachine::ensure_member(&session, ctx.user_id)?;
        for entry in counts {
            SessionStateMachine::validate_count_entry(session.status, entry.field)?;
        }

        let now = chrono::Utc::now().into();
        let txn = self.db.begin().await.map_err(db_err)?;
        let mut updated = Vec::with_capacity(counts.len());

        for entry in counts {
            let model = float_stacks::Entity::find_by_id(entry.float_stack_id)
                .one(&txn)
                .await
                .map_err(db_err)?
                .ok_or_else(|| {
                    AppError::NotFound(format!("float stack {}", entry.float_stack_id))
                })?;

            if model.session_id != session_id || model.repository_id != repository_id {
                return Err(AppError::Validation(format!(
                    "float stack {} does not belong to repository {repository_id} in session {session_id}",
                    entry.float_stack_id
                )));
            }

            // Route the value through the domain type so its validation
            // (non-negative, count-only semantics) applies.
            let mut stack = stack_to_domain(&model);
            stack.record_count(entry.field, entry.value)?;

            let mut active = float_stacks::ActiveModel {
                id: Set(model.id),
                open_count: Set(stack.open_count),
                close_count: Set(stack.close_count),
                midday_count: Set(stack.midday_count),
                updated_at: Set(now),
                ..Default::default()
            };
            match (entry.field, entry.spot) {
                (CountField::Open, Some(spot)) => active.open_spot = Set(Some(spot)),
                (CountField::Close, Some(spot)) => active.close_spot = Set(Some(spot)),
                _ => {}
            }

            updated.push(active.update(&txn).await.map_err(db_err)?);
        }

        txn.commit().await.map_err(db_err)?;
        Ok(updated)
    }

    /// Confirms a repository's counts for a phase.
    ///
    /// Stamps the confirmed timestamp on every stack of the repository
    /// within the session and mirrors the confirmation onto the
    /// repository's access log, which drives its derived state.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` when the session is not in the
    /// matching counting leg, `AppError::NotFound` when the repository
    /// has no stacks in the session.
    pub async fn confirm_repository_float(
        &self,
        ctx: &RequestContext,
        repository_id: Uuid,
        session_id: Uuid,
        phase: FloatPhase,
    ) -> Result<(), AppError> {
        let session = load_session_domain(&self.db, session_id).await?;
        SessionStateMachine::ensure_member(&session, ctx.user_id)?;
        // Confirmation happens during the same leg as counting.
        let field = match phase {
            FloatPhase::Open => CountField::Open,
            FloatPhase::Close => CountField::Close,
        };
        SessionStateMachine::validate_count_entry(session.status, field)?;

        let stacks = float_stacks::Entity::find()
            .filter(float_stacks::Column::SessionId.eq(session_id))
            .filter(float_stacks::Column::RepositoryId.eq(repository_id))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        if stacks.is_empty() {
            return Err(AppError::NotFound(format!(
                "no float stacks for repository {repository_id} in session {session_id}"
            )));
        }

        let now = chrono::Utc::now().into();
        let txn = self.db.begin().await.map_err(db_err)?;

        for stack in &stacks {
            let mut active = float_stacks::ActiveModel {
                id: Set(stack.id),
                updated_at: Set(now),
                ..Default::default()
            };
            match phase {
                FloatPhase::Open => {
                    active.open_confirmed_at = Set(Some(now));
                    active.open_confirmed_by = Set(Some(ctx.user_id));
                }
                FloatPhase::Close => {
                    active.close_confirmed_at = Set(Some(now));
                    active.close_confirmed_by = Set(Some(ctx.user_id));
                }
            }
            active.update(&txn).await.map_err(db_err)?;
        }

        let log = repository_access_logs::Entity::find()
            .filter(repository_access_logs::Column::RepositoryId.eq(repository_id))
            .filter(repository_access_logs::Column::SessionId.eq(session_id))
            .filter(repository_access_logs::Column::ReleasedAt.is_null())
            .one(&txn)
            .await
            .map_err(db_err)?;
        if let Some(log) = log {
            let mut active = repository_access_logs::ActiveModel {
                id: Set(log.id),
                ..Default::default()
            };
            match phase {
                FloatPhase::Open => {
                    active.open_confirmed_at = Set(Some(now));
                    active.open_confirmed_by = Set(Some(ctx.user_id));
                }
                FloatPhase::Close => {
                    active.close_confirmed_at = Set(Some(now));
                    active.close_confirmed_by = Set(Some(ctx.user_id));
                }
            }
            active.update(&txn).await.map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)?;

        let event = match phase {
            FloatPhase::Open => "float.repository.open_confirm",
            FloatPhase::Close => "float.repository.close_confirm",
        };
        ActivityLogRepository::new(self.db.clone())
            .record(
                ctx,
                ActivityEvent::session(event, session_id).with_reference(repository_id),
            )
            .await;

        Ok(())
    }
}
