//! Breakdown repository: staging, creation, and the commit lifecycle.
//!
//! COMMIT and UNCOMMIT adjust float-stack counters and therefore run as
//! one database transaction per breakable - a crash or concurrent retry
//! can never leave a breakable half-applied.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use cambio_core::allocation::{AllocationRequest, DenominationAllocator, StagedBreakdown};
use cambio_core::breakdown::{
    BreakableRef, BreakdownIntention, BreakdownLedger, BreakdownPlan, BreakdownRow,
    BreakdownStatus, Direction,
};
use cambio_core::float::FloatStack;
use cambio_core::session::SessionStateMachine;
use cambio_shared::{AppError, RequestContext};

use super::activity::{ActivityEvent, ActivityLogRepository};
use super::convert::{breakdown_to_domain, stack_to_domain};
use super::{db_err, load_session_domain};
use crate::entities::{breakdowns, float_stacks};

/// Breakdown repository.
#[derive(Debug, Clone)]
pub struct BreakdownRepository {
    db: DatabaseConnection,
}

impl BreakdownRepository {
    /// Creates a new breakdown repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Stages a breakdown of `request.target_sum` against the session's
    /// float for one ticker. Nothing is written; the staged rows feed the
    /// CREATE intention.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InsufficientFloat` when the target exceeds
    /// availability - before any row is written or stack touched.
    pub async fn allocate(
        &self,
        ctx: &RequestContext,
        session_id: Uuid,
        ticker: &str,
        request: &AllocationRequest,
    ) -> Result<Vec<StagedBreakdown>, AppError> {
        let session = load_session_domain(&self.db, session_id).await?;
        SessionStateMachine::ensure_member(&session, ctx.user_id)?;
        SessionStateMachine::ensure_trading(session.status)?;

        let stacks: Vec<FloatStack> = float_stacks::Entity::find()
            .filter(float_stacks::Column::SessionId.eq(session_id))
            .filter(float_stacks::Column::Ticker.eq(ticker))
            .all(&self.db)
            .await
            .map_err(db_err)?
            .iter()
            .map(stack_to_domain)
            .collect();

        Ok(DenominationAllocator::allocate(&stacks, request)?)
    }

    /// Applies an intention to a breakable's rows.
    ///
    /// `staged` is only read by the CREATE intention, which replaces any
    /// existing rows with the staged ones; the other intentions operate
    /// on the persisted rows.
    ///
    /// # Errors
    ///
    /// Returns the mapped core error; the transaction rolls back and
    /// nothing is persisted.
    pub async fn apply(
        &self,
        ctx: &RequestContext,
        breakable: BreakableRef,
        intention: BreakdownIntention,
        staged: &[StagedBreakdown],
    ) -> Result<(), AppError> {
        match intention {
            BreakdownIntention::Create => self.create(ctx, breakable, staged).await?,
            BreakdownIntention::Commit => self.commit(ctx, breakable).await?,
            BreakdownIntention::Uncommit => self.uncommit(ctx, breakable).await?,
            BreakdownIntention::Delete => self.delete(ctx, breakable).await?,
        }

        let event = match intention {
            BreakdownIntention::Create => "breakdown.create",
            BreakdownIntention::Commit => "breakdown.commit",
            BreakdownIntention::Uncommit => "breakdown.uncommit",
            BreakdownIntention::Delete => "breakdown.delete",
        };
        ActivityLogRepository::new(self.db.clone())
            .record(
                ctx,
                ActivityEvent {
                    event,
                    session_id: None,
                    reference_id: Some(breakable.id),
                    comment: None,
                    meta: Some(serde_json::json!({ "kind": breakable.kind.as_str() })),
                },
            )
            .await;

        Ok(())
    }

    /// Verifies the coverage invariant for a breakable: its live rows of
    /// one direction must sum to the entity's target for that direction.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` on a mismatch.
    pub async fn verify_coverage(
        &self,
        breakable: BreakableRef,
        direction: Direction,
        target: rust_decimal::Decimal,
    ) -> Result<(), AppError> {
        let rows = Self::load_rows_on(&self.db, breakable).await?;
        BreakdownLedger::validate_coverage(breakable, &rows, direction, target)?;
        Ok(())
    }

    // ========== intentions ==========

    /// CREATE: idempotent replace. Existing rows for the breakable are
    /// deleted and the staged rows inserted with status CREATED; no stack
    /// is touched.
    async fn create(
        &self,
        ctx: &RequestContext,
        breakable: BreakableRef,
        staged: &[StagedBreakdown],
    ) -> Result<(), AppError> {
        let Some(first) = staged.first() else {
            return Err(AppError::Validation(format!(
                "cannot create an empty breakdown for {breakable}"
            )));
        };

        let txn = self.db.begin().await.map_err(db_err)?;

        let session_id = Self::stack_session(&txn, first.float_stack_id).await?;
        let session = load_session_domain(&txn, session_id).await?;
        SessionStateMachine::ensure_member(&session, ctx.user_id)?;
        SessionStateMachine::ensure_trading(session.status)?;

        breakdowns::Entity::delete_many()
            .filter(breakdowns::Column::BreakableKind.eq(breakable.kind.as_str()))
            .filter(breakdowns::Column::BreakableId.eq(breakable.id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let now = chrono::Utc::now().into();
        for line in staged {
            breakdowns::ActiveModel {
                id: Set(Uuid::new_v4()),
                breakable_kind: Set(breakable.kind.as_str().to_string()),
                breakable_id: Set(breakable.id),
                float_stack_id: Set(line.float_stack_id),
                denomination_id: Set(line.denomination_id),
                count: Set(line.count),
                direction: Set(line.direction.as_str().to_string()),
                denominated_value: Set(line.denominated_value),
                status: Set(BreakdownStatus::Created.as_str().to_string()),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)
    }

    /// COMMIT: applies every CREATED row's spend delta to its stack and
    /// flips the row to COMMITTED. Already-committed rows are skipped, so
    /// a retry cannot double-apply.
    async fn commit(&self, ctx: &RequestContext, breakable: BreakableRef) -> Result<(), AppError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let rows = Self::load_rows_on(&txn, breakable).await?;
        Self::ensure_rows_member(&txn, ctx, &rows).await?;

        let plan = BreakdownLedger::commit_plan(breakable, &rows)?;
        Self::apply_plan(&txn, &plan, BreakdownStatus::Committed).await?;

        txn.commit().await.map_err(db_err)
    }

    /// UNCOMMIT: applies the exact inverse adjustment for every COMMITTED
    /// row and flips it to CANCELLED. A breakable with nothing committed
    /// is an error.
    async fn uncommit(
        &self,
        ctx: &RequestContext,
        breakable: BreakableRef,
    ) -> Result<(), AppError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let rows = Self::load_rows_on(&txn, breakable).await?;
        Self::ensure_rows_member(&txn, ctx, &rows).await?;

        let plan = BreakdownLedger::uncommit_plan(breakable, &rows)?;
        Self::apply_plan(&txn, &plan, BreakdownStatus::Cancelled).await?;

        txn.commit().await.map_err(db_err)
    }

    /// DELETE: removes the rows outright without touching counters.
    /// Valid only while nothing is committed.
    async fn delete(&self, ctx: &RequestContext, breakable: BreakableRef) -> Result<(), AppError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let rows = Self::load_rows_on(&txn, breakable).await?;
        if rows.is_empty() {
            // Remove-all of nothing; deletion is idempotent.
            txn.commit().await.map_err(db_err)?;
            return Ok(());
        }
        Self::ensure_rows_member(&txn, ctx, &rows).await?;
        BreakdownLedger::validate_delete(breakable, &rows)?;

        breakdowns::Entity::delete_many()
            .filter(breakdowns::Column::BreakableKind.eq(breakable.kind.as_str()))
            .filter(breakdowns::Column::BreakableId.eq(breakable.id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)
    }

    // ========== internal helpers ==========

    async fn load_rows_on<C: sea_orm::ConnectionTrait>(
        conn: &C,
        breakable: BreakableRef,
    ) -> Result<Vec<BreakdownRow>, AppError> {
        breakdowns::Entity::find()
            .filter(breakdowns::Column::BreakableKind.eq(breakable.kind.as_str()))
            .filter(breakdowns::Column::BreakableId.eq(breakable.id))
            .all(conn)
            .await
            .map_err(db_err)?
            .iter()
            .map(breakdown_to_domain)
            .collect()
    }

    async fn stack_session(txn: &DatabaseTransaction, stack_id: Uuid) -> Result<Uuid, AppError> {
        float_stacks::Entity::find_by_id(stack_id)
            .one(txn)
            .await
            .map_err(db_err)?
            .map(|s| s.session_id)
            .ok_or_else(|| AppError::NotFound(format!("float stack {stack_id}")))
    }

    async fn ensure_rows_member(
        txn: &DatabaseTransaction,
        ctx: &RequestContext,
        rows: &[BreakdownRow],
    ) -> Result<(), AppError> {
        let Some(first) = rows.first() else {
            return Ok(());
        };
        let session_id = Self::stack_session(txn, first.float_stack_id).await?;
        let session = load_session_domain(txn, session_id).await?;
        SessionStateMachine::ensure_member(&session, ctx.user_id)?;
        Ok(())
    }

    /// Applies a plan's stack adjustments and flips its rows to `status`,
    /// all on the supplied transaction.
    async fn apply_plan(
        txn: &DatabaseTransaction,
        plan: &BreakdownPlan,
        status: BreakdownStatus,
    ) -> Result<(), AppError> {
        let now = chrono::Utc::now().into();

        for adjustment in &plan.adjustments {
            let model = float_stacks::Entity::find_by_id(adjustment.float_stack_id)
                .one(txn)
                .await
                .map_err(db_err)?
                .ok_or_else(|| {
                    AppError::NotFound(format!("float stack {}", adjustment.float_stack_id))
                })?;

            // The domain type enforces the availability floor; a
            // violation rolls the whole breakable back.
            let mut stack = stack_to_domain(&model);
            stack.apply_spend(adjustment.spent_delta)?;

            float_stacks::ActiveModel {
                id: Set(model.id),
                spent_during_session: Set(stack.spent_during_session),
                updated_at: Set(now),
                ..Default::default()
            }
            .update(txn)
            .await
            .map_err(db_err)?;
        }

        for row_id in &plan.row_ids {
            breakdowns::ActiveModel {
                id: Set(*row_id),
                status: Set(status.as_str().to_string()),
                updated_at: Set(now),
                ..Default::default()
            }
            .update(txn)
            .await
            .map_err(db_err)?;
        }

        Ok(())
    }
}
