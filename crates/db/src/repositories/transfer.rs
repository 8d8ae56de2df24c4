//! Float transfer repository.
//!
//! Transfers move a sum between two repositories within a session and
//! apply their breakdowns immediately: the transfer row, its breakdown
//! rows, and every stack adjustment share one database transaction.

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};
use uuid::Uuid;

use cambio_core::allocation::StagedBreakdown;
use cambio_core::breakdown::{BreakableKind, BreakdownStatus};
use cambio_core::session::SessionStateMachine;
use cambio_core::transfer::{TransferInput, TransferService, TransferStatus};
use cambio_shared::{AppError, RequestContext};

use super::activity::{ActivityEvent, ActivityLogRepository};
use super::convert::stack_to_domain;
use super::{db_err, load_session_domain};
use crate::entities::{breakdowns, float_stacks, float_transfers, repositories};

/// Float transfer repository.
#[derive(Debug, Clone)]
pub struct TransferRepository {
    db: DatabaseConnection,
}

impl TransferRepository {
    /// Creates a new transfer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates and immediately applies an inter-repository transfer.
    ///
    /// Validations run before any write: the session must be trading, the
    /// acting user a member, both sums positive, the repositories
    /// distinct and existing, and each side's breakdowns must cover its
    /// sum exactly.
    ///
    /// # Errors
    ///
    /// Returns the first violated precondition as an `AppError`; on any
    /// later failure the transaction rolls back and nothing persists.
    pub async fn create_transfer(
        &self,
        ctx: &RequestContext,
        input: &TransferInput,
        outbound: &[StagedBreakdown],
        inbound: &[StagedBreakdown],
    ) -> Result<float_transfers::Model, AppError> {
        let session = load_session_domain(&self.db, input.session_id).await?;
        SessionStateMachine::ensure_member(&session, ctx.user_id)?;
        TransferService::validate(input, session.status)?;
        TransferService::validate_coverage(input, outbound, inbound)?;

        for repository_id in [input.outbound_repository_id, input.inbound_repository_id] {
            repositories::Entity::find_by_id(repository_id)
                .one(&self.db)
                .await
                .map_err(db_err)?
                .ok_or_else(|| AppError::NotFound(format!("repository {repository_id}")))?;
        }

        let now = chrono::Utc::now().into();
        let transfer_id = Uuid::new_v4();
        let txn = self.db.begin().await.map_err(db_err)?;

        let transfer = float_transfers::ActiveModel {
            id: Set(transfer_id),
            session_id: Set(input.session_id),
            outbound_repository_id: Set(input.outbound_repository_id),
            inbound_repository_id: Set(input.inbound_repository_id),
            outbound_ticker: Set(input.outbound_ticker.clone()),
            inbound_ticker: Set(input.inbound_ticker.clone()),
            outbound_sum: Set(input.outbound_sum),
            inbound_sum: Set(input.inbound_sum),
            status: Set(TransferStatus::Completed.as_str().to_string()),
            created_by: Set(ctx.user_id),
            created_at: Set(now),
        };
        let transfer = transfer.insert(&txn).await.map_err(db_err)?;

        // Transfer breakdowns are applied on insert - no create/commit
        // split.
        for line in outbound.iter().chain(inbound) {
            breakdowns::ActiveModel {
                id: Set(Uuid::new_v4()),
                breakable_kind: Set(BreakableKind::Transfer.as_str().to_string()),
                breakable_id: Set(transfer_id),
                float_stack_id: Set(line.float_stack_id),
                denomination_id: Set(line.denomination_id),
                count: Set(line.count),
                direction: Set(line.direction.as_str().to_string()),
                denominated_value: Set(line.denominated_value),
                status: Set(BreakdownStatus::Committed.as_str().to_string()),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(db_err)?;
        }

        for adjustment in TransferService::adjustments(outbound)
            .into_iter()
            .chain(TransferService::adjustments(inbound))
        {
            let model = float_stacks::Entity::find_by_id(adjustment.float_stack_id)
                .one(&txn)
                .await
                .map_err(db_err)?
                .ok_or_else(|| {
                    AppError::NotFound(format!("float stack {}", adjustment.float_stack_id))
                })?;

            let mut stack = stack_to_domain(&model);
            stack.apply_transfer(adjustment.transferred_delta)?;

            float_stacks::ActiveModel {
                id: Set(model.id),
                transferred_during_session: Set(stack.transferred_during_session),
                close_count: Set(stack.close_count),
                updated_at: Set(now),
                ..Default::default()
            }
            .update(&txn)
            .await
            .map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)?;

        ActivityLogRepository::new(self.db.clone())
            .record(
                ctx,
                ActivityEvent::session("transfer.create", input.session_id)
                    .with_reference(transfer_id)
                    .with_meta(serde_json::json!({
                        "outbound_repository_id": input.outbound_repository_id,
                        "inbound_repository_id": input.inbound_repository_id,
                        "outbound_sum": input.outbound_sum,
                        "inbound_sum": input.inbound_sum,
                    })),
            )
            .await;

        Ok(transfer)
    }
}
