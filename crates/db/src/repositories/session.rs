//! Session lifecycle repository.
//!
//! Implements the exposed session operations: start/confirm/close of the
//! float legs, join/leave, and the grouped float view. Every mutation
//! validates through the core state machine and runs inside one database
//! transaction.

use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::collections::BTreeMap;
use uuid::Uuid;

use cambio_core::access::validate_possession;
use cambio_core::float::{Denomination, FloatPhase, FloatStack};
use cambio_core::session::{FloatAction, SessionError, SessionStateMachine, SessionStatus};

use cambio_shared::{AppError, RequestContext};

use super::activity::{ActivityEvent, ActivityLogRepository};
use super::convert::{access_log_to_domain, stack_to_domain};
use super::{db_err, load_session_domain};
use crate::entities::{
    cx_sessions, denominations, float_stacks, repositories, repository_access_logs,
    session_members, users,
};

/// Per-session float view: every repository's stacks grouped by ticker.
#[derive(Debug)]
pub struct SessionFloat {
    /// The session header.
    pub session: cx_sessions::Model,
    /// Per-repository groupings.
    pub repositories: Vec<RepositoryFloat>,
}

/// One repository's float within a session.
#[derive(Debug)]
pub struct RepositoryFloat {
    /// The repository.
    pub repository_id: Uuid,
    /// Per-ticker groupings.
    pub currencies: Vec<TickerFloat>,
}

/// One ticker's stacks within a repository, largest denomination first.
#[derive(Debug)]
pub struct TickerFloat {
    /// The ticker.
    pub ticker: String,
    /// Total available value across the stacks.
    pub total_value: Decimal,
    /// The stacks, sorted by denominated value descending.
    pub stacks: Vec<float_stacks::Model>,
}

/// Session repository for lifecycle operations.
#[derive(Debug, Clone)]
pub struct SessionFloatRepository {
    db: DatabaseConnection,
}

impl SessionFloatRepository {
    /// Creates a new session repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a dormant session with the creator as its first member.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_session(
        &self,
        ctx: &RequestContext,
    ) -> Result<cx_sessions::Model, AppError> {
        let now = chrono::Utc::now().into();
        let session_id = Uuid::new_v4();

        let txn = self.db.begin().await.map_err(db_err)?;

        let session = cx_sessions::ActiveModel {
            id: Set(session_id),
            organization_id: Set(ctx.organization_id),
            user_id: Set(ctx.user_id),
            status: Set(SessionStatus::Dormant.as_str().to_string()),
            open_started_at: Set(None),
            open_started_by: Set(None),
            open_confirmed_at: Set(None),
            open_confirmed_by: Set(None),
            close_started_at: Set(None),
            close_started_by: Set(None),
            close_confirmed_at: Set(None),
            close_confirmed_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let session = session.insert(&txn).await.map_err(db_err)?;

        session_members::ActiveModel {
            id: Set(Uuid::new_v4()),
            session_id: Set(session_id),
            user_id: Set(ctx.user_id),
            joined_at: Set(now),
            left_at: Set(None),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        users::ActiveModel {
            id: Set(ctx.user_id),
            active_session_id: Set(Some(session_id)),
            updated_at: Set(now),
            ..Default::default()
        }
        .update(&txn)
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        ActivityLogRepository::new(self.db.clone())
            .record(ctx, ActivityEvent::session("session.create", session_id))
            .await;

        Ok(session)
    }

    /// The start transition: begins a float leg or cancels a started
    /// close.
    ///
    /// On the first OPEN start this snapshots a float stack for every
    /// accepted denomination across every active repository of the
    /// organization (seeded from each stack's predecessor) and takes
    /// possession of every repository.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for an invalid transition,
    /// `AppError::Forbidden` for a non-member, or `AppError::Conflict`
    /// when a repository is already possessed.
    pub async fn start_float(
        &self,
        ctx: &RequestContext,
        session_id: Uuid,
        action: FloatAction,
    ) -> Result<cx_sessions::Model, AppError> {
        let session = load_session_domain(&self.db, session_id).await?;
        SessionStateMachine::ensure_member(&session, ctx.user_id)?;
        let next = SessionStateMachine::start(session.status, action)?;

        let now = chrono::Utc::now().into();
        let txn = self.db.begin().await.map_err(db_err)?;

        match action {
            FloatAction::Open => {
                let repos = repositories::Entity::find()
                    .filter(repositories::Column::OrganizationId.eq(ctx.organization_id))
                    .filter(repositories::Column::IsActive.eq(true))
                    .all(&txn)
                    .await
                    .map_err(db_err)?;

                Self::possess_repositories(&txn, ctx, session_id, &repos, now).await?;
                Self::snapshot_stacks(&txn, session_id, &repos, now).await?;

                cx_sessions::ActiveModel {
                    id: Set(session_id),
                    status: Set(next.as_str().to_string()),
                    open_started_at: Set(Some(now)),
                    open_started_by: Set(Some(ctx.user_id)),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .update(&txn)
                .await
                .map_err(db_err)?;
            }
            FloatAction::Close => {
                for log in Self::held_logs(&txn, session_id).await? {
                    repository_access_logs::ActiveModel {
                        id: Set(log.id),
                        close_started_at: Set(Some(now)),
                        close_started_by: Set(Some(ctx.user_id)),
                        ..Default::default()
                    }
                    .update(&txn)
                    .await
                    .map_err(db_err)?;
                }

                cx_sessions::ActiveModel {
                    id: Set(session_id),
                    status: Set(next.as_str().to_string()),
                    close_started_at: Set(Some(now)),
                    close_started_by: Set(Some(ctx.user_id)),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .update(&txn)
                .await
                .map_err(db_err)?;
            }
            FloatAction::CancelClose => {
                // Revert the close leg; float-stack counters stay as
                // they are.
                for log in Self::held_logs(&txn, session_id).await? {
                    repository_access_logs::ActiveModel {
                        id: Set(log.id),
                        close_started_at: Set(None),
                        close_started_by: Set(None),
                        ..Default::default()
                    }
                    .update(&txn)
                    .await
                    .map_err(db_err)?;
                }

                cx_sessions::ActiveModel {
                    id: Set(session_id),
                    status: Set(next.as_str().to_string()),
                    close_started_at: Set(None),
                    close_started_by: Set(None),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .update(&txn)
                .await
                .map_err(db_err)?;
            }
        }

        txn.commit().await.map_err(db_err)?;

        let event = match action {
            FloatAction::Open => "float.open.start",
            FloatAction::Close => "float.close.start",
            FloatAction::CancelClose => "float.close.cancel",
        };
        ActivityLogRepository::new(self.db.clone())
            .record(ctx, ActivityEvent::session(event, session_id))
            .await;

        self.load_session(session_id).await
    }

    /// The confirm transition: verifies every relevant float stack is
    /// confirmed, then advances the leg.
    ///
    /// The open leg finalizes to FLOAT_OPEN_COMPLETE within the same
    /// transaction; the close leg stops at FLOAT_CLOSE_CONFIRM and is
    /// finished by `close_float`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Consistency` carrying the exact set of blocking
    /// repository ids when any stack lacks the matching confirmed
    /// timestamp.
    pub async fn confirm_float(
        &self,
        ctx: &RequestContext,
        session_id: Uuid,
        action: FloatAction,
    ) -> Result<cx_sessions::Model, AppError> {
        let session = load_session_domain(&self.db, session_id).await?;
        SessionStateMachine::ensure_member(&session, ctx.user_id)?;

        let phase = match action {
            FloatAction::Open => FloatPhase::Open,
            FloatAction::Close => FloatPhase::Close,
            FloatAction::CancelClose => {
                return Err(SessionError::InvalidTransition {
                    from: session.status,
                    action,
                }
                .into());
            }
        };
        let confirmed = SessionStateMachine::confirm(session.status, action)?;

        let stacks: Vec<FloatStack> = float_stacks::Entity::find()
            .filter(float_stacks::Column::SessionId.eq(session_id))
            .all(&self.db)
            .await
            .map_err(db_err)?
            .iter()
            .map(stack_to_domain)
            .collect();
        SessionStateMachine::check_confirmations(&stacks, phase)?;

        let now = chrono::Utc::now().into();
        let txn = self.db.begin().await.map_err(db_err)?;

        match phase {
            FloatPhase::Open => {
                // The open leg completes in the same transaction that
                // records the confirmation. Per-repository access logs
                // already carry their confirm markers from
                // `confirm_repository_float`.
                let complete = SessionStateMachine::complete(confirmed, FloatPhase::Open)?;
                cx_sessions::ActiveModel {
                    id: Set(session_id),
                    status: Set(complete.as_str().to_string()),
                    open_confirmed_at: Set(Some(now)),
                    open_confirmed_by: Set(Some(ctx.user_id)),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .update(&txn)
                .await
                .map_err(db_err)?;
            }
            FloatPhase::Close => {
                cx_sessions::ActiveModel {
                    id: Set(session_id),
                    status: Set(confirmed.as_str().to_string()),
                    close_confirmed_at: Set(Some(now)),
                    close_confirmed_by: Set(Some(ctx.user_id)),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .update(&txn)
                .await
                .map_err(db_err)?;
            }
        }

        txn.commit().await.map_err(db_err)?;

        let event = match phase {
            FloatPhase::Open => "float.open.confirm",
            FloatPhase::Close => "float.close.confirm",
        };
        ActivityLogRepository::new(self.db.clone())
            .record(ctx, ActivityEvent::session(event, session_id))
            .await;

        self.load_session(session_id).await
    }

    /// Finalizes a confirmed close: completes the leg, releases every
    /// repository, and closes the session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` unless the close leg is confirmed.
    pub async fn close_float(
        &self,
        ctx: &RequestContext,
        session_id: Uuid,
    ) -> Result<cx_sessions::Model, AppError> {
        let session = load_session_domain(&self.db, session_id).await?;
        SessionStateMachine::ensure_member(&session, ctx.user_id)?;

        let complete = SessionStateMachine::complete(session.status, FloatPhase::Close)?;
        let closed = SessionStateMachine::finalize(complete)?;

        let now = chrono::Utc::now().into();
        let txn = self.db.begin().await.map_err(db_err)?;

        for log in Self::held_logs(&txn, session_id).await? {
            repository_access_logs::ActiveModel {
                id: Set(log.id),
                released_at: Set(Some(now)),
                ..Default::default()
            }
            .update(&txn)
            .await
            .map_err(db_err)?;
        }

        cx_sessions::ActiveModel {
            id: Set(session_id),
            status: Set(closed.as_str().to_string()),
            updated_at: Set(now),
            ..Default::default()
        }
        .update(&txn)
        .await
        .map_err(db_err)?;

        // A closed session no longer pins anyone's active pointer.
        let members = users::Entity::find()
            .filter(users::Column::ActiveSessionId.eq(session_id))
            .all(&txn)
            .await
            .map_err(db_err)?;
        for member in members {
            users::ActiveModel {
                id: Set(member.id),
                active_session_id: Set(None),
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
                ActivityEvent::session("float.close.complete", session_id),
            )
            .await;

        self.load_session(session_id).await
    }

    /// Adds a user to the session's authorized members and points their
    /// active-session pointer at it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Conflict` when the user already works another
    /// session.
    pub async fn join_session(
        &self,
        ctx: &RequestContext,
        session_id: Uuid,
    ) -> Result<(), AppError> {
        let session = load_session_domain(&self.db, session_id).await?;

        let user = users::Entity::find_by_id(ctx.user_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::NotFound(format!("user {}", ctx.user_id)))?;

        SessionStateMachine::validate_join(&session, ctx.user_id, user.active_session_id)?;

        let now = chrono::Utc::now().into();
        let txn = self.db.begin().await.map_err(db_err)?;

        if !session.is_member(ctx.user_id) {
            session_members::ActiveModel {
                id: Set(Uuid::new_v4()),
                session_id: Set(session_id),
                user_id: Set(ctx.user_id),
                joined_at: Set(now),
                left_at: Set(None),
            }
            .insert(&txn)
            .await
            .map_err(db_err)?;
        }

        users::ActiveModel {
            id: Set(ctx.user_id),
            active_session_id: Set(Some(session_id)),
            updated_at: Set(now),
            ..Default::default()
        }
        .update(&txn)
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        ActivityLogRepository::new(self.db.clone())
            .record(ctx, ActivityEvent::session("session.join", session_id))
            .await;

        Ok(())
    }

    /// Removes a user from the session's authorized members and clears
    /// their active-session pointer.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` when the user is not a member.
    pub async fn leave_session(
        &self,
        ctx: &RequestContext,
        session_id: Uuid,
    ) -> Result<(), AppError> {
        let membership = session_members::Entity::find()
            .filter(session_members::Column::SessionId.eq(session_id))
            .filter(session_members::Column::UserId.eq(ctx.user_id))
            .filter(session_members::Column::LeftAt.is_null())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(SessionError::NotAuthorized {
                user_id: ctx.user_id,
                session_id,
            })?;

        let now = chrono::Utc::now().into();
        let txn = self.db.begin().await.map_err(db_err)?;

        session_members::ActiveModel {
            id: Set(membership.id),
            left_at: Set(Some(now)),
            ..Default::default()
        }
        .update(&txn)
        .await
        .map_err(db_err)?;

        let user = users::Entity::find_by_id(ctx.user_id)
            .one(&txn)
            .await
            .map_err(db_err)?;
        if let Some(user) = user
            && user.active_session_id == Some(session_id)
        {
            users::ActiveModel {
                id: Set(user.id),
                active_session_id: Set(None),
                updated_at: Set(now),
                ..Default::default()
            }
            .update(&txn)
            .await
            .map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)?;

        ActivityLogRepository::new(self.db.clone())
            .record(ctx, ActivityEvent::session("session.leave", session_id))
            .await;

        Ok(())
    }

    /// Returns the session's float stacks grouped per repository and
    /// ticker, largest denomination first, with per-ticker totals.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown session.
    pub async fn get_session_float(&self, session_id: Uuid) -> Result<SessionFloat, AppError> {
        let session = self.load_session(session_id).await?;

        let stacks = float_stacks::Entity::find()
            .filter(float_stacks::Column::SessionId.eq(session_id))
            .order_by_desc(float_stacks::Column::DenominatedValue)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let mut grouped: BTreeMap<Uuid, BTreeMap<String, Vec<float_stacks::Model>>> =
            BTreeMap::new();
        for stack in stacks {
            grouped
                .entry(stack.repository_id)
                .or_default()
                .entry(stack.ticker.clone())
                .or_default()
                .push(stack);
        }

        let repositories = grouped
            .into_iter()
            .map(|(repository_id, currencies)| RepositoryFloat {
                repository_id,
                currencies: currencies
                    .into_iter()
                    .map(|(ticker, stacks)| TickerFloat {
                        ticker,
                        total_value: stacks
                            .iter()
                            .map(|s| stack_to_domain(s).current_value())
                            .sum(),
                        stacks,
                    })
                    .collect(),
            })
            .collect();

        Ok(SessionFloat {
            session,
            repositories,
        })
    }

    // ========== internal helpers ==========

    async fn load_session(&self, session_id: Uuid) -> Result<cx_sessions::Model, AppError> {
        cx_sessions::Entity::find_by_id(session_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::NotFound(format!("session {session_id}")))
    }

    async fn held_logs(
        txn: &DatabaseTransaction,
        session_id: Uuid,
    ) -> Result<Vec<repository_access_logs::Model>, AppError> {
        repository_access_logs::Entity::find()
            .filter(repository_access_logs::Column::SessionId.eq(session_id))
            .filter(repository_access_logs::Column::ReleasedAt.is_null())
            .all(txn)
            .await
            .map_err(db_err)
    }

    /// Takes possession of every repository, failing if any is already
    /// held by an unreleased session.
    async fn possess_repositories(
        txn: &DatabaseTransaction,
        ctx: &RequestContext,
        session_id: Uuid,
        repos: &[repositories::Model],
        now: DateTimeWithTimeZone,
    ) -> Result<(), AppError> {
        for repo in repos {
            let existing = repository_access_logs::Entity::find()
                .filter(repository_access_logs::Column::RepositoryId.eq(repo.id))
                .filter(repository_access_logs::Column::ReleasedAt.is_null())
                .one(txn)
                .await
                .map_err(db_err)?;
            let existing = existing.as_ref().map(access_log_to_domain);
            validate_possession(existing.as_ref())?;

            repository_access_logs::ActiveModel {
                id: Set(Uuid::new_v4()),
                repository_id: Set(repo.id),
                session_id: Set(session_id),
                possessed_at: Set(now),
                released_at: Set(None),
                open_started_at: Set(Some(now)),
                open_started_by: Set(Some(ctx.user_id)),
                open_confirmed_at: Set(None),
                open_confirmed_by: Set(None),
                close_started_at: Set(None),
                close_started_by: Set(None),
                close_confirmed_at: Set(None),
                close_confirmed_by: Set(None),
            }
            .insert(txn)
            .await
            .map_err(db_err)?;
        }
        Ok(())
    }

    /// Snapshots a float stack per (repository, accepted denomination),
    /// each linked to its predecessor in the prior session.
    async fn snapshot_stacks(
        txn: &DatabaseTransaction,
        session_id: Uuid,
        repos: &[repositories::Model],
        now: DateTimeWithTimeZone,
    ) -> Result<(), AppError> {
        let denoms = denominations::Entity::find()
            .filter(denominations::Column::Accepted.eq(true))
            .all(txn)
            .await
            .map_err(db_err)?;

        for repo in repos {
            for denom in &denoms {
                let predecessor = float_stacks::Entity::find()
                    .filter(float_stacks::Column::RepositoryId.eq(repo.id))
                    .filter(float_stacks::Column::DenominationId.eq(denom.id))
                    .order_by_desc(float_stacks::Column::CreatedAt)
                    .one(txn)
                    .await
                    .map_err(db_err)?;
                let predecessor = predecessor.as_ref().map(stack_to_domain);

                let stack = FloatStack::open(
                    session_id,
                    repo.id,
                    &Denomination {
                        id: denom.id,
                        ticker: denom.ticker.clone(),
                        value: denom.value,
                        accepted: denom.accepted,
                    },
                    predecessor.as_ref(),
                )?;

                float_stacks::ActiveModel {
                    id: Set(stack.id),
                    session_id: Set(stack.session_id),
                    repository_id: Set(stack.repository_id),
                    denomination_id: Set(stack.denomination_id),
                    ticker: Set(stack.ticker),
                    denominated_value: Set(stack.denominated_value),
                    open_count: Set(stack.open_count),
                    close_count: Set(stack.close_count),
                    midday_count: Set(stack.midday_count),
                    last_session_count: Set(stack.last_session_count),
                    spent_during_session: Set(stack.spent_during_session),
                    transferred_during_session: Set(stack.transferred_during_session),
                    open_spot: Set(stack.open_spot),
                    close_spot: Set(stack.close_spot),
                    open_confirmed_at: Set(None),
                    open_confirmed_by: Set(None),
                    close_confirmed_at: Set(None),
                    close_confirmed_by: Set(None),
                    previous_session_float_stack_id: Set(stack.previous_session_float_stack_id),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(txn)
                .await
                .map_err(db_err)?;
            }
        }
        Ok(())
    }
}
