//! Initial schema for the float engine.
//!
//! Creates organizations, users, repositories, denominations, sessions,
//! memberships, access logs, float stacks, breakdowns, transfers, and the
//! activity log.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(INITIAL_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS activity_logs, breakdowns, float_transfers, float_stacks, \
             repository_access_logs, session_members, cx_sessions, denominations, repositories, \
             users, organizations CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const INITIAL_SQL: &str = r"
-- Organizations (directory data; CRUD lives elsewhere)
CREATE TABLE organizations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    slug VARCHAR(255) NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Users (identity provisioning is external)
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR(255) NOT NULL UNIQUE,
    full_name VARCHAR(255) NOT NULL,
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    active_session_id UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Repositories: tills, vaults, wallets
CREATE TABLE repositories (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    kind VARCHAR(16) NOT NULL CHECK (kind IN ('till', 'vault', 'wallet')),
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (organization_id, name)
);

-- Denominations: read-only reference data
CREATE TABLE denominations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    ticker VARCHAR(16) NOT NULL,
    value NUMERIC(20, 8) NOT NULL CHECK (value > 0),
    accepted BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (ticker, value)
);

-- Trading sessions
CREATE TABLE cx_sessions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    user_id UUID NOT NULL REFERENCES users(id),
    status VARCHAR(32) NOT NULL DEFAULT 'dormant',
    open_started_at TIMESTAMPTZ,
    open_started_by UUID,
    open_confirmed_at TIMESTAMPTZ,
    open_confirmed_by UUID,
    close_started_at TIMESTAMPTZ,
    close_started_by UUID,
    close_confirmed_at TIMESTAMPTZ,
    close_confirmed_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_cx_sessions_org ON cx_sessions(organization_id, created_at DESC);

-- Session membership (authorized users)
CREATE TABLE session_members (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    session_id UUID NOT NULL REFERENCES cx_sessions(id) ON DELETE CASCADE,
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    joined_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    left_at TIMESTAMPTZ
);

-- One active membership per (session, user)
CREATE UNIQUE INDEX idx_session_members_active
    ON session_members(session_id, user_id) WHERE left_at IS NULL;

-- Repository possession log
CREATE TABLE repository_access_logs (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    repository_id UUID NOT NULL REFERENCES repositories(id),
    session_id UUID NOT NULL REFERENCES cx_sessions(id),
    possessed_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    released_at TIMESTAMPTZ,
    open_started_at TIMESTAMPTZ,
    open_started_by UUID,
    open_confirmed_at TIMESTAMPTZ,
    open_confirmed_by UUID,
    close_started_at TIMESTAMPTZ,
    close_started_by UUID,
    close_confirmed_at TIMESTAMPTZ,
    close_confirmed_by UUID
);

-- A repository is possessed by at most one unreleased session
CREATE UNIQUE INDEX idx_access_logs_held
    ON repository_access_logs(repository_id) WHERE released_at IS NULL;

CREATE INDEX idx_access_logs_session ON repository_access_logs(session_id);

-- Per-denomination float stacks (append-only across sessions)
CREATE TABLE float_stacks (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    session_id UUID NOT NULL REFERENCES cx_sessions(id),
    repository_id UUID NOT NULL REFERENCES repositories(id),
    denomination_id UUID NOT NULL REFERENCES denominations(id),
    ticker VARCHAR(16) NOT NULL,
    denominated_value NUMERIC(20, 8) NOT NULL,
    open_count NUMERIC(20, 8) NOT NULL DEFAULT 0,
    close_count NUMERIC(20, 8) NOT NULL DEFAULT 0,
    midday_count NUMERIC(20, 8) NOT NULL DEFAULT 0,
    last_session_count NUMERIC(20, 8) NOT NULL DEFAULT 0,
    spent_during_session NUMERIC(20, 8) NOT NULL DEFAULT 0,
    transferred_during_session NUMERIC(20, 8) NOT NULL DEFAULT 0,
    open_spot NUMERIC(20, 8),
    close_spot NUMERIC(20, 8),
    open_confirmed_at TIMESTAMPTZ,
    open_confirmed_by UUID,
    close_confirmed_at TIMESTAMPTZ,
    close_confirmed_by UUID,
    previous_session_float_stack_id UUID REFERENCES float_stacks(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (session_id, repository_id, denomination_id)
);

CREATE INDEX idx_float_stacks_session_ticker ON float_stacks(session_id, ticker);
CREATE INDEX idx_float_stacks_repository ON float_stacks(repository_id);

-- Inter-repository float transfers
CREATE TABLE float_transfers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    session_id UUID NOT NULL REFERENCES cx_sessions(id),
    outbound_repository_id UUID NOT NULL REFERENCES repositories(id),
    inbound_repository_id UUID NOT NULL REFERENCES repositories(id),
    outbound_ticker VARCHAR(16) NOT NULL,
    inbound_ticker VARCHAR(16) NOT NULL,
    outbound_sum NUMERIC(20, 8) NOT NULL CHECK (outbound_sum > 0),
    inbound_sum NUMERIC(20, 8) NOT NULL CHECK (inbound_sum > 0),
    status VARCHAR(16) NOT NULL DEFAULT 'completed',
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CHECK (outbound_repository_id <> inbound_repository_id)
);

CREATE INDEX idx_float_transfers_session ON float_transfers(session_id);

-- Denomination breakdowns for orders, transfers, and swaps
CREATE TABLE breakdowns (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    breakable_kind VARCHAR(16) NOT NULL CHECK (breakable_kind IN ('order', 'transfer', 'swap')),
    breakable_id UUID NOT NULL,
    float_stack_id UUID NOT NULL REFERENCES float_stacks(id),
    denomination_id UUID NOT NULL REFERENCES denominations(id),
    count NUMERIC(20, 8) NOT NULL CHECK (count > 0),
    direction VARCHAR(16) NOT NULL CHECK (direction IN ('inbound', 'outbound')),
    denominated_value NUMERIC(20, 8) NOT NULL,
    status VARCHAR(16) NOT NULL DEFAULT 'created'
        CHECK (status IN ('created', 'committed', 'cancelled')),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_breakdowns_breakable ON breakdowns(breakable_kind, breakable_id);
CREATE INDEX idx_breakdowns_stack ON breakdowns(float_stack_id);

-- Best-effort activity log (append-only)
CREATE TABLE activity_logs (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    event VARCHAR(64) NOT NULL,
    user_id UUID NOT NULL,
    organization_id UUID NOT NULL,
    session_id UUID,
    reference_id UUID,
    comment TEXT,
    meta JSONB,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_activity_logs_org ON activity_logs(organization_id, created_at DESC);
";
