//! Initial database migration.
//!
//! Creates all tables and indexes for the budget ledger, the approval
//! workflow, contracts and statements, the accounting journal, and the
//! session store.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: PRINCIPALS & SESSIONS
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(SESSIONS_SQL).await?;

        // ============================================================
        // PART 2: REFERENCE TABLES
        // ============================================================
        db.execute_unprepared(ACTIVITIES_SQL).await?;
        db.execute_unprepared(ORG_UNITS_SQL).await?;

        // ============================================================
        // PART 3: BUDGET LEDGER
        // ============================================================
        db.execute_unprepared(BUDGET_ROWS_SQL).await?;
        db.execute_unprepared(BUDGET_TRANSACTIONS_SQL).await?;

        // ============================================================
        // PART 4: TRANSACTIONS & WORKFLOW
        // ============================================================
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(WORKFLOW_LOGS_SQL).await?;

        // ============================================================
        // PART 5: CONTRACTS & STATEMENTS
        // ============================================================
        db.execute_unprepared(CONTRACTS_SQL).await?;
        db.execute_unprepared(PROGRESS_STATEMENTS_SQL).await?;

        // ============================================================
        // PART 6: ACCOUNTING JOURNAL
        // ============================================================
        db.execute_unprepared(JOURNAL_SNAPSHOTS_SQL).await?;
        db.execute_unprepared(JOURNAL_LINES_SQL).await?;
        db.execute_unprepared(ACCOUNTING_AUDIT_LOGS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    username VARCHAR(64) NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    display_name VARCHAR(255) NOT NULL,
    -- 0 = no approval authority, 1..4 = ladder rung, 9 = superuser
    admin_level SMALLINT NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const SESSIONS_SQL: &str = r"
CREATE TABLE sessions (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    token_hash VARCHAR(64) NOT NULL UNIQUE,
    expires_at TIMESTAMPTZ NOT NULL,
    revoked_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_sessions_user ON sessions(user_id);
CREATE INDEX idx_sessions_expires ON sessions(expires_at);
";

const ACTIVITIES_SQL: &str = r"
CREATE TABLE activities (
    id UUID PRIMARY KEY,
    code VARCHAR(32) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const ORG_UNITS_SQL: &str = r"
CREATE TABLE org_units (
    id UUID PRIMARY KEY,
    code VARCHAR(32) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    parent_id UUID REFERENCES org_units(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const BUDGET_ROWS_SQL: &str = r"
CREATE TABLE budget_rows (
    id UUID PRIMARY KEY,
    activity_id UUID NOT NULL REFERENCES activities(id),
    -- NULL means globally visible
    org_unit_id UUID REFERENCES org_units(id),
    budget_coding VARCHAR(64) NOT NULL UNIQUE,
    approved_amount NUMERIC(18, 2) NOT NULL,
    blocked_amount NUMERIC(18, 2) NOT NULL DEFAULT 0,
    spent_amount NUMERIC(18, 2) NOT NULL DEFAULT 0,
    fiscal_year SMALLINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    -- the ledger invariant, enforced by the service and re-checked here
    CONSTRAINT chk_budget_rows_non_negative
        CHECK (blocked_amount >= 0 AND spent_amount >= 0),
    CONSTRAINT chk_budget_rows_not_overcommitted
        CHECK (blocked_amount + spent_amount <= approved_amount)
);

CREATE INDEX idx_budget_rows_activity ON budget_rows(activity_id);
CREATE INDEX idx_budget_rows_fiscal_year ON budget_rows(fiscal_year);
";

const BUDGET_TRANSACTIONS_SQL: &str = r"
CREATE TABLE budget_transactions (
    id UUID PRIMARY KEY,
    budget_row_id UUID NOT NULL REFERENCES budget_rows(id),
    operation VARCHAR(16) NOT NULL
        CHECK (operation IN ('BLOCK', 'RELEASE', 'CONFIRM')),
    amount NUMERIC(18, 2) NOT NULL,
    user_id UUID NOT NULL REFERENCES users(id),
    reference_doc VARCHAR(255) NOT NULL,
    pre_blocked NUMERIC(18, 2) NOT NULL,
    pre_spent NUMERIC(18, 2) NOT NULL,
    post_blocked NUMERIC(18, 2) NOT NULL,
    post_spent NUMERIC(18, 2) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_budget_transactions_row
    ON budget_transactions(budget_row_id, created_at);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY,
    unique_code VARCHAR(64) NOT NULL UNIQUE,
    title VARCHAR(255) NOT NULL,
    status VARCHAR(16) NOT NULL,
    amount NUMERIC(18, 2) NOT NULL,
    budget_row_id UUID NOT NULL REFERENCES budget_rows(id),
    beneficiary_code VARCHAR(32),
    version INTEGER NOT NULL DEFAULT 0,
    accounting_status VARCHAR(16),
    posting_ref VARCHAR(64),
    posting_notes TEXT,
    posted_at TIMESTAMPTZ,
    posted_by UUID REFERENCES users(id),
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_transactions_status ON transactions(status);
CREATE INDEX idx_transactions_budget_row ON transactions(budget_row_id);
";

const WORKFLOW_LOGS_SQL: &str = r"
CREATE TABLE workflow_logs (
    id UUID PRIMARY KEY,
    transaction_id UUID NOT NULL REFERENCES transactions(id),
    previous_status VARCHAR(16) NOT NULL,
    new_status VARCHAR(16) NOT NULL,
    action VARCHAR(32) NOT NULL,
    admin_level SMALLINT NOT NULL,
    actor_id UUID NOT NULL REFERENCES users(id),
    comment TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_workflow_logs_transaction
    ON workflow_logs(transaction_id, created_at);
";

const CONTRACTS_SQL: &str = r"
CREATE TABLE contracts (
    id UUID PRIMARY KEY,
    contract_number VARCHAR(64) NOT NULL UNIQUE,
    title VARCHAR(255) NOT NULL,
    status VARCHAR(20) NOT NULL,
    total_amount NUMERIC(18, 2) NOT NULL,
    paid_amount NUMERIC(18, 2) NOT NULL DEFAULT 0,
    budget_row_id UUID NOT NULL REFERENCES budget_rows(id),
    contractor_code VARCHAR(32) NOT NULL,
    version INTEGER NOT NULL DEFAULT 0,
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_contracts_paid_within_total
        CHECK (paid_amount >= 0 AND paid_amount <= total_amount)
);

CREATE INDEX idx_contracts_budget_row ON contracts(budget_row_id);
";

const PROGRESS_STATEMENTS_SQL: &str = r"
CREATE TABLE progress_statements (
    id UUID PRIMARY KEY,
    contract_id UUID NOT NULL REFERENCES contracts(id),
    sequence_no INTEGER NOT NULL,
    gross_amount NUMERIC(18, 2) NOT NULL,
    deductions NUMERIC(18, 2) NOT NULL DEFAULT 0,
    net_amount NUMERIC(18, 2) NOT NULL,
    cumulative_amount NUMERIC(18, 2) NOT NULL,
    status VARCHAR(16) NOT NULL,
    created_by UUID NOT NULL REFERENCES users(id),
    paid_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_progress_statements_seq UNIQUE (contract_id, sequence_no),
    CONSTRAINT chk_progress_statements_net
        CHECK (net_amount = gross_amount - deductions AND net_amount > 0)
);

CREATE INDEX idx_progress_statements_contract
    ON progress_statements(contract_id);
";

const JOURNAL_SNAPSHOTS_SQL: &str = r"
CREATE TABLE journal_snapshots (
    id UUID PRIMARY KEY,
    transaction_id UUID NOT NULL UNIQUE REFERENCES transactions(id),
    total_debit NUMERIC(18, 2) NOT NULL,
    total_credit NUMERIC(18, 2) NOT NULL,
    is_balanced BOOLEAN NOT NULL,
    validation_status VARCHAR(16) NOT NULL
        CHECK (validation_status IN ('VALID', 'WARNING', 'BLOCKED')),
    content_hash VARCHAR(64) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const JOURNAL_LINES_SQL: &str = r"
CREATE TABLE journal_lines (
    id UUID PRIMARY KEY,
    snapshot_id UUID NOT NULL REFERENCES journal_snapshots(id) ON DELETE CASCADE,
    line_no SMALLINT NOT NULL,
    account_code VARCHAR(64) NOT NULL,
    account_name VARCHAR(255) NOT NULL,
    side VARCHAR(8) NOT NULL CHECK (side IN ('DEBIT', 'CREDIT')),
    amount NUMERIC(18, 2) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_journal_lines_no UNIQUE (snapshot_id, line_no)
);
";

const ACCOUNTING_AUDIT_LOGS_SQL: &str = r"
CREATE TABLE accounting_audit_logs (
    id UUID PRIMARY KEY,
    transaction_id UUID NOT NULL REFERENCES transactions(id),
    action VARCHAR(32) NOT NULL,
    detail TEXT,
    actor_id UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_accounting_audit_logs_transaction
    ON accounting_audit_logs(transaction_id, created_at);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS accounting_audit_logs;
DROP TABLE IF EXISTS journal_lines;
DROP TABLE IF EXISTS journal_snapshots;
DROP TABLE IF EXISTS progress_statements;
DROP TABLE IF EXISTS contracts;
DROP TABLE IF EXISTS workflow_logs;
DROP TABLE IF EXISTS transactions;
DROP TABLE IF EXISTS budget_transactions;
DROP TABLE IF EXISTS budget_rows;
DROP TABLE IF EXISTS org_units;
DROP TABLE IF EXISTS activities;
DROP TABLE IF EXISTS sessions;
DROP TABLE IF EXISTS users;
";
