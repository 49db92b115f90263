//! Receivables schema.
//!
//! Creates master data, accounting periods, document sequences, the AR
//! subledger documents, and the journal tables. Status columns are TEXT with
//! CHECK constraints so the stored values match the domain strings.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: CHART OF ACCOUNTS & CONTROL SETTINGS
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(CONTROL_ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 2: PERIODS & SEQUENCES
        // ============================================================
        db.execute_unprepared(PERIODS_SQL).await?;
        db.execute_unprepared(SEQUENCES_SQL).await?;

        // ============================================================
        // PART 3: MASTER DATA
        // ============================================================
        db.execute_unprepared(MASTER_DATA_SQL).await?;

        // ============================================================
        // PART 4: JOURNALS
        // ============================================================
        db.execute_unprepared(JOURNALS_SQL).await?;

        // ============================================================
        // PART 5: SUBLEDGER DOCUMENTS
        // ============================================================
        db.execute_unprepared(INVOICES_SQL).await?;
        db.execute_unprepared(RECEIPTS_SQL).await?;
        db.execute_unprepared(CREDIT_NOTES_SQL).await?;
        db.execute_unprepared(REFUNDS_SQL).await?;

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

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    code VARCHAR(20) NOT NULL,
    name VARCHAR(255) NOT NULL,
    account_type TEXT NOT NULL
        CHECK (account_type IN ('ASSET', 'LIABILITY', 'EQUITY', 'INCOME', 'EXPENSE')),
    normal_balance TEXT NOT NULL CHECK (normal_balance IN ('DEBIT', 'CREDIT')),
    is_active BOOLEAN NOT NULL DEFAULT true,
    is_posting_allowed BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (tenant_id, code)
);

CREATE INDEX idx_accounts_tenant ON accounts(tenant_id);
";

const CONTROL_ACCOUNTS_SQL: &str = r"
CREATE TABLE control_account_settings (
    tenant_id UUID NOT NULL,
    role TEXT NOT NULL
        CHECK (role IN ('AR_CONTROL', 'AP_CONTROL', 'CASH_CLEARING', 'BANK_REFUND_CLEARING')),
    account_id UUID NOT NULL REFERENCES accounts(id),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (tenant_id, role)
);
";

const PERIODS_SQL: &str = r"
CREATE EXTENSION IF NOT EXISTS btree_gist;

CREATE TABLE accounting_periods (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    code VARCHAR(50) NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    status TEXT NOT NULL DEFAULT 'OPEN' CHECK (status IN ('OPEN', 'SOFT_CLOSED', 'CLOSED')),
    is_opening_balance BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_period_dates CHECK (end_date >= start_date),
    CONSTRAINT excl_period_overlap EXCLUDE USING gist (
        tenant_id WITH =,
        daterange(start_date, end_date, '[]') WITH &&
    ),
    UNIQUE (tenant_id, code)
);

CREATE INDEX idx_accounting_periods_tenant_dates
    ON accounting_periods(tenant_id, start_date, end_date);
CREATE UNIQUE INDEX idx_accounting_periods_one_opening
    ON accounting_periods(tenant_id) WHERE is_opening_balance;
";

const SEQUENCES_SQL: &str = r"
CREATE TABLE document_sequences (
    tenant_id UUID NOT NULL,
    name TEXT NOT NULL,
    last_value BIGINT NOT NULL CHECK (last_value > 0),
    PRIMARY KEY (tenant_id, name)
);
";

const MASTER_DATA_SQL: &str = r"
CREATE TABLE customers (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    code VARCHAR(50) NOT NULL,
    name VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (tenant_id, code)
);

CREATE TABLE bank_accounts (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    name VARCHAR(255) NOT NULL,
    gl_account_id UUID NOT NULL REFERENCES accounts(id),
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE invoice_categories (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    code VARCHAR(50) NOT NULL,
    name VARCHAR(255) NOT NULL,
    revenue_account_id UUID REFERENCES accounts(id),
    required_dimensions JSONB NOT NULL DEFAULT '[]'::jsonb,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (tenant_id, code)
);

CREATE TABLE dimensions (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    kind TEXT NOT NULL CHECK (kind IN ('PROJECT', 'FUND', 'DEPARTMENT')),
    code VARCHAR(50) NOT NULL,
    name VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    effective_from DATE,
    effective_to DATE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (tenant_id, kind, code)
);
";

const JOURNALS_SQL: &str = r"
CREATE TABLE journal_entries (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    entry_date DATE NOT NULL,
    reference VARCHAR(100) NOT NULL,
    memo TEXT NOT NULL,
    status TEXT NOT NULL CHECK (status IN ('DRAFT', 'REVIEWED', 'POSTED')),
    journal_type TEXT NOT NULL CHECK (journal_type IN ('STANDARD', 'REVERSING')),
    source_type TEXT NOT NULL
        CHECK (source_type IN ('CUSTOMER_INVOICE', 'CUSTOMER_CREDIT_NOTE', 'CUSTOMER_REFUND')),
    source_id UUID NOT NULL,
    reverses_journal_id UUID REFERENCES journal_entries(id),
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    posted_by UUID,
    posted_at TIMESTAMPTZ
);

CREATE INDEX idx_journal_entries_source ON journal_entries(tenant_id, source_type, source_id);

CREATE TABLE journal_lines (
    journal_entry_id UUID NOT NULL REFERENCES journal_entries(id) ON DELETE CASCADE,
    line_number INTEGER NOT NULL CHECK (line_number > 0),
    tenant_id UUID NOT NULL,
    account_id UUID NOT NULL REFERENCES accounts(id),
    debit NUMERIC(18, 2) NOT NULL DEFAULT 0,
    credit NUMERIC(18, 2) NOT NULL DEFAULT 0,
    description TEXT,
    project_id UUID REFERENCES dimensions(id),
    fund_id UUID REFERENCES dimensions(id),
    department_id UUID REFERENCES dimensions(id),
    PRIMARY KEY (journal_entry_id, line_number),
    CONSTRAINT chk_single_side CHECK (
        debit >= 0 AND credit >= 0 AND (debit = 0) <> (credit = 0)
    )
);
";

const INVOICES_SQL: &str = r"
CREATE TABLE customer_invoices (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    invoice_number VARCHAR(50) NOT NULL,
    customer_id UUID NOT NULL REFERENCES customers(id),
    category_id UUID NOT NULL REFERENCES invoice_categories(id),
    invoice_date DATE NOT NULL,
    due_date DATE NOT NULL,
    currency CHAR(3) NOT NULL,
    total_amount NUMERIC(18, 2) NOT NULL CHECK (total_amount > 0),
    description TEXT,
    project_id UUID REFERENCES dimensions(id),
    fund_id UUID REFERENCES dimensions(id),
    department_id UUID REFERENCES dimensions(id),
    status TEXT NOT NULL CHECK (status IN ('DRAFT', 'POSTED')),
    journal_entry_id UUID REFERENCES journal_entries(id),
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    posted_by UUID,
    posted_at TIMESTAMPTZ,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (tenant_id, invoice_number)
);

CREATE INDEX idx_customer_invoices_aging
    ON customer_invoices(tenant_id, status, invoice_date, customer_id);
";

const RECEIPTS_SQL: &str = r"
CREATE TABLE receipt_applications (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    receipt_id UUID NOT NULL,
    tenant_id UUID NOT NULL,
    invoice_id UUID NOT NULL REFERENCES customer_invoices(id),
    receipt_date DATE NOT NULL,
    amount NUMERIC(18, 2) NOT NULL CHECK (amount > 0),
    is_posted BOOLEAN NOT NULL DEFAULT false
);

CREATE INDEX idx_receipt_applications_invoice ON receipt_applications(tenant_id, invoice_id);
";

const CREDIT_NOTES_SQL: &str = r"
CREATE TABLE customer_credit_notes (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    credit_note_number VARCHAR(50) NOT NULL,
    customer_id UUID NOT NULL REFERENCES customers(id),
    invoice_id UUID REFERENCES customer_invoices(id),
    credit_note_date DATE NOT NULL,
    currency CHAR(3) NOT NULL,
    exchange_rate NUMERIC(19, 10) NOT NULL CHECK (exchange_rate > 0),
    total_amount NUMERIC(18, 2) NOT NULL CHECK (total_amount > 0),
    memo TEXT,
    status TEXT NOT NULL CHECK (status IN ('DRAFT', 'APPROVED', 'POSTED', 'VOID')),
    journal_entry_id UUID REFERENCES journal_entries(id),
    reversal_journal_entry_id UUID REFERENCES journal_entries(id),
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    approved_by UUID,
    approved_at TIMESTAMPTZ,
    posted_by UUID,
    posted_at TIMESTAMPTZ,
    voided_by UUID,
    voided_at TIMESTAMPTZ,
    void_reason TEXT,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (tenant_id, credit_note_number)
);

CREATE INDEX idx_customer_credit_notes_invoice
    ON customer_credit_notes(tenant_id, invoice_id) WHERE status = 'POSTED';

CREATE TABLE customer_credit_note_lines (
    credit_note_id UUID NOT NULL REFERENCES customer_credit_notes(id) ON DELETE CASCADE,
    line_number INTEGER NOT NULL CHECK (line_number > 0),
    tenant_id UUID NOT NULL,
    description TEXT NOT NULL,
    quantity NUMERIC(18, 4) NOT NULL CHECK (quantity > 0),
    unit_price NUMERIC(18, 4) NOT NULL CHECK (unit_price > 0),
    line_amount NUMERIC(18, 2) NOT NULL,
    revenue_account_id UUID NOT NULL REFERENCES accounts(id),
    project_id UUID REFERENCES dimensions(id),
    fund_id UUID REFERENCES dimensions(id),
    department_id UUID REFERENCES dimensions(id),
    PRIMARY KEY (credit_note_id, line_number)
);
";

const REFUNDS_SQL: &str = r"
CREATE TABLE customer_refunds (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    refund_number VARCHAR(50) NOT NULL,
    customer_id UUID NOT NULL REFERENCES customers(id),
    credit_note_id UUID NOT NULL REFERENCES customer_credit_notes(id),
    refund_date DATE NOT NULL,
    amount NUMERIC(18, 2) NOT NULL CHECK (amount > 0),
    payment_method TEXT NOT NULL CHECK (payment_method IN ('BANK', 'CASH')),
    bank_account_id UUID REFERENCES bank_accounts(id),
    currency CHAR(3) NOT NULL,
    exchange_rate NUMERIC(19, 10) NOT NULL CHECK (exchange_rate > 0),
    memo TEXT,
    status TEXT NOT NULL
        CHECK (status IN ('DRAFT', 'SUBMITTED', 'APPROVED', 'POSTED', 'VOID')),
    journal_entry_id UUID REFERENCES journal_entries(id),
    reversal_journal_entry_id UUID REFERENCES journal_entries(id),
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    submitted_by UUID,
    submitted_at TIMESTAMPTZ,
    approved_by UUID,
    approved_at TIMESTAMPTZ,
    posted_by UUID,
    posted_at TIMESTAMPTZ,
    voided_by UUID,
    voided_at TIMESTAMPTZ,
    void_reason TEXT,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_refund_bank CHECK (
        (payment_method = 'BANK' AND bank_account_id IS NOT NULL)
        OR (payment_method = 'CASH' AND bank_account_id IS NULL)
    ),
    UNIQUE (tenant_id, refund_number)
);

CREATE INDEX idx_customer_refunds_credit_note
    ON customer_refunds(tenant_id, credit_note_id) WHERE status = 'POSTED';
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS customer_refunds CASCADE;
DROP TABLE IF EXISTS customer_credit_note_lines CASCADE;
DROP TABLE IF EXISTS customer_credit_notes CASCADE;
DROP TABLE IF EXISTS receipt_applications CASCADE;
DROP TABLE IF EXISTS customer_invoices CASCADE;
DROP TABLE IF EXISTS journal_lines CASCADE;
DROP TABLE IF EXISTS journal_entries CASCADE;
DROP TABLE IF EXISTS dimensions CASCADE;
DROP TABLE IF EXISTS invoice_categories CASCADE;
DROP TABLE IF EXISTS bank_accounts CASCADE;
DROP TABLE IF EXISTS customers CASCADE;
DROP TABLE IF EXISTS document_sequences CASCADE;
DROP TABLE IF EXISTS accounting_periods CASCADE;
DROP TABLE IF EXISTS control_account_settings CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
";
