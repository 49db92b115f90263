//! Repository seams.
//!
//! One async trait per entity family, every method scoped by an explicit
//! tenant id. A [`LedgerTransaction`] bundles them so a lifecycle
//! transition reads, locks, and writes inside a single unit of work; it
//! commits with [`LedgerTransaction::commit`] and rolls back when dropped.
//!
//! `lock_*` methods take a row-level lock held until the transaction ends.
//! Conditional `update_*`/`mark_*` methods fail with [`StoreError::Conflict`]
//! when the row is no longer in the expected status.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use receiva_shared::types::{
    AccountId, BankAccountId, CreditNoteId, CustomerId, DimensionId, InvoiceCategoryId, InvoiceId,
    JournalEntryId, RefundId, TenantId, UserId,
};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::dimension::{DimensionKind, DimensionRecord};
use crate::fiscal::AccountingPeriod;
use crate::ledger::{Account, ControlAccountRole, JournalEntry};
use crate::receivables::types::{
    BankAccount, Customer, CustomerCreditNote, CustomerInvoice, CustomerRefund, InvoiceCategory,
};
use crate::sequence::SequenceName;
use crate::workflow::{CreditNoteStatus, RefundStatus};

pub use memory::{LedgerState, MemoryLedger, MemoryTransaction};

/// Errors raised by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Row does not exist for this tenant.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind.
        entity: &'static str,
        /// Requested id.
        id: Uuid,
    },

    /// Conditional write lost a race, or the database reported a
    /// serialization failure.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other backend failure.
    #[error("Database error: {0}")]
    Database(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Chart of accounts and control account settings.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Loads an account.
    async fn find_account(&self, tenant_id: TenantId, id: AccountId) -> StoreResult<Option<Account>>;

    /// Reads the account configured for a control role.
    async fn control_account_setting(
        &self,
        tenant_id: TenantId,
        role: ControlAccountRole,
    ) -> StoreResult<Option<AccountId>>;
}

/// Accounting periods.
#[async_trait]
pub trait PeriodStore: Send + Sync {
    /// Finds every period whose `[start, end]` contains `date`, ordered by
    /// start date. More than one row means the periods overlap.
    async fn find_periods_containing(
        &self,
        tenant_id: TenantId,
        date: NaiveDate,
    ) -> StoreResult<Vec<AccountingPeriod>>;

    /// Finds the designated opening balances period.
    async fn opening_balance_period(&self, tenant_id: TenantId) -> StoreResult<Option<AccountingPeriod>>;
}

/// Per-tenant counters.
#[async_trait]
pub trait SequenceStore: Send + Sync {
    /// Atomically increments the counter and returns the new value.
    ///
    /// The first call for a (tenant, name) pair returns 1.
    async fn increment(&self, tenant_id: TenantId, name: SequenceName) -> StoreResult<i64>;
}

/// Read-only master data.
#[async_trait]
pub trait MasterDataStore: Send + Sync {
    /// Loads a customer.
    async fn find_customer(&self, tenant_id: TenantId, id: CustomerId) -> StoreResult<Option<Customer>>;

    /// Loads a bank account.
    async fn find_bank_account(
        &self,
        tenant_id: TenantId,
        id: BankAccountId,
    ) -> StoreResult<Option<BankAccount>>;

    /// Loads an invoice category.
    async fn find_invoice_category(
        &self,
        tenant_id: TenantId,
        id: InvoiceCategoryId,
    ) -> StoreResult<Option<InvoiceCategory>>;

    /// Loads a dimension record of the given kind.
    async fn find_dimension(
        &self,
        tenant_id: TenantId,
        kind: DimensionKind,
        id: DimensionId,
    ) -> StoreResult<Option<DimensionRecord>>;
}

/// Customer invoices.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Loads an invoice.
    async fn find_invoice(&self, tenant_id: TenantId, id: InvoiceId) -> StoreResult<Option<CustomerInvoice>>;

    /// Loads an invoice and locks its row.
    async fn lock_invoice(&self, tenant_id: TenantId, id: InvoiceId) -> StoreResult<Option<CustomerInvoice>>;

    /// Inserts a new invoice.
    async fn insert_invoice(&self, invoice: &CustomerInvoice) -> StoreResult<()>;

    /// Moves a DRAFT invoice to POSTED.
    async fn mark_invoice_posted(
        &self,
        tenant_id: TenantId,
        id: InvoiceId,
        journal_entry_id: JournalEntryId,
        posted_by: UserId,
        posted_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    /// Lists POSTED invoices dated on or before `as_of`.
    async fn list_posted_invoices(
        &self,
        tenant_id: TenantId,
        as_of: NaiveDate,
        customer_id: Option<CustomerId>,
    ) -> StoreResult<Vec<CustomerInvoice>>;
}

/// Receipt applications against invoices.
#[async_trait]
pub trait ReceiptStore: Send + Sync {
    /// Sums posted receipt applications for an invoice, optionally only
    /// those dated on or before `as_of`.
    async fn sum_posted_receipts_applied(
        &self,
        tenant_id: TenantId,
        invoice_id: InvoiceId,
        as_of: Option<NaiveDate>,
    ) -> StoreResult<Decimal>;
}

/// Customer credit notes.
#[async_trait]
pub trait CreditNoteStore: Send + Sync {
    /// Loads a credit note with its lines.
    async fn find_credit_note(
        &self,
        tenant_id: TenantId,
        id: CreditNoteId,
    ) -> StoreResult<Option<CustomerCreditNote>>;

    /// Loads a credit note and locks its row.
    async fn lock_credit_note(
        &self,
        tenant_id: TenantId,
        id: CreditNoteId,
    ) -> StoreResult<Option<CustomerCreditNote>>;

    /// Inserts a new credit note with its lines.
    async fn insert_credit_note(&self, note: &CustomerCreditNote) -> StoreResult<()>;

    /// Writes `note`'s status and lifecycle fields if the stored row is
    /// still in `expected`.
    async fn update_credit_note_status(
        &self,
        note: &CustomerCreditNote,
        expected: CreditNoteStatus,
    ) -> StoreResult<()>;

    /// Sums POSTED credit notes linked to an invoice.
    async fn sum_posted_credit_notes_for_invoice(
        &self,
        tenant_id: TenantId,
        invoice_id: InvoiceId,
        as_of: Option<NaiveDate>,
        excluding: Option<CreditNoteId>,
    ) -> StoreResult<Decimal>;
}

/// Customer refunds.
#[async_trait]
pub trait RefundStore: Send + Sync {
    /// Loads a refund.
    async fn find_refund(&self, tenant_id: TenantId, id: RefundId) -> StoreResult<Option<CustomerRefund>>;

    /// Loads a refund and locks its row.
    async fn lock_refund(&self, tenant_id: TenantId, id: RefundId) -> StoreResult<Option<CustomerRefund>>;

    /// Inserts a new refund.
    async fn insert_refund(&self, refund: &CustomerRefund) -> StoreResult<()>;

    /// Writes `refund`'s status and lifecycle fields if the stored row is
    /// still in `expected`.
    async fn update_refund_status(&self, refund: &CustomerRefund, expected: RefundStatus) -> StoreResult<()>;

    /// Sums POSTED refunds against a credit note.
    async fn sum_posted_refunds_for_credit_note(
        &self,
        tenant_id: TenantId,
        credit_note_id: CreditNoteId,
    ) -> StoreResult<Decimal>;
}

/// Journal entries.
#[async_trait]
pub trait JournalStore: Send + Sync {
    /// Inserts a journal with its lines.
    async fn insert_journal(&self, entry: &JournalEntry) -> StoreResult<()>;

    /// Loads a journal with its lines.
    async fn find_journal(&self, tenant_id: TenantId, id: JournalEntryId) -> StoreResult<Option<JournalEntry>>;

    /// Moves a REVIEWED journal to POSTED.
    async fn mark_journal_posted(
        &self,
        tenant_id: TenantId,
        id: JournalEntryId,
        posted_by: UserId,
        posted_at: DateTime<Utc>,
    ) -> StoreResult<()>;
}

/// One unit of work over every store.
#[async_trait]
pub trait LedgerTransaction:
    AccountStore
    + PeriodStore
    + SequenceStore
    + MasterDataStore
    + InvoiceStore
    + ReceiptStore
    + CreditNoteStore
    + RefundStore
    + JournalStore
    + Sized
{
    /// Publishes every write made in this transaction.
    async fn commit(self) -> StoreResult<()>;
}

/// Opens transactions.
#[async_trait]
pub trait LedgerDatabase: Send + Sync {
    /// Transaction type.
    type Tx: LedgerTransaction;

    /// Begins a transaction.
    async fn begin(&self) -> StoreResult<Self::Tx>;
}
