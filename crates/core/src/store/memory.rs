//! In-memory store.
//!
//! A transaction takes the ledger-wide lock and works on a private copy of
//! the state. `commit` publishes the copy; dropping the transaction discards
//! it, including any sequence values it allocated. Used by the test suite
//! and local tooling.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use receiva_shared::types::{
    AccountId, BankAccountId, CreditNoteId, CustomerId, DimensionId, InvoiceCategoryId, InvoiceId,
    JournalEntryId, RefundId, TenantId, UserId, sum_rounded,
};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};

use super::{
    AccountStore, CreditNoteStore, InvoiceStore, JournalStore, LedgerDatabase, LedgerTransaction,
    MasterDataStore, PeriodStore, ReceiptStore, RefundStore, SequenceStore, StoreError,
    StoreResult,
};
use crate::dimension::{DimensionKind, DimensionRecord};
use crate::fiscal::AccountingPeriod;
use crate::ledger::{Account, ControlAccountRole, JournalEntry, JournalStatus};
use crate::receivables::types::{
    BankAccount, Customer, CustomerCreditNote, CustomerInvoice, CustomerRefund, InvoiceCategory,
    ReceiptApplication,
};
use crate::sequence::SequenceName;
use crate::workflow::{CreditNoteStatus, InvoiceStatus, RefundStatus};

/// Everything the in-memory store holds.
#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    /// Accounts by id.
    pub accounts: HashMap<AccountId, Account>,
    /// Control account settings.
    pub control_accounts: HashMap<(TenantId, ControlAccountRole), AccountId>,
    /// Accounting periods.
    pub periods: Vec<AccountingPeriod>,
    /// Sequence counters.
    pub sequences: HashMap<(TenantId, SequenceName), i64>,
    /// Customers by id.
    pub customers: HashMap<CustomerId, Customer>,
    /// Bank accounts by id.
    pub bank_accounts: HashMap<BankAccountId, BankAccount>,
    /// Invoice categories by id.
    pub invoice_categories: HashMap<InvoiceCategoryId, InvoiceCategory>,
    /// Dimension records by id.
    pub dimensions: HashMap<DimensionId, DimensionRecord>,
    /// Invoices by id.
    pub invoices: HashMap<InvoiceId, CustomerInvoice>,
    /// Receipt applications.
    pub receipt_applications: Vec<ReceiptApplication>,
    /// Credit notes by id.
    pub credit_notes: HashMap<CreditNoteId, CustomerCreditNote>,
    /// Refunds by id.
    pub refunds: HashMap<RefundId, CustomerRefund>,
    /// Journals by id.
    pub journals: HashMap<JournalEntryId, JournalEntry>,
}

impl LedgerState {
    /// Journals belonging to a tenant, oldest first.
    #[must_use]
    pub fn journals_for(&self, tenant_id: TenantId) -> Vec<&JournalEntry> {
        let mut journals: Vec<_> = self
            .journals
            .values()
            .filter(|j| j.tenant_id == tenant_id)
            .collect();
        journals.sort_by_key(|j| j.id);
        journals
    }
}

/// Shared in-memory ledger.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl MemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger holding `state`.
    #[must_use]
    pub fn with_state(state: LedgerState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Mutates committed state directly (seeding master data in tests).
    pub async fn seed<F>(&self, f: F)
    where
        F: FnOnce(&mut LedgerState),
    {
        f(&mut *self.state.lock().await);
    }

    /// Copy of the committed state.
    pub async fn snapshot(&self) -> LedgerState {
        self.state.lock().await.clone()
    }
}

#[async_trait]
impl LedgerDatabase for MemoryLedger {
    type Tx = MemoryTransaction;

    async fn begin(&self) -> StoreResult<MemoryTransaction> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = Mutex::new(guard.clone());
        Ok(MemoryTransaction { guard, working })
    }
}

/// Transaction over a [`MemoryLedger`].
#[derive(Debug)]
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<LedgerState>,
    working: Mutex<LedgerState>,
}

impl MemoryTransaction {
    async fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.working.lock().await
    }
}

#[async_trait]
impl LedgerTransaction for MemoryTransaction {
    async fn commit(self) -> StoreResult<()> {
        let Self { mut guard, working } = self;
        *guard = working.into_inner();
        Ok(())
    }
}

#[async_trait]
impl AccountStore for MemoryTransaction {
    async fn find_account(&self, tenant_id: TenantId, id: AccountId) -> StoreResult<Option<Account>> {
        let state = self.state().await;
        Ok(state
            .accounts
            .get(&id)
            .filter(|a| a.tenant_id == tenant_id)
            .cloned())
    }

    async fn control_account_setting(
        &self,
        tenant_id: TenantId,
        role: ControlAccountRole,
    ) -> StoreResult<Option<AccountId>> {
        let state = self.state().await;
        Ok(state.control_accounts.get(&(tenant_id, role)).copied())
    }
}

#[async_trait]
impl PeriodStore for MemoryTransaction {
    async fn find_periods_containing(
        &self,
        tenant_id: TenantId,
        date: NaiveDate,
    ) -> StoreResult<Vec<AccountingPeriod>> {
        let state = self.state().await;
        let mut periods: Vec<_> = state
            .periods
            .iter()
            .filter(|p| p.tenant_id == tenant_id && p.contains_date(date))
            .cloned()
            .collect();
        periods.sort_by_key(|p| p.start_date);
        Ok(periods)
    }

    async fn opening_balance_period(&self, tenant_id: TenantId) -> StoreResult<Option<AccountingPeriod>> {
        let state = self.state().await;
        Ok(state
            .periods
            .iter()
            .find(|p| p.tenant_id == tenant_id && p.is_opening_balance)
            .cloned())
    }
}

#[async_trait]
impl SequenceStore for MemoryTransaction {
    async fn increment(&self, tenant_id: TenantId, name: SequenceName) -> StoreResult<i64> {
        let mut state = self.state().await;
        let value = state.sequences.entry((tenant_id, name)).or_insert(0);
        *value += 1;
        Ok(*value)
    }
}

#[async_trait]
impl MasterDataStore for MemoryTransaction {
    async fn find_customer(&self, tenant_id: TenantId, id: CustomerId) -> StoreResult<Option<Customer>> {
        let state = self.state().await;
        Ok(state
            .customers
            .get(&id)
            .filter(|c| c.tenant_id == tenant_id)
            .cloned())
    }

    async fn find_bank_account(
        &self,
        tenant_id: TenantId,
        id: BankAccountId,
    ) -> StoreResult<Option<BankAccount>> {
        let state = self.state().await;
        Ok(state
            .bank_accounts
            .get(&id)
            .filter(|b| b.tenant_id == tenant_id)
            .cloned())
    }

    async fn find_invoice_category(
        &self,
        tenant_id: TenantId,
        id: InvoiceCategoryId,
    ) -> StoreResult<Option<InvoiceCategory>> {
        let state = self.state().await;
        Ok(state
            .invoice_categories
            .get(&id)
            .filter(|c| c.tenant_id == tenant_id)
            .cloned())
    }

    async fn find_dimension(
        &self,
        tenant_id: TenantId,
        kind: DimensionKind,
        id: DimensionId,
    ) -> StoreResult<Option<DimensionRecord>> {
        let state = self.state().await;
        Ok(state
            .dimensions
            .get(&id)
            .filter(|d| d.tenant_id == tenant_id && d.kind == kind)
            .cloned())
    }
}

#[async_trait]
impl InvoiceStore for MemoryTransaction {
    async fn find_invoice(&self, tenant_id: TenantId, id: InvoiceId) -> StoreResult<Option<CustomerInvoice>> {
        let state = self.state().await;
        Ok(state
            .invoices
            .get(&id)
            .filter(|i| i.tenant_id == tenant_id)
            .cloned())
    }

    async fn lock_invoice(&self, tenant_id: TenantId, id: InvoiceId) -> StoreResult<Option<CustomerInvoice>> {
        // The transaction already holds the ledger-wide lock.
        self.find_invoice(tenant_id, id).await
    }

    async fn insert_invoice(&self, invoice: &CustomerInvoice) -> StoreResult<()> {
        let mut state = self.state().await;
        if state.invoices.contains_key(&invoice.id) {
            return Err(StoreError::Conflict(format!("invoice {} already exists", invoice.id)));
        }
        state.invoices.insert(invoice.id, invoice.clone());
        Ok(())
    }

    async fn mark_invoice_posted(
        &self,
        tenant_id: TenantId,
        id: InvoiceId,
        journal_entry_id: JournalEntryId,
        posted_by: UserId,
        posted_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut state = self.state().await;
        let invoice = state
            .invoices
            .get_mut(&id)
            .filter(|i| i.tenant_id == tenant_id)
            .ok_or(StoreError::NotFound {
                entity: "invoice",
                id: id.into_inner(),
            })?;
        if invoice.status != InvoiceStatus::Draft {
            return Err(StoreError::Conflict(format!("invoice {id} is {}", invoice.status)));
        }
        invoice.status = InvoiceStatus::Posted;
        invoice.journal_entry_id = Some(journal_entry_id);
        invoice.posted_by = Some(posted_by);
        invoice.posted_at = Some(posted_at);
        Ok(())
    }

    async fn list_posted_invoices(
        &self,
        tenant_id: TenantId,
        as_of: NaiveDate,
        customer_id: Option<CustomerId>,
    ) -> StoreResult<Vec<CustomerInvoice>> {
        let state = self.state().await;
        let mut invoices: Vec<_> = state
            .invoices
            .values()
            .filter(|i| {
                i.tenant_id == tenant_id
                    && i.status == InvoiceStatus::Posted
                    && i.invoice_date <= as_of
                    && customer_id.is_none_or(|c| i.customer_id == c)
            })
            .cloned()
            .collect();
        invoices.sort_by(|a, b| (a.invoice_date, a.id).cmp(&(b.invoice_date, b.id)));
        Ok(invoices)
    }
}

#[async_trait]
impl ReceiptStore for MemoryTransaction {
    async fn sum_posted_receipts_applied(
        &self,
        tenant_id: TenantId,
        invoice_id: InvoiceId,
        as_of: Option<NaiveDate>,
    ) -> StoreResult<Decimal> {
        let state = self.state().await;
        Ok(sum_rounded(
            state
                .receipt_applications
                .iter()
                .filter(|r| {
                    r.tenant_id == tenant_id
                        && r.invoice_id == invoice_id
                        && r.is_posted
                        && as_of.is_none_or(|d| r.receipt_date <= d)
                })
                .map(|r| r.amount),
        ))
    }
}

#[async_trait]
impl CreditNoteStore for MemoryTransaction {
    async fn find_credit_note(
        &self,
        tenant_id: TenantId,
        id: CreditNoteId,
    ) -> StoreResult<Option<CustomerCreditNote>> {
        let state = self.state().await;
        Ok(state
            .credit_notes
            .get(&id)
            .filter(|n| n.tenant_id == tenant_id)
            .cloned())
    }

    async fn lock_credit_note(
        &self,
        tenant_id: TenantId,
        id: CreditNoteId,
    ) -> StoreResult<Option<CustomerCreditNote>> {
        self.find_credit_note(tenant_id, id).await
    }

    async fn insert_credit_note(&self, note: &CustomerCreditNote) -> StoreResult<()> {
        let mut state = self.state().await;
        if state.credit_notes.contains_key(&note.id) {
            return Err(StoreError::Conflict(format!("credit note {} already exists", note.id)));
        }
        state.credit_notes.insert(note.id, note.clone());
        Ok(())
    }

    async fn update_credit_note_status(
        &self,
        note: &CustomerCreditNote,
        expected: CreditNoteStatus,
    ) -> StoreResult<()> {
        let mut state = self.state().await;
        let stored = state
            .credit_notes
            .get_mut(&note.id)
            .filter(|n| n.tenant_id == note.tenant_id)
            .ok_or(StoreError::NotFound {
                entity: "credit note",
                id: note.id.into_inner(),
            })?;
        if stored.status != expected {
            return Err(StoreError::Conflict(format!(
                "credit note {} is {}, expected {expected}",
                note.id, stored.status
            )));
        }
        *stored = note.clone();
        Ok(())
    }

    async fn sum_posted_credit_notes_for_invoice(
        &self,
        tenant_id: TenantId,
        invoice_id: InvoiceId,
        as_of: Option<NaiveDate>,
        excluding: Option<CreditNoteId>,
    ) -> StoreResult<Decimal> {
        let state = self.state().await;
        Ok(sum_rounded(
            state
                .credit_notes
                .values()
                .filter(|n| {
                    n.tenant_id == tenant_id
                        && n.invoice_id == Some(invoice_id)
                        && n.status == CreditNoteStatus::Posted
                        && as_of.is_none_or(|d| n.credit_note_date <= d)
                        && excluding != Some(n.id)
                })
                .map(|n| n.total_amount),
        ))
    }
}

#[async_trait]
impl RefundStore for MemoryTransaction {
    async fn find_refund(&self, tenant_id: TenantId, id: RefundId) -> StoreResult<Option<CustomerRefund>> {
        let state = self.state().await;
        Ok(state
            .refunds
            .get(&id)
            .filter(|r| r.tenant_id == tenant_id)
            .cloned())
    }

    async fn lock_refund(&self, tenant_id: TenantId, id: RefundId) -> StoreResult<Option<CustomerRefund>> {
        self.find_refund(tenant_id, id).await
    }

    async fn insert_refund(&self, refund: &CustomerRefund) -> StoreResult<()> {
        let mut state = self.state().await;
        if state.refunds.contains_key(&refund.id) {
            return Err(StoreError::Conflict(format!("refund {} already exists", refund.id)));
        }
        state.refunds.insert(refund.id, refund.clone());
        Ok(())
    }

    async fn update_refund_status(&self, refund: &CustomerRefund, expected: RefundStatus) -> StoreResult<()> {
        let mut state = self.state().await;
        let stored = state
            .refunds
            .get_mut(&refund.id)
            .filter(|r| r.tenant_id == refund.tenant_id)
            .ok_or(StoreError::NotFound {
                entity: "refund",
                id: refund.id.into_inner(),
            })?;
        if stored.status != expected {
            return Err(StoreError::Conflict(format!(
                "refund {} is {}, expected {expected}",
                refund.id, stored.status
            )));
        }
        *stored = refund.clone();
        Ok(())
    }

    async fn sum_posted_refunds_for_credit_note(
        &self,
        tenant_id: TenantId,
        credit_note_id: CreditNoteId,
    ) -> StoreResult<Decimal> {
        let state = self.state().await;
        Ok(sum_rounded(
            state
                .refunds
                .values()
                .filter(|r| {
                    r.tenant_id == tenant_id
                        && r.credit_note_id == credit_note_id
                        && r.status == RefundStatus::Posted
                })
                .map(|r| r.amount),
        ))
    }
}

#[async_trait]
impl JournalStore for MemoryTransaction {
    async fn insert_journal(&self, entry: &JournalEntry) -> StoreResult<()> {
        let mut state = self.state().await;
        if state.journals.contains_key(&entry.id) {
            return Err(StoreError::Conflict(format!("journal {} already exists", entry.id)));
        }
        state.journals.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn find_journal(&self, tenant_id: TenantId, id: JournalEntryId) -> StoreResult<Option<JournalEntry>> {
        let state = self.state().await;
        Ok(state
            .journals
            .get(&id)
            .filter(|j| j.tenant_id == tenant_id)
            .cloned())
    }

    async fn mark_journal_posted(
        &self,
        tenant_id: TenantId,
        id: JournalEntryId,
        posted_by: UserId,
        posted_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut state = self.state().await;
        let journal = state
            .journals
            .get_mut(&id)
            .filter(|j| j.tenant_id == tenant_id)
            .ok_or(StoreError::NotFound {
                entity: "journal",
                id: id.into_inner(),
            })?;
        if journal.status != JournalStatus::Reviewed {
            return Err(StoreError::Conflict(format!("journal {id} is {}", journal.status)));
        }
        journal.status = JournalStatus::Posted;
        journal.posted_by = Some(posted_by);
        journal.posted_at = Some(posted_at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{AccountType, NormalBalance};

    fn account(tenant_id: TenantId) -> Account {
        Account {
            id: AccountId::new(),
            tenant_id,
            code: "1100".to_string(),
            name: "AR".to_string(),
            account_type: AccountType::Asset,
            normal_balance: NormalBalance::Debit,
            is_active: true,
            is_posting_allowed: true,
        }
    }

    #[tokio::test]
    async fn test_reads_are_tenant_scoped() {
        let ledger = MemoryLedger::new();
        let tenant = TenantId::new();
        let acc = account(tenant);
        let id = acc.id;
        ledger.seed(|s| {
            s.accounts.insert(id, acc);
        })
        .await;

        let tx = ledger.begin().await.unwrap();
        assert!(tx.find_account(tenant, id).await.unwrap().is_some());
        assert!(tx.find_account(TenantId::new(), id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_commit_publishes_and_drop_discards() {
        let ledger = MemoryLedger::new();
        let tenant = TenantId::new();

        let tx = ledger.begin().await.unwrap();
        tx.increment(tenant, SequenceName::CustomerInvoice).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(
            ledger.snapshot().await.sequences.get(&(tenant, SequenceName::CustomerInvoice)),
            Some(&1)
        );

        let tx = ledger.begin().await.unwrap();
        tx.increment(tenant, SequenceName::CustomerInvoice).await.unwrap();
        drop(tx);
        assert_eq!(
            ledger.snapshot().await.sequences.get(&(tenant, SequenceName::CustomerInvoice)),
            Some(&1)
        );
    }
}
