//! Receivables lifecycle service.
//!
//! Orchestrates every document transition:
//! period guard -> control account resolution -> balance ceiling ->
//! journal assembly -> general ledger posting -> document update.
//!
//! Each public operation runs in one store transaction. Nothing is written
//! until every check has passed, and a failure anywhere drops the
//! transaction so no number, journal, or status change survives.
//! Parent documents are row-locked before their balance is read
//! (credit note -> invoice, refund -> credit note).

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use receiva_shared::config::NumberingConfig;
use receiva_shared::types::{
    AccountId, BankAccountId, CreditNoteId, CustomerId, DimensionId, InvoiceId, JournalEntryId,
    RefundId, TenantId, UserId, is_valid_currency_code, round_money, sum_rounded,
};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use super::outstanding::{
    ensure_within, outstanding_for_invoice, refundable_for_credit_note,
};
use super::posting;
use super::types::{
    CreateCreditNoteInput, CreateInvoiceInput, CreateRefundInput, CreditNoteLine,
    CustomerCreditNote, CustomerInvoice, CustomerRefund, InvoiceCategory, PaymentMethod,
};
use crate::audit::{self, AuditAction, AuditEvent, AuditOutcome, AuditSink, TracingAuditSink};
use crate::dimension::{DimensionKind, DimensionRecord, DimensionTags, validate_dimensions};
use crate::error::{ReceivablesError, ReceivablesResult};
use crate::fiscal::{PeriodAction, PeriodGuard, PostingKind};
use crate::ledger::{
    Account, AccountType, ControlAccountResolver, ControlAccountRole, DraftJournal,
    GeneralLedger, JournalAssembler, JournalHeader, JournalLineInput, JournalType, PostedJournal,
    SourceDocument, SourceDocumentType, StoreGeneralLedger,
};
use crate::sequence::{SequenceAllocator, SequenceName};
use crate::store::{
    AccountStore, CreditNoteStore, InvoiceStore, JournalStore, LedgerDatabase, LedgerTransaction,
    MasterDataStore, RefundStore, StoreError,
};
use crate::workflow::{
    CreditNoteStatus, DocumentStatus, DocumentWorkflow, InvoiceStatus, RefundStatus, VoidDecision,
};

/// AR subledger lifecycle service.
pub struct ReceivablesService<D, G = StoreGeneralLedger, A = TracingAuditSink> {
    db: D,
    ledger: G,
    audit: A,
    numbering: NumberingConfig,
}

impl<D: LedgerDatabase> ReceivablesService<D> {
    /// Creates a service posting through [`StoreGeneralLedger`] and auditing
    /// through [`TracingAuditSink`].
    pub fn new(db: D) -> Self {
        Self::with_parts(db, StoreGeneralLedger, TracingAuditSink, NumberingConfig::default())
    }
}

impl<D, G, A> ReceivablesService<D, G, A>
where
    D: LedgerDatabase,
    G: GeneralLedger,
    A: AuditSink,
{
    /// Creates a service from explicit collaborators.
    pub fn with_parts(db: D, ledger: G, audit: A, numbering: NumberingConfig) -> Self {
        Self {
            db,
            ledger,
            audit,
            numbering,
        }
    }

    /// Replaces the numbering configuration.
    #[must_use]
    pub fn with_numbering(mut self, numbering: NumberingConfig) -> Self {
        self.numbering = numbering;
        self
    }

    /// The underlying database.
    pub fn database(&self) -> &D {
        &self.db
    }

    // ========================================================================
    // Invoices
    // ========================================================================

    /// Creates a DRAFT invoice with an allocated number.
    pub async fn create_invoice(
        &self,
        tenant_id: TenantId,
        input: CreateInvoiceInput,
        actor: UserId,
    ) -> ReceivablesResult<CustomerInvoice> {
        let result = self.create_invoice_inner(tenant_id, input, actor).await;
        let entity_id = result.as_ref().ok().map(|i| i.id.into_inner());
        self.record(tenant_id, AuditAction::Create, InvoiceStatus::ENTITY, entity_id, actor, None, &result);
        result
    }

    async fn create_invoice_inner(
        &self,
        tenant_id: TenantId,
        input: CreateInvoiceInput,
        actor: UserId,
    ) -> ReceivablesResult<CustomerInvoice> {
        let total = round_money(input.total_amount);
        ensure_positive(total, "Invoice total")?;
        ensure_currency(&input.currency)?;
        if input.due_date < input.invoice_date {
            return Err(ReceivablesError::ValidationFailed(
                "Due date cannot be before the invoice date".to_string(),
            ));
        }

        let tx = self.db.begin().await?;
        ensure_active_customer(&tx, tenant_id, input.customer_id).await?;
        let category = tx
            .find_invoice_category(tenant_id, input.category_id)
            .await?
            .ok_or_else(|| ReceivablesError::not_found("invoice category", input.category_id))?;
        if !category.is_active {
            return Err(ReceivablesError::ValidationFailed(format!(
                "Invoice category {} is inactive",
                category.code
            )));
        }
        PeriodGuard::assert_open(
            &tx,
            tenant_id,
            input.invoice_date,
            PeriodAction::Create,
            PostingKind::Operational,
        )
        .await?;

        let number = SequenceAllocator::next(&tx, tenant_id, SequenceName::CustomerInvoice).await?;
        let invoice = CustomerInvoice {
            id: InvoiceId::new(),
            tenant_id,
            invoice_number: self.numbering.format(&self.numbering.invoice_prefix, &number),
            customer_id: input.customer_id,
            category_id: input.category_id,
            invoice_date: input.invoice_date,
            due_date: input.due_date,
            currency: input.currency,
            total_amount: total,
            description: input.description,
            dimensions: input.dimensions,
            status: InvoiceStatus::Draft,
            journal_entry_id: None,
            created_by: actor,
            created_at: Utc::now(),
            posted_by: None,
            posted_at: None,
        };
        tx.insert_invoice(&invoice).await?;
        tx.commit().await?;

        info!(
            tenant_id = %tenant_id,
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            "Invoice created"
        );
        Ok(invoice)
    }

    /// Posts a DRAFT invoice: Dr AR control / Cr category revenue.
    pub async fn post_invoice(
        &self,
        tenant_id: TenantId,
        invoice_id: InvoiceId,
        actor: UserId,
    ) -> ReceivablesResult<CustomerInvoice> {
        let result = self.post_invoice_inner(tenant_id, invoice_id, actor).await;
        self.record(
            tenant_id,
            AuditAction::Post,
            InvoiceStatus::ENTITY,
            Some(invoice_id.into_inner()),
            actor,
            None,
            &result,
        );
        result
    }

    async fn post_invoice_inner(
        &self,
        tenant_id: TenantId,
        invoice_id: InvoiceId,
        actor: UserId,
    ) -> ReceivablesResult<CustomerInvoice> {
        let tx = self.db.begin().await?;
        let mut invoice = tx
            .lock_invoice(tenant_id, invoice_id)
            .await?
            .ok_or_else(|| ReceivablesError::not_found("invoice", invoice_id))?;
        let target = DocumentWorkflow::post_invoice(invoice.status)?;

        let category = tx
            .find_invoice_category(tenant_id, invoice.category_id)
            .await?
            .ok_or_else(|| ReceivablesError::not_found("invoice category", invoice.category_id))?;
        let revenue = revenue_account(&tx, tenant_id, &category).await?;

        let records = load_dimensions(&tx, tenant_id, &invoice.dimensions).await?;
        validate_dimensions(
            &invoice.dimensions,
            &category.required_dimensions,
            invoice.invoice_date,
            |kind, id| records.get(&(kind, id)).cloned(),
        )?;

        PeriodGuard::assert_open(
            &tx,
            tenant_id,
            invoice.invoice_date,
            PeriodAction::Post,
            PostingKind::Operational,
        )
        .await?;
        let ar_control =
            ControlAccountResolver::resolve(&tx, tenant_id, ControlAccountRole::ArControl).await?;

        let header = forward_header(
            tenant_id,
            invoice.invoice_date,
            &invoice.invoice_number,
            format!("Invoice {}", invoice.invoice_number),
            SourceDocument::new(SourceDocumentType::CustomerInvoice, invoice.id),
            actor,
        );
        let lines = posting::invoice_lines(&invoice, &ar_control, &revenue);
        let posted = self.assemble_and_post(&tx, header, lines, actor).await?;
        let posted_at = posted.entry().posted_at.unwrap_or_else(Utc::now);

        match tx
            .mark_invoice_posted(tenant_id, invoice.id, posted.id(), actor, posted_at)
            .await
        {
            Err(StoreError::Conflict(_)) => {
                let current = tx.find_invoice(tenant_id, invoice.id).await?.map(|i| i.status);
                return Err(status_conflict(current, target));
            }
            other => other?,
        }
        tx.commit().await?;

        invoice.status = target;
        invoice.journal_entry_id = Some(posted.id());
        invoice.posted_by = Some(actor);
        invoice.posted_at = Some(posted_at);

        info!(
            tenant_id = %tenant_id,
            invoice_id = %invoice.id,
            journal_id = %posted.id(),
            amount = %invoice.total_amount,
            "Invoice posted"
        );
        Ok(invoice)
    }

    /// Current outstanding balance of an invoice.
    pub async fn invoice_outstanding(
        &self,
        tenant_id: TenantId,
        invoice_id: InvoiceId,
    ) -> ReceivablesResult<Decimal> {
        let tx = self.db.begin().await?;
        let invoice = tx
            .find_invoice(tenant_id, invoice_id)
            .await?
            .ok_or_else(|| ReceivablesError::not_found("invoice", invoice_id))?;
        outstanding_for_invoice(&tx, tenant_id, &invoice, None, None).await
    }

    /// Loads an invoice.
    pub async fn get_invoice(
        &self,
        tenant_id: TenantId,
        invoice_id: InvoiceId,
    ) -> ReceivablesResult<CustomerInvoice> {
        let tx = self.db.begin().await?;
        tx.find_invoice(tenant_id, invoice_id)
            .await?
            .ok_or_else(|| ReceivablesError::not_found("invoice", invoice_id))
    }

    // ========================================================================
    // Credit notes
    // ========================================================================

    /// Creates a DRAFT credit note. Line amounts are `round2(quantity * unit_price)`
    /// and must sum to the header total.
    pub async fn create_credit_note(
        &self,
        tenant_id: TenantId,
        input: CreateCreditNoteInput,
        actor: UserId,
    ) -> ReceivablesResult<CustomerCreditNote> {
        let result = self.create_credit_note_inner(tenant_id, input, actor).await;
        let entity_id = result.as_ref().ok().map(|n| n.id.into_inner());
        self.record(tenant_id, AuditAction::Create, CreditNoteStatus::ENTITY, entity_id, actor, None, &result);
        result
    }

    async fn create_credit_note_inner(
        &self,
        tenant_id: TenantId,
        input: CreateCreditNoteInput,
        actor: UserId,
    ) -> ReceivablesResult<CustomerCreditNote> {
        ensure_currency(&input.currency)?;
        ensure_positive(input.exchange_rate, "Exchange rate")?;
        if input.lines.is_empty() {
            return Err(ReceivablesError::ValidationFailed(
                "Credit note needs at least one line".to_string(),
            ));
        }

        let mut lines = Vec::with_capacity(input.lines.len());
        for (index, line) in input.lines.into_iter().enumerate() {
            let line_number = u32::try_from(index + 1)
                .map_err(|_| ReceivablesError::ValidationFailed("Too many lines".to_string()))?;
            if line.description.trim().is_empty() {
                return Err(ReceivablesError::ValidationFailed(format!(
                    "Line {line_number}: description is required"
                )));
            }
            if line.quantity <= Decimal::ZERO || line.unit_price <= Decimal::ZERO {
                return Err(ReceivablesError::ValidationFailed(format!(
                    "Line {line_number}: quantity and unit price must be positive"
                )));
            }
            lines.push(CreditNoteLine {
                line_number,
                description: line.description,
                quantity: line.quantity,
                unit_price: line.unit_price,
                line_amount: round_money(line.quantity * line.unit_price),
                revenue_account_id: line.revenue_account_id,
                dimensions: line.dimensions,
            });
        }

        let total = round_money(input.total_amount);
        ensure_positive(total, "Credit note total")?;
        let line_total = sum_rounded(lines.iter().map(|l| l.line_amount));
        if line_total != total {
            return Err(ReceivablesError::ValidationFailed(format!(
                "Line total {line_total} does not match header total {total}"
            )));
        }

        let tx = self.db.begin().await?;
        ensure_active_customer(&tx, tenant_id, input.customer_id).await?;
        if let Some(invoice_id) = input.invoice_id {
            let invoice = tx
                .find_invoice(tenant_id, invoice_id)
                .await?
                .ok_or_else(|| ReceivablesError::not_found("invoice", invoice_id))?;
            if invoice.customer_id != input.customer_id {
                return Err(ReceivablesError::ValidationFailed(format!(
                    "Invoice {} belongs to a different customer",
                    invoice.invoice_number
                )));
            }
        }
        for line in &lines {
            let account = tx
                .find_account(tenant_id, line.revenue_account_id)
                .await?
                .ok_or_else(|| ReceivablesError::not_found("account", line.revenue_account_id))?;
            if account.account_type != AccountType::Income {
                return Err(ReceivablesError::ValidationFailed(format!(
                    "Line {}: account {} is {}, expected INCOME",
                    line.line_number, account.code, account.account_type
                )));
            }
        }
        PeriodGuard::assert_open(
            &tx,
            tenant_id,
            input.credit_note_date,
            PeriodAction::Create,
            PostingKind::Operational,
        )
        .await?;

        let number =
            SequenceAllocator::next(&tx, tenant_id, SequenceName::CustomerCreditNote).await?;
        let note = CustomerCreditNote {
            id: CreditNoteId::new(),
            tenant_id,
            credit_note_number: self.numbering.format(&self.numbering.credit_note_prefix, &number),
            customer_id: input.customer_id,
            invoice_id: input.invoice_id,
            credit_note_date: input.credit_note_date,
            currency: input.currency,
            exchange_rate: input.exchange_rate,
            total_amount: total,
            memo: input.memo,
            lines,
            status: CreditNoteStatus::Draft,
            journal_entry_id: None,
            reversal_journal_entry_id: None,
            created_by: actor,
            created_at: Utc::now(),
            approved_by: None,
            approved_at: None,
            posted_by: None,
            posted_at: None,
            voided_by: None,
            voided_at: None,
            void_reason: None,
        };
        tx.insert_credit_note(&note).await?;
        tx.commit().await?;

        info!(
            tenant_id = %tenant_id,
            credit_note_id = %note.id,
            credit_note_number = %note.credit_note_number,
            "Credit note created"
        );
        Ok(note)
    }

    /// DRAFT -> APPROVED, checking the linked invoice's outstanding balance.
    pub async fn approve_credit_note(
        &self,
        tenant_id: TenantId,
        credit_note_id: CreditNoteId,
        actor: UserId,
    ) -> ReceivablesResult<CustomerCreditNote> {
        let result = self.approve_credit_note_inner(tenant_id, credit_note_id, actor).await;
        self.record(
            tenant_id,
            AuditAction::Approve,
            CreditNoteStatus::ENTITY,
            Some(credit_note_id.into_inner()),
            actor,
            None,
            &result,
        );
        result
    }

    async fn approve_credit_note_inner(
        &self,
        tenant_id: TenantId,
        credit_note_id: CreditNoteId,
        actor: UserId,
    ) -> ReceivablesResult<CustomerCreditNote> {
        let tx = self.db.begin().await?;
        let mut note = lock_credit_note(&tx, tenant_id, credit_note_id).await?;
        let expected = note.status;
        let target = DocumentWorkflow::approve_credit_note(expected)?;

        PeriodGuard::assert_open(
            &tx,
            tenant_id,
            note.credit_note_date,
            PeriodAction::Create,
            PostingKind::Operational,
        )
        .await?;
        check_invoice_ceiling(&tx, tenant_id, &note).await?;

        note.status = target;
        note.approved_by = Some(actor);
        note.approved_at = Some(Utc::now());
        persist_credit_note(&tx, &note, expected).await?;
        tx.commit().await?;

        info!(tenant_id = %tenant_id, credit_note_id = %note.id, "Credit note approved");
        Ok(note)
    }

    /// APPROVED -> POSTED: Dr revenue per line / Cr AR control.
    pub async fn post_credit_note(
        &self,
        tenant_id: TenantId,
        credit_note_id: CreditNoteId,
        actor: UserId,
    ) -> ReceivablesResult<CustomerCreditNote> {
        let result = self.post_credit_note_inner(tenant_id, credit_note_id, actor).await;
        self.record(
            tenant_id,
            AuditAction::Post,
            CreditNoteStatus::ENTITY,
            Some(credit_note_id.into_inner()),
            actor,
            None,
            &result,
        );
        result
    }

    async fn post_credit_note_inner(
        &self,
        tenant_id: TenantId,
        credit_note_id: CreditNoteId,
        actor: UserId,
    ) -> ReceivablesResult<CustomerCreditNote> {
        let tx = self.db.begin().await?;
        let mut note = lock_credit_note(&tx, tenant_id, credit_note_id).await?;
        let expected = note.status;
        let target = DocumentWorkflow::post_credit_note(expected)?;

        let line_total = sum_rounded(note.lines.iter().map(|l| l.line_amount));
        if line_total != note.total_amount {
            return Err(ReceivablesError::ValidationFailed(format!(
                "Line total {line_total} does not match header total {}",
                note.total_amount
            )));
        }

        PeriodGuard::assert_open(
            &tx,
            tenant_id,
            note.credit_note_date,
            PeriodAction::Post,
            PostingKind::Operational,
        )
        .await?;
        check_invoice_ceiling(&tx, tenant_id, &note).await?;
        let ar_control =
            ControlAccountResolver::resolve(&tx, tenant_id, ControlAccountRole::ArControl).await?;

        let header = forward_header(
            tenant_id,
            note.credit_note_date,
            &note.credit_note_number,
            format!("Credit note {}", note.credit_note_number),
            SourceDocument::new(SourceDocumentType::CustomerCreditNote, note.id),
            actor,
        );
        let lines = posting::credit_note_lines(&note, &ar_control);
        let posted = self.assemble_and_post(&tx, header, lines, actor).await?;

        note.status = target;
        note.journal_entry_id = Some(posted.id());
        note.posted_by = Some(actor);
        note.posted_at = posted.entry().posted_at;
        persist_credit_note(&tx, &note, expected).await?;
        tx.commit().await?;

        info!(
            tenant_id = %tenant_id,
            credit_note_id = %note.id,
            journal_id = %posted.id(),
            amount = %note.total_amount,
            "Credit note posted"
        );
        Ok(note)
    }

    /// POSTED -> VOID through a reversing journal. Voiding a VOID note
    /// returns it unchanged.
    pub async fn void_credit_note(
        &self,
        tenant_id: TenantId,
        credit_note_id: CreditNoteId,
        reason: &str,
        actor: UserId,
    ) -> ReceivablesResult<CustomerCreditNote> {
        let result = self
            .void_credit_note_inner(tenant_id, credit_note_id, reason, actor)
            .await;
        self.record(
            tenant_id,
            AuditAction::Void,
            CreditNoteStatus::ENTITY,
            Some(credit_note_id.into_inner()),
            actor,
            Some(reason),
            &result,
        );
        result
    }

    async fn void_credit_note_inner(
        &self,
        tenant_id: TenantId,
        credit_note_id: CreditNoteId,
        reason: &str,
        actor: UserId,
    ) -> ReceivablesResult<CustomerCreditNote> {
        let tx = self.db.begin().await?;
        let mut note = lock_credit_note(&tx, tenant_id, credit_note_id).await?;
        if DocumentWorkflow::void_credit_note(note.status, reason)? == VoidDecision::AlreadyVoid {
            return Ok(note);
        }

        PeriodGuard::assert_open(
            &tx,
            tenant_id,
            note.credit_note_date,
            PeriodAction::Post,
            PostingKind::Operational,
        )
        .await?;

        let refunded = tx
            .sum_posted_refunds_for_credit_note(tenant_id, note.id)
            .await?;
        if refunded > Decimal::ZERO {
            return Err(ReceivablesError::ValidationFailed(format!(
                "Credit note {} has posted refunds of {refunded}; void them first",
                note.credit_note_number
            )));
        }

        let reversal = self
            .reverse_and_post(
                &tx,
                tenant_id,
                note.journal_entry_id,
                CreditNoteStatus::ENTITY,
                note.credit_note_date,
                actor,
            )
            .await?;

        let expected = note.status;
        note.status = CreditNoteStatus::Void;
        note.reversal_journal_entry_id = Some(reversal.id());
        note.voided_by = Some(actor);
        note.voided_at = Some(Utc::now());
        note.void_reason = Some(reason.trim().to_string());
        persist_credit_note(&tx, &note, expected).await?;
        tx.commit().await?;

        info!(
            tenant_id = %tenant_id,
            credit_note_id = %note.id,
            reversal_journal_id = %reversal.id(),
            "Credit note voided"
        );
        Ok(note)
    }

    /// Refundable balance of a credit note.
    pub async fn credit_note_refundable(
        &self,
        tenant_id: TenantId,
        credit_note_id: CreditNoteId,
    ) -> ReceivablesResult<Decimal> {
        let tx = self.db.begin().await?;
        let note = tx
            .find_credit_note(tenant_id, credit_note_id)
            .await?
            .ok_or_else(|| ReceivablesError::not_found("credit note", credit_note_id))?;
        refundable_for_credit_note(&tx, tenant_id, &note).await
    }

    /// Loads a credit note.
    pub async fn get_credit_note(
        &self,
        tenant_id: TenantId,
        credit_note_id: CreditNoteId,
    ) -> ReceivablesResult<CustomerCreditNote> {
        let tx = self.db.begin().await?;
        tx.find_credit_note(tenant_id, credit_note_id)
            .await?
            .ok_or_else(|| ReceivablesError::not_found("credit note", credit_note_id))
    }

    // ========================================================================
    // Refunds
    // ========================================================================

    /// Creates a DRAFT refund against a POSTED credit note.
    pub async fn create_refund(
        &self,
        tenant_id: TenantId,
        input: CreateRefundInput,
        actor: UserId,
    ) -> ReceivablesResult<CustomerRefund> {
        let result = self.create_refund_inner(tenant_id, input, actor).await;
        let entity_id = result.as_ref().ok().map(|r| r.id.into_inner());
        self.record(tenant_id, AuditAction::Create, RefundStatus::ENTITY, entity_id, actor, None, &result);
        result
    }

    async fn create_refund_inner(
        &self,
        tenant_id: TenantId,
        input: CreateRefundInput,
        actor: UserId,
    ) -> ReceivablesResult<CustomerRefund> {
        let amount = round_money(input.amount);
        ensure_positive(amount, "Refund amount")?;
        match (input.payment_method, input.bank_account_id) {
            (PaymentMethod::Bank, None) => {
                return Err(ReceivablesError::ValidationFailed(
                    "BANK refunds need a bank account".to_string(),
                ));
            }
            (PaymentMethod::Cash, Some(_)) => {
                return Err(ReceivablesError::ValidationFailed(
                    "CASH refunds cannot reference a bank account".to_string(),
                ));
            }
            _ => {}
        }

        let tx = self.db.begin().await?;
        let note = lock_credit_note(&tx, tenant_id, input.credit_note_id).await?;
        ensure_posted_credit_note(&note)?;
        if let Some(bank_account_id) = input.bank_account_id {
            bank_gl_account(&tx, tenant_id, bank_account_id).await?;
        }
        let refundable = refundable_for_credit_note(&tx, tenant_id, &note).await?;
        ensure_within(amount, refundable)?;
        PeriodGuard::assert_open(
            &tx,
            tenant_id,
            input.refund_date,
            PeriodAction::Create,
            PostingKind::Operational,
        )
        .await?;

        let number = SequenceAllocator::next(&tx, tenant_id, SequenceName::CustomerRefund).await?;
        let refund = CustomerRefund {
            id: RefundId::new(),
            tenant_id,
            refund_number: self.numbering.format(&self.numbering.refund_prefix, &number),
            customer_id: note.customer_id,
            credit_note_id: note.id,
            refund_date: input.refund_date,
            amount,
            payment_method: input.payment_method,
            bank_account_id: input.bank_account_id,
            currency: note.currency.clone(),
            exchange_rate: note.exchange_rate,
            memo: input.memo,
            status: RefundStatus::Draft,
            journal_entry_id: None,
            reversal_journal_entry_id: None,
            created_by: actor,
            created_at: Utc::now(),
            submitted_by: None,
            submitted_at: None,
            approved_by: None,
            approved_at: None,
            posted_by: None,
            posted_at: None,
            voided_by: None,
            voided_at: None,
            void_reason: None,
        };
        tx.insert_refund(&refund).await?;
        tx.commit().await?;

        info!(
            tenant_id = %tenant_id,
            refund_id = %refund.id,
            refund_number = %refund.refund_number,
            "Refund created"
        );
        Ok(refund)
    }

    /// DRAFT -> SUBMITTED.
    pub async fn submit_refund(
        &self,
        tenant_id: TenantId,
        refund_id: RefundId,
        actor: UserId,
    ) -> ReceivablesResult<CustomerRefund> {
        let result = self.submit_refund_inner(tenant_id, refund_id, actor).await;
        self.record(
            tenant_id,
            AuditAction::Submit,
            RefundStatus::ENTITY,
            Some(refund_id.into_inner()),
            actor,
            None,
            &result,
        );
        result
    }

    async fn submit_refund_inner(
        &self,
        tenant_id: TenantId,
        refund_id: RefundId,
        actor: UserId,
    ) -> ReceivablesResult<CustomerRefund> {
        let tx = self.db.begin().await?;
        let mut refund = lock_refund(&tx, tenant_id, refund_id).await?;
        let expected = refund.status;
        refund.status = DocumentWorkflow::submit_refund(expected)?;
        refund.submitted_by = Some(actor);
        refund.submitted_at = Some(Utc::now());
        persist_refund(&tx, &refund, expected).await?;
        tx.commit().await?;

        info!(tenant_id = %tenant_id, refund_id = %refund.id, "Refund submitted");
        Ok(refund)
    }

    /// SUBMITTED -> APPROVED.
    pub async fn approve_refund(
        &self,
        tenant_id: TenantId,
        refund_id: RefundId,
        actor: UserId,
    ) -> ReceivablesResult<CustomerRefund> {
        let result = self.approve_refund_inner(tenant_id, refund_id, actor).await;
        self.record(
            tenant_id,
            AuditAction::Approve,
            RefundStatus::ENTITY,
            Some(refund_id.into_inner()),
            actor,
            None,
            &result,
        );
        result
    }

    async fn approve_refund_inner(
        &self,
        tenant_id: TenantId,
        refund_id: RefundId,
        actor: UserId,
    ) -> ReceivablesResult<CustomerRefund> {
        let tx = self.db.begin().await?;
        let mut refund = lock_refund(&tx, tenant_id, refund_id).await?;
        let expected = refund.status;
        let target = DocumentWorkflow::approve_refund(expected)?;
        PeriodGuard::assert_open(
            &tx,
            tenant_id,
            refund.refund_date,
            PeriodAction::Create,
            PostingKind::Operational,
        )
        .await?;

        refund.status = target;
        refund.approved_by = Some(actor);
        refund.approved_at = Some(Utc::now());
        persist_refund(&tx, &refund, expected).await?;
        tx.commit().await?;

        info!(tenant_id = %tenant_id, refund_id = %refund.id, "Refund approved");
        Ok(refund)
    }

    /// APPROVED -> POSTED through the four-line clearing journal.
    pub async fn post_refund(
        &self,
        tenant_id: TenantId,
        refund_id: RefundId,
        actor: UserId,
    ) -> ReceivablesResult<CustomerRefund> {
        let result = self.post_refund_inner(tenant_id, refund_id, actor).await;
        self.record(
            tenant_id,
            AuditAction::Post,
            RefundStatus::ENTITY,
            Some(refund_id.into_inner()),
            actor,
            None,
            &result,
        );
        result
    }

    async fn post_refund_inner(
        &self,
        tenant_id: TenantId,
        refund_id: RefundId,
        actor: UserId,
    ) -> ReceivablesResult<CustomerRefund> {
        let tx = self.db.begin().await?;
        let mut refund = lock_refund(&tx, tenant_id, refund_id).await?;
        let expected = refund.status;
        let target = DocumentWorkflow::post_refund(expected)?;

        PeriodGuard::assert_open(
            &tx,
            tenant_id,
            refund.refund_date,
            PeriodAction::Post,
            PostingKind::Operational,
        )
        .await?;

        let note = lock_credit_note(&tx, tenant_id, refund.credit_note_id).await?;
        ensure_posted_credit_note(&note)?;
        let refundable = refundable_for_credit_note(&tx, tenant_id, &note).await?;
        ensure_within(refund.amount, refundable)?;

        let ar_control =
            ControlAccountResolver::resolve(&tx, tenant_id, ControlAccountRole::ArControl).await?;
        let clearing =
            ControlAccountResolver::resolve(&tx, tenant_id, ControlAccountRole::BankRefundClearing)
                .await?;
        let payment = match (refund.payment_method, refund.bank_account_id) {
            (PaymentMethod::Bank, Some(bank_account_id)) => {
                bank_gl_account(&tx, tenant_id, bank_account_id).await?
            }
            (PaymentMethod::Bank, None) => {
                return Err(ReceivablesError::ValidationFailed(
                    "BANK refunds need a bank account".to_string(),
                ));
            }
            (PaymentMethod::Cash, _) => {
                ControlAccountResolver::resolve(&tx, tenant_id, ControlAccountRole::CashClearing)
                    .await?
            }
        };

        let header = forward_header(
            tenant_id,
            refund.refund_date,
            &refund.refund_number,
            format!(
                "Refund {} against credit note {}",
                refund.refund_number, note.credit_note_number
            ),
            SourceDocument::new(SourceDocumentType::CustomerRefund, refund.id),
            actor,
        );
        let lines = posting::refund_lines(&refund, &ar_control, &clearing, &payment);
        let posted = self.assemble_and_post(&tx, header, lines, actor).await?;

        refund.status = target;
        refund.journal_entry_id = Some(posted.id());
        refund.posted_by = Some(actor);
        refund.posted_at = posted.entry().posted_at;
        persist_refund(&tx, &refund, expected).await?;
        tx.commit().await?;

        info!(
            tenant_id = %tenant_id,
            refund_id = %refund.id,
            journal_id = %posted.id(),
            amount = %refund.amount,
            payment_method = %refund.payment_method,
            "Refund posted"
        );
        Ok(refund)
    }

    /// POSTED -> VOID through the mirrored four-line journal. Voiding a VOID
    /// refund returns it unchanged.
    pub async fn void_refund(
        &self,
        tenant_id: TenantId,
        refund_id: RefundId,
        reason: &str,
        actor: UserId,
    ) -> ReceivablesResult<CustomerRefund> {
        let result = self.void_refund_inner(tenant_id, refund_id, reason, actor).await;
        self.record(
            tenant_id,
            AuditAction::Void,
            RefundStatus::ENTITY,
            Some(refund_id.into_inner()),
            actor,
            Some(reason),
            &result,
        );
        result
    }

    async fn void_refund_inner(
        &self,
        tenant_id: TenantId,
        refund_id: RefundId,
        reason: &str,
        actor: UserId,
    ) -> ReceivablesResult<CustomerRefund> {
        let tx = self.db.begin().await?;
        let mut refund = lock_refund(&tx, tenant_id, refund_id).await?;
        if DocumentWorkflow::void_refund(refund.status, reason)? == VoidDecision::AlreadyVoid {
            return Ok(refund);
        }

        PeriodGuard::assert_open(
            &tx,
            tenant_id,
            refund.refund_date,
            PeriodAction::Post,
            PostingKind::Operational,
        )
        .await?;

        let reversal = self
            .reverse_and_post(
                &tx,
                tenant_id,
                refund.journal_entry_id,
                RefundStatus::ENTITY,
                refund.refund_date,
                actor,
            )
            .await?;

        let expected = refund.status;
        refund.status = RefundStatus::Void;
        refund.reversal_journal_entry_id = Some(reversal.id());
        refund.voided_by = Some(actor);
        refund.voided_at = Some(Utc::now());
        refund.void_reason = Some(reason.trim().to_string());
        persist_refund(&tx, &refund, expected).await?;
        tx.commit().await?;

        info!(
            tenant_id = %tenant_id,
            refund_id = %refund.id,
            reversal_journal_id = %reversal.id(),
            "Refund voided"
        );
        Ok(refund)
    }

    /// Loads a refund.
    pub async fn get_refund(
        &self,
        tenant_id: TenantId,
        refund_id: RefundId,
    ) -> ReceivablesResult<CustomerRefund> {
        let tx = self.db.begin().await?;
        tx.find_refund(tenant_id, refund_id)
            .await?
            .ok_or_else(|| ReceivablesError::not_found("refund", refund_id))
    }

    // ========================================================================
    // Journals
    // ========================================================================

    async fn assemble_and_post(
        &self,
        tx: &D::Tx,
        header: JournalHeader,
        lines: Vec<JournalLineInput>,
        actor: UserId,
    ) -> ReceivablesResult<PostedJournal> {
        let tenant_id = header.tenant_id;
        let accounts = load_accounts(tx, tenant_id, lines.iter().map(|l| l.account_id)).await?;
        let draft = JournalAssembler::assemble(
            header,
            lines,
            |id| accounts.get(&id).cloned(),
            Utc::now(),
        )?;
        self.post_draft(tx, tenant_id, draft, actor).await
    }

    async fn reverse_and_post(
        &self,
        tx: &D::Tx,
        tenant_id: TenantId,
        original_id: Option<JournalEntryId>,
        entity: &'static str,
        entry_date: NaiveDate,
        actor: UserId,
    ) -> ReceivablesResult<PostedJournal> {
        let original_id = original_id.ok_or_else(|| {
            ReceivablesError::ValidationFailed(format!("Posted {entity} has no posting journal"))
        })?;
        let original = tx
            .find_journal(tenant_id, original_id)
            .await?
            .ok_or_else(|| ReceivablesError::not_found("journal", original_id))?;
        let accounts =
            load_accounts(tx, tenant_id, original.lines.iter().map(|l| l.account_id)).await?;
        let draft = JournalAssembler::reverse(
            &original,
            entry_date,
            actor,
            |id| accounts.get(&id).cloned(),
            Utc::now(),
        )?;
        self.post_draft(tx, tenant_id, draft, actor).await
    }

    async fn post_draft(
        &self,
        tx: &D::Tx,
        tenant_id: TenantId,
        draft: DraftJournal,
        actor: UserId,
    ) -> ReceivablesResult<PostedJournal> {
        let journal_id = draft.id();
        tx.insert_journal(draft.entry()).await?;
        self.ledger.post_journal(tx, tenant_id, journal_id, actor).await
    }

    // ========================================================================
    // Audit
    // ========================================================================

    #[allow(clippy::too_many_arguments)]
    fn record<T>(
        &self,
        tenant_id: TenantId,
        action: AuditAction,
        entity_type: &'static str,
        entity_id: Option<Uuid>,
        actor: UserId,
        reason: Option<&str>,
        result: &ReceivablesResult<T>,
    ) {
        let reason = match result {
            Ok(_) => reason.map(str::to_string),
            Err(err) => {
                warn!(
                    tenant_id = %tenant_id,
                    action = action.as_str(),
                    entity_type,
                    entity_id = ?entity_id,
                    error_code = err.error_code(),
                    error = %err,
                    "Transition rejected"
                );
                Some(err.to_string())
            }
        };

        audit::emit(
            &self.audit,
            &AuditEvent {
                tenant_id,
                action,
                entity_type,
                entity_id,
                outcome: AuditOutcome::of(result),
                actor,
                reason,
                occurred_at: Utc::now(),
            },
        );
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn ensure_positive(amount: Decimal, what: &str) -> ReceivablesResult<()> {
    if amount <= Decimal::ZERO {
        return Err(ReceivablesError::ValidationFailed(format!(
            "{what} must be positive"
        )));
    }
    Ok(())
}

fn ensure_currency(code: &str) -> ReceivablesResult<()> {
    if !is_valid_currency_code(code) {
        return Err(ReceivablesError::ValidationFailed(format!(
            "Invalid currency code: {code}"
        )));
    }
    Ok(())
}

fn ensure_posted_credit_note(note: &CustomerCreditNote) -> ReceivablesResult<()> {
    if note.status != CreditNoteStatus::Posted {
        return Err(ReceivablesError::ValidationFailed(format!(
            "Credit note {} is {}; refunds need a POSTED credit note",
            note.credit_note_number, note.status
        )));
    }
    Ok(())
}

fn forward_header(
    tenant_id: TenantId,
    entry_date: NaiveDate,
    reference: &str,
    memo: String,
    source: SourceDocument,
    created_by: UserId,
) -> JournalHeader {
    JournalHeader {
        tenant_id,
        entry_date,
        reference: reference.to_string(),
        memo,
        journal_type: JournalType::Standard,
        source,
        reverses_journal_id: None,
        created_by,
    }
}

fn status_conflict<S: DocumentStatus>(current: Option<S>, attempted: S) -> ReceivablesError {
    let current = current.map_or_else(|| "MISSING".to_string(), |s| s.to_string());
    ReceivablesError::invalid_status(S::ENTITY, current, attempted)
}

async fn ensure_active_customer<S>(
    store: &S,
    tenant_id: TenantId,
    customer_id: CustomerId,
) -> ReceivablesResult<()>
where
    S: MasterDataStore + ?Sized,
{
    let customer = store
        .find_customer(tenant_id, customer_id)
        .await?
        .ok_or_else(|| ReceivablesError::not_found("customer", customer_id))?;
    if !customer.is_active {
        return Err(ReceivablesError::ValidationFailed(format!(
            "Customer {} is inactive",
            customer.code
        )));
    }
    Ok(())
}

async fn lock_credit_note<S>(
    store: &S,
    tenant_id: TenantId,
    id: CreditNoteId,
) -> ReceivablesResult<CustomerCreditNote>
where
    S: CreditNoteStore + ?Sized,
{
    store
        .lock_credit_note(tenant_id, id)
        .await?
        .ok_or_else(|| ReceivablesError::not_found("credit note", id))
}

async fn lock_refund<S>(store: &S, tenant_id: TenantId, id: RefundId) -> ReceivablesResult<CustomerRefund>
where
    S: RefundStore + ?Sized,
{
    store
        .lock_refund(tenant_id, id)
        .await?
        .ok_or_else(|| ReceivablesError::not_found("refund", id))
}

async fn persist_credit_note<S>(
    store: &S,
    note: &CustomerCreditNote,
    expected: CreditNoteStatus,
) -> ReceivablesResult<()>
where
    S: CreditNoteStore + ?Sized,
{
    match store.update_credit_note_status(note, expected).await {
        Err(StoreError::Conflict(_)) => {
            let current = store
                .find_credit_note(note.tenant_id, note.id)
                .await?
                .map(|n| n.status);
            Err(status_conflict(current, note.status))
        }
        other => Ok(other?),
    }
}

async fn persist_refund<S>(
    store: &S,
    refund: &CustomerRefund,
    expected: RefundStatus,
) -> ReceivablesResult<()>
where
    S: RefundStore + ?Sized,
{
    match store.update_refund_status(refund, expected).await {
        Err(StoreError::Conflict(_)) => {
            let current = store
                .find_refund(refund.tenant_id, refund.id)
                .await?
                .map(|r| r.status);
            Err(status_conflict(current, refund.status))
        }
        other => Ok(other?),
    }
}

/// Locks the linked invoice and checks the note against its outstanding
/// balance (excluding the note itself).
async fn check_invoice_ceiling<S>(
    store: &S,
    tenant_id: TenantId,
    note: &CustomerCreditNote,
) -> ReceivablesResult<()>
where
    S: LedgerTransaction,
{
    let Some(invoice_id) = note.invoice_id else {
        return Ok(());
    };
    let invoice = store
        .lock_invoice(tenant_id, invoice_id)
        .await?
        .ok_or_else(|| ReceivablesError::not_found("invoice", invoice_id))?;
    if invoice.status != InvoiceStatus::Posted {
        return Err(ReceivablesError::ValidationFailed(format!(
            "Invoice {} is {}; only POSTED invoices can be credited",
            invoice.invoice_number, invoice.status
        )));
    }
    let outstanding = outstanding_for_invoice(store, tenant_id, &invoice, None, Some(note.id)).await?;
    ensure_within(note.total_amount, outstanding)
}

/// The category's revenue account, which must be an active INCOME account.
async fn revenue_account<S>(
    store: &S,
    tenant_id: TenantId,
    category: &InvoiceCategory,
) -> ReceivablesResult<Account>
where
    S: AccountStore + ?Sized,
{
    let subject = format!("invoice category {}", category.code);
    let invalid = |reason: String| ReceivablesError::ConfigurationInvalid {
        subject: subject.clone(),
        reason,
    };

    if !category.is_active {
        return Err(invalid("category is inactive".to_string()));
    }
    let account_id = category
        .revenue_account_id
        .ok_or_else(|| ReceivablesError::ConfigurationMissing(format!("Revenue account for {subject}")))?;
    let account = store
        .find_account(tenant_id, account_id)
        .await?
        .ok_or_else(|| invalid("revenue account does not exist".to_string()))?;
    if account.account_type != AccountType::Income {
        return Err(invalid(format!(
            "revenue account {} is {}, expected INCOME",
            account.code, account.account_type
        )));
    }
    if !account.can_post() {
        return Err(invalid(format!(
            "revenue account {} is inactive or does not allow posting",
            account.code
        )));
    }
    Ok(account)
}

/// The GL account behind a bank account, which must be an active ASSET account.
async fn bank_gl_account<S>(
    store: &S,
    tenant_id: TenantId,
    bank_account_id: BankAccountId,
) -> ReceivablesResult<Account>
where
    S: MasterDataStore + AccountStore + ?Sized,
{
    let bank = store
        .find_bank_account(tenant_id, bank_account_id)
        .await?
        .ok_or_else(|| ReceivablesError::not_found("bank account", bank_account_id))?;
    let subject = format!("bank account {}", bank.name);
    let invalid = |reason: String| ReceivablesError::ConfigurationInvalid {
        subject: subject.clone(),
        reason,
    };

    if !bank.is_active {
        return Err(invalid("bank account is inactive".to_string()));
    }
    let account = store
        .find_account(tenant_id, bank.gl_account_id)
        .await?
        .ok_or_else(|| invalid("linked GL account does not exist".to_string()))?;
    if account.account_type != AccountType::Asset || !account.can_post() {
        return Err(invalid(format!(
            "linked GL account {} must be an active ASSET account",
            account.code
        )));
    }
    Ok(account)
}

async fn load_accounts<S, I>(
    store: &S,
    tenant_id: TenantId,
    ids: I,
) -> ReceivablesResult<HashMap<AccountId, Account>>
where
    S: AccountStore + ?Sized,
    I: IntoIterator<Item = AccountId>,
{
    let mut accounts = HashMap::new();
    for id in ids {
        if accounts.contains_key(&id) {
            continue;
        }
        if let Some(account) = store.find_account(tenant_id, id).await? {
            accounts.insert(id, account);
        }
    }
    Ok(accounts)
}

async fn load_dimensions<S>(
    store: &S,
    tenant_id: TenantId,
    tags: &DimensionTags,
) -> ReceivablesResult<HashMap<(DimensionKind, DimensionId), DimensionRecord>>
where
    S: MasterDataStore + ?Sized,
{
    let mut records = HashMap::new();
    for (kind, id) in tags.iter() {
        if let Some(record) = store.find_dimension(tenant_id, kind, id).await? {
            records.insert((kind, id), record);
        }
    }
    Ok(records)
}
