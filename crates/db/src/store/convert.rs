//! Row <-> domain conversions.
//!
//! Status and classification columns hold the domain's string forms; an
//! unknown value is reported as a database error rather than guessed.

use chrono::{DateTime, Utc};
use receiva_core::dimension::{DimensionKind, DimensionRecord, DimensionTags};
use receiva_core::fiscal::{AccountingPeriod, PeriodStatus};
use receiva_core::ledger::{
    Account, AccountType, JournalEntry, JournalLine, JournalStatus, JournalType, NormalBalance,
    SourceDocument, SourceDocumentType,
};
use receiva_core::receivables::{
    BankAccount, CreditNoteLine, Customer, CustomerCreditNote, CustomerInvoice, CustomerRefund,
    InvoiceCategory, PaymentMethod,
};
use receiva_core::store::{StoreError, StoreResult};
use receiva_core::workflow::{CreditNoteStatus, InvoiceStatus, RefundStatus};
use sea_orm::prelude::{DateTimeWithTimeZone, Json};
use sea_orm::Set;
use uuid::Uuid;

use crate::entities::{
    accounting_periods, accounts, bank_accounts, customer_credit_note_lines, customer_credit_notes,
    customer_invoices, customer_refunds, customers, dimensions, invoice_categories,
    journal_entries, journal_lines,
};

fn parse<T>(value: &str, what: &str, parser: fn(&str) -> Option<T>) -> StoreResult<T> {
    parser(value).ok_or_else(|| StoreError::Database(format!("Unknown {what} '{value}'")))
}

fn utc(value: DateTimeWithTimeZone) -> DateTime<Utc> {
    value.with_timezone(&Utc)
}

fn tz(value: DateTime<Utc>) -> DateTimeWithTimeZone {
    value.into()
}

fn line_number(value: i32) -> StoreResult<u32> {
    u32::try_from(value).map_err(|_| StoreError::Database(format!("Invalid line number {value}")))
}

fn line_number_column(value: u32) -> StoreResult<i32> {
    i32::try_from(value).map_err(|_| StoreError::Database(format!("Invalid line number {value}")))
}

fn tags(project: Option<Uuid>, fund: Option<Uuid>, department: Option<Uuid>) -> DimensionTags {
    DimensionTags {
        project_id: project.map(Into::into),
        fund_id: fund.map(Into::into),
        department_id: department.map(Into::into),
    }
}

// ============================================================================
// Master data
// ============================================================================

pub(crate) fn account(model: accounts::Model) -> StoreResult<Account> {
    Ok(Account {
        id: model.id.into(),
        tenant_id: model.tenant_id.into(),
        code: model.code,
        name: model.name,
        account_type: parse(&model.account_type, "account type", AccountType::parse)?,
        normal_balance: parse(&model.normal_balance, "normal balance", NormalBalance::parse)?,
        is_active: model.is_active,
        is_posting_allowed: model.is_posting_allowed,
    })
}

pub(crate) fn period(model: accounting_periods::Model) -> StoreResult<AccountingPeriod> {
    Ok(AccountingPeriod {
        id: model.id.into(),
        tenant_id: model.tenant_id.into(),
        code: model.code,
        start_date: model.start_date,
        end_date: model.end_date,
        status: parse(&model.status, "period status", PeriodStatus::parse)?,
        is_opening_balance: model.is_opening_balance,
    })
}

pub(crate) fn customer(model: customers::Model) -> Customer {
    Customer {
        id: model.id.into(),
        tenant_id: model.tenant_id.into(),
        code: model.code,
        name: model.name,
        is_active: model.is_active,
    }
}

pub(crate) fn bank_account(model: bank_accounts::Model) -> BankAccount {
    BankAccount {
        id: model.id.into(),
        tenant_id: model.tenant_id.into(),
        name: model.name,
        gl_account_id: model.gl_account_id.into(),
        is_active: model.is_active,
    }
}

/// Reads a JSON array of dimension kind strings.
pub(crate) fn dimension_kinds(value: &Json) -> StoreResult<Vec<DimensionKind>> {
    let items = value.as_array().ok_or_else(|| {
        StoreError::Database("required_dimensions must be a JSON array".to_string())
    })?;
    items
        .iter()
        .map(|item| {
            let s = item.as_str().ok_or_else(|| {
                StoreError::Database(format!("Invalid dimension kind {item}"))
            })?;
            parse(s, "dimension kind", DimensionKind::parse)
        })
        .collect()
}

/// Writes dimension kinds as a JSON array of strings.
pub(crate) fn dimension_kinds_json(kinds: &[DimensionKind]) -> Json {
    Json::Array(
        kinds
            .iter()
            .map(|k| Json::String(k.as_str().to_string()))
            .collect(),
    )
}

pub(crate) fn invoice_category(model: invoice_categories::Model) -> StoreResult<InvoiceCategory> {
    Ok(InvoiceCategory {
        id: model.id.into(),
        tenant_id: model.tenant_id.into(),
        required_dimensions: dimension_kinds(&model.required_dimensions)?,
        code: model.code,
        name: model.name,
        revenue_account_id: model.revenue_account_id.map(Into::into),
        is_active: model.is_active,
    })
}

pub(crate) fn dimension(model: dimensions::Model) -> StoreResult<DimensionRecord> {
    Ok(DimensionRecord {
        id: model.id.into(),
        tenant_id: model.tenant_id.into(),
        kind: parse(&model.kind, "dimension kind", DimensionKind::parse)?,
        code: model.code,
        name: model.name,
        is_active: model.is_active,
        effective_from: model.effective_from,
        effective_to: model.effective_to,
    })
}

// ============================================================================
// Invoices
// ============================================================================

pub(crate) fn invoice(model: customer_invoices::Model) -> StoreResult<CustomerInvoice> {
    Ok(CustomerInvoice {
        id: model.id.into(),
        tenant_id: model.tenant_id.into(),
        invoice_number: model.invoice_number,
        customer_id: model.customer_id.into(),
        category_id: model.category_id.into(),
        invoice_date: model.invoice_date,
        due_date: model.due_date,
        currency: model.currency,
        total_amount: model.total_amount,
        description: model.description,
        dimensions: tags(model.project_id, model.fund_id, model.department_id),
        status: parse(&model.status, "invoice status", InvoiceStatus::parse)?,
        journal_entry_id: model.journal_entry_id.map(Into::into),
        created_by: model.created_by.into(),
        created_at: utc(model.created_at),
        posted_by: model.posted_by.map(Into::into),
        posted_at: model.posted_at.map(utc),
    })
}

pub(crate) fn invoice_active_model(
    invoice: &CustomerInvoice,
    now: DateTime<Utc>,
) -> customer_invoices::ActiveModel {
    customer_invoices::ActiveModel {
        id: Set(invoice.id.into_inner()),
        tenant_id: Set(invoice.tenant_id.into_inner()),
        invoice_number: Set(invoice.invoice_number.clone()),
        customer_id: Set(invoice.customer_id.into_inner()),
        category_id: Set(invoice.category_id.into_inner()),
        invoice_date: Set(invoice.invoice_date),
        due_date: Set(invoice.due_date),
        currency: Set(invoice.currency.clone()),
        total_amount: Set(invoice.total_amount),
        description: Set(invoice.description.clone()),
        project_id: Set(invoice.dimensions.project_id.map(Into::into)),
        fund_id: Set(invoice.dimensions.fund_id.map(Into::into)),
        department_id: Set(invoice.dimensions.department_id.map(Into::into)),
        status: Set(invoice.status.as_str().to_string()),
        journal_entry_id: Set(invoice.journal_entry_id.map(Into::into)),
        created_by: Set(invoice.created_by.into_inner()),
        created_at: Set(tz(invoice.created_at)),
        posted_by: Set(invoice.posted_by.map(Into::into)),
        posted_at: Set(invoice.posted_at.map(tz)),
        updated_at: Set(tz(now)),
    }
}

// ============================================================================
// Credit notes
// ============================================================================

pub(crate) fn credit_note(
    model: customer_credit_notes::Model,
    lines: Vec<customer_credit_note_lines::Model>,
) -> StoreResult<CustomerCreditNote> {
    let lines = lines
        .into_iter()
        .map(|line| {
            Ok(CreditNoteLine {
                line_number: line_number(line.line_number)?,
                description: line.description,
                quantity: line.quantity,
                unit_price: line.unit_price,
                line_amount: line.line_amount,
                revenue_account_id: line.revenue_account_id.into(),
                dimensions: tags(line.project_id, line.fund_id, line.department_id),
            })
        })
        .collect::<StoreResult<Vec<_>>>()?;

    Ok(CustomerCreditNote {
        id: model.id.into(),
        tenant_id: model.tenant_id.into(),
        credit_note_number: model.credit_note_number,
        customer_id: model.customer_id.into(),
        invoice_id: model.invoice_id.map(Into::into),
        credit_note_date: model.credit_note_date,
        currency: model.currency,
        exchange_rate: model.exchange_rate,
        total_amount: model.total_amount,
        memo: model.memo,
        lines,
        status: parse(&model.status, "credit note status", CreditNoteStatus::parse)?,
        journal_entry_id: model.journal_entry_id.map(Into::into),
        reversal_journal_entry_id: model.reversal_journal_entry_id.map(Into::into),
        created_by: model.created_by.into(),
        created_at: utc(model.created_at),
        approved_by: model.approved_by.map(Into::into),
        approved_at: model.approved_at.map(utc),
        posted_by: model.posted_by.map(Into::into),
        posted_at: model.posted_at.map(utc),
        voided_by: model.voided_by.map(Into::into),
        voided_at: model.voided_at.map(utc),
        void_reason: model.void_reason,
    })
}

pub(crate) fn credit_note_active_model(
    note: &CustomerCreditNote,
    now: DateTime<Utc>,
) -> customer_credit_notes::ActiveModel {
    customer_credit_notes::ActiveModel {
        id: Set(note.id.into_inner()),
        tenant_id: Set(note.tenant_id.into_inner()),
        credit_note_number: Set(note.credit_note_number.clone()),
        customer_id: Set(note.customer_id.into_inner()),
        invoice_id: Set(note.invoice_id.map(Into::into)),
        credit_note_date: Set(note.credit_note_date),
        currency: Set(note.currency.clone()),
        exchange_rate: Set(note.exchange_rate),
        total_amount: Set(note.total_amount),
        memo: Set(note.memo.clone()),
        created_by: Set(note.created_by.into_inner()),
        created_at: Set(tz(note.created_at)),
        ..credit_note_status_model(note, now)
    }
}

/// Only the columns a status transition may change.
pub(crate) fn credit_note_status_model(
    note: &CustomerCreditNote,
    now: DateTime<Utc>,
) -> customer_credit_notes::ActiveModel {
    customer_credit_notes::ActiveModel {
        status: Set(note.status.as_str().to_string()),
        journal_entry_id: Set(note.journal_entry_id.map(Into::into)),
        reversal_journal_entry_id: Set(note.reversal_journal_entry_id.map(Into::into)),
        approved_by: Set(note.approved_by.map(Into::into)),
        approved_at: Set(note.approved_at.map(tz)),
        posted_by: Set(note.posted_by.map(Into::into)),
        posted_at: Set(note.posted_at.map(tz)),
        voided_by: Set(note.voided_by.map(Into::into)),
        voided_at: Set(note.voided_at.map(tz)),
        void_reason: Set(note.void_reason.clone()),
        updated_at: Set(tz(now)),
        ..Default::default()
    }
}

pub(crate) fn credit_note_line_active_models(
    note: &CustomerCreditNote,
) -> StoreResult<Vec<customer_credit_note_lines::ActiveModel>> {
    note.lines
        .iter()
        .map(|line| {
            Ok(customer_credit_note_lines::ActiveModel {
                credit_note_id: Set(note.id.into_inner()),
                line_number: Set(line_number_column(line.line_number)?),
                tenant_id: Set(note.tenant_id.into_inner()),
                description: Set(line.description.clone()),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
                line_amount: Set(line.line_amount),
                revenue_account_id: Set(line.revenue_account_id.into_inner()),
                project_id: Set(line.dimensions.project_id.map(Into::into)),
                fund_id: Set(line.dimensions.fund_id.map(Into::into)),
                department_id: Set(line.dimensions.department_id.map(Into::into)),
            })
        })
        .collect()
}

// ============================================================================
// Refunds
// ============================================================================

pub(crate) fn refund(model: customer_refunds::Model) -> StoreResult<CustomerRefund> {
    Ok(CustomerRefund {
        id: model.id.into(),
        tenant_id: model.tenant_id.into(),
        refund_number: model.refund_number,
        customer_id: model.customer_id.into(),
        credit_note_id: model.credit_note_id.into(),
        refund_date: model.refund_date,
        amount: model.amount,
        payment_method: parse(&model.payment_method, "payment method", PaymentMethod::parse)?,
        bank_account_id: model.bank_account_id.map(Into::into),
        currency: model.currency,
        exchange_rate: model.exchange_rate,
        memo: model.memo,
        status: parse(&model.status, "refund status", RefundStatus::parse)?,
        journal_entry_id: model.journal_entry_id.map(Into::into),
        reversal_journal_entry_id: model.reversal_journal_entry_id.map(Into::into),
        created_by: model.created_by.into(),
        created_at: utc(model.created_at),
        submitted_by: model.submitted_by.map(Into::into),
        submitted_at: model.submitted_at.map(utc),
        approved_by: model.approved_by.map(Into::into),
        approved_at: model.approved_at.map(utc),
        posted_by: model.posted_by.map(Into::into),
        posted_at: model.posted_at.map(utc),
        voided_by: model.voided_by.map(Into::into),
        voided_at: model.voided_at.map(utc),
        void_reason: model.void_reason,
    })
}

pub(crate) fn refund_active_model(
    refund: &CustomerRefund,
    now: DateTime<Utc>,
) -> customer_refunds::ActiveModel {
    customer_refunds::ActiveModel {
        id: Set(refund.id.into_inner()),
        tenant_id: Set(refund.tenant_id.into_inner()),
        refund_number: Set(refund.refund_number.clone()),
        customer_id: Set(refund.customer_id.into_inner()),
        credit_note_id: Set(refund.credit_note_id.into_inner()),
        refund_date: Set(refund.refund_date),
        amount: Set(refund.amount),
        payment_method: Set(refund.payment_method.as_str().to_string()),
        bank_account_id: Set(refund.bank_account_id.map(Into::into)),
        currency: Set(refund.currency.clone()),
        exchange_rate: Set(refund.exchange_rate),
        memo: Set(refund.memo.clone()),
        created_by: Set(refund.created_by.into_inner()),
        created_at: Set(tz(refund.created_at)),
        ..refund_status_model(refund, now)
    }
}

/// Only the columns a status transition may change.
pub(crate) fn refund_status_model(
    refund: &CustomerRefund,
    now: DateTime<Utc>,
) -> customer_refunds::ActiveModel {
    customer_refunds::ActiveModel {
        status: Set(refund.status.as_str().to_string()),
        journal_entry_id: Set(refund.journal_entry_id.map(Into::into)),
        reversal_journal_entry_id: Set(refund.reversal_journal_entry_id.map(Into::into)),
        submitted_by: Set(refund.submitted_by.map(Into::into)),
        submitted_at: Set(refund.submitted_at.map(tz)),
        approved_by: Set(refund.approved_by.map(Into::into)),
        approved_at: Set(refund.approved_at.map(tz)),
        posted_by: Set(refund.posted_by.map(Into::into)),
        posted_at: Set(refund.posted_at.map(tz)),
        voided_by: Set(refund.voided_by.map(Into::into)),
        voided_at: Set(refund.voided_at.map(tz)),
        void_reason: Set(refund.void_reason.clone()),
        updated_at: Set(tz(now)),
        ..Default::default()
    }
}

// ============================================================================
// Journals
// ============================================================================

pub(crate) fn journal(
    model: journal_entries::Model,
    lines: Vec<journal_lines::Model>,
) -> StoreResult<JournalEntry> {
    let lines = lines
        .into_iter()
        .map(|line| {
            Ok(JournalLine {
                line_number: line_number(line.line_number)?,
                account_id: line.account_id.into(),
                debit: line.debit,
                credit: line.credit,
                description: line.description,
                dimensions: tags(line.project_id, line.fund_id, line.department_id),
            })
        })
        .collect::<StoreResult<Vec<_>>>()?;

    Ok(JournalEntry {
        id: model.id.into(),
        tenant_id: model.tenant_id.into(),
        entry_date: model.entry_date,
        reference: model.reference,
        memo: model.memo,
        status: parse(&model.status, "journal status", JournalStatus::parse)?,
        journal_type: parse(&model.journal_type, "journal type", JournalType::parse)?,
        source: SourceDocument {
            document_type: parse(&model.source_type, "source type", SourceDocumentType::parse)?,
            document_id: model.source_id,
        },
        reverses_journal_id: model.reverses_journal_id.map(Into::into),
        lines,
        created_by: model.created_by.into(),
        created_at: utc(model.created_at),
        posted_by: model.posted_by.map(Into::into),
        posted_at: model.posted_at.map(utc),
    })
}

pub(crate) fn journal_active_model(entry: &JournalEntry) -> journal_entries::ActiveModel {
    journal_entries::ActiveModel {
        id: Set(entry.id.into_inner()),
        tenant_id: Set(entry.tenant_id.into_inner()),
        entry_date: Set(entry.entry_date),
        reference: Set(entry.reference.clone()),
        memo: Set(entry.memo.clone()),
        status: Set(entry.status.as_str().to_string()),
        journal_type: Set(entry.journal_type.as_str().to_string()),
        source_type: Set(entry.source.document_type.as_str().to_string()),
        source_id: Set(entry.source.document_id),
        reverses_journal_id: Set(entry.reverses_journal_id.map(Into::into)),
        created_by: Set(entry.created_by.into_inner()),
        created_at: Set(tz(entry.created_at)),
        posted_by: Set(entry.posted_by.map(Into::into)),
        posted_at: Set(entry.posted_at.map(tz)),
    }
}

pub(crate) fn journal_line_active_models(
    entry: &JournalEntry,
) -> StoreResult<Vec<journal_lines::ActiveModel>> {
    entry
        .lines
        .iter()
        .map(|line| {
            Ok(journal_lines::ActiveModel {
                journal_entry_id: Set(entry.id.into_inner()),
                line_number: Set(line_number_column(line.line_number)?),
                tenant_id: Set(entry.tenant_id.into_inner()),
                account_id: Set(line.account_id.into_inner()),
                debit: Set(line.debit),
                credit: Set(line.credit),
                description: Set(line.description.clone()),
                project_id: Set(line.dimensions.project_id.map(Into::into)),
                fund_id: Set(line.dimensions.fund_id.map(Into::into)),
                department_id: Set(line.dimensions.department_id.map(Into::into)),
            })
        })
        .collect()
}
