//! Receivables documents, master data, and creation inputs.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use receiva_shared::types::{
    AccountId, BankAccountId, CreditNoteId, CustomerId, InvoiceCategoryId, InvoiceId,
    JournalEntryId, ReceiptId, RefundId, TenantId, UserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::dimension::{DimensionKind, DimensionTags};
use crate::workflow::{CreditNoteStatus, InvoiceStatus, RefundStatus};

// ============================================================================
// Master data
// ============================================================================

/// A customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identifier.
    pub id: CustomerId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Customer code.
    pub code: String,
    /// Display name, used to sort aging rows.
    pub name: String,
    /// Inactive customers cannot receive new documents.
    pub is_active: bool,
}

/// A bank account linked to a GL cash account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    /// Unique identifier.
    pub id: BankAccountId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Display name.
    pub name: String,
    /// GL account money moves through.
    pub gl_account_id: AccountId,
    /// Inactive bank accounts cannot be paid from.
    pub is_active: bool,
}

/// Invoice category: decides the revenue account and required dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceCategory {
    /// Unique identifier.
    pub id: InvoiceCategoryId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Category code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Revenue account credited on posting.
    pub revenue_account_id: Option<AccountId>,
    /// Dimensions every invoice in this category must carry.
    pub required_dimensions: Vec<DimensionKind>,
    /// Inactive categories cannot be posted against.
    pub is_active: bool,
}

/// A posted-or-not receipt application against an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptApplication {
    /// Receipt the money came from.
    pub receipt_id: ReceiptId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Invoice the money was applied to.
    pub invoice_id: InvoiceId,
    /// Receipt date.
    pub receipt_date: NaiveDate,
    /// Applied amount.
    pub amount: Decimal,
    /// Only posted applications reduce the outstanding balance.
    pub is_posted: bool,
}

// ============================================================================
// Documents
// ============================================================================

/// A customer invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInvoice {
    /// Unique identifier.
    pub id: InvoiceId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Allocated number (e.g., "INV-000001").
    pub invoice_number: String,
    /// Billed customer.
    pub customer_id: CustomerId,
    /// Category deciding revenue account and dimensions.
    pub category_id: InvoiceCategoryId,
    /// Invoice date.
    pub invoice_date: NaiveDate,
    /// Due date.
    pub due_date: NaiveDate,
    /// ISO currency code.
    pub currency: String,
    /// Invoice total.
    pub total_amount: Decimal,
    /// Free-text description.
    pub description: Option<String>,
    /// Dimension tags.
    pub dimensions: DimensionTags,
    /// Lifecycle status.
    pub status: InvoiceStatus,
    /// Posting journal, once posted.
    pub journal_entry_id: Option<JournalEntryId>,
    /// Creator.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Poster.
    pub posted_by: Option<UserId>,
    /// Posting timestamp.
    pub posted_at: Option<DateTime<Utc>>,
}

/// One line of a credit note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditNoteLine {
    /// Position starting at 1.
    pub line_number: u32,
    /// Line description.
    pub description: String,
    /// Quantity credited.
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
    /// `round2(quantity * unit_price)`.
    pub line_amount: Decimal,
    /// Revenue account debited on posting.
    pub revenue_account_id: AccountId,
    /// Dimension tags.
    pub dimensions: DimensionTags,
}

/// A customer credit note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerCreditNote {
    /// Unique identifier.
    pub id: CreditNoteId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Allocated number (e.g., "CN-000001").
    pub credit_note_number: String,
    /// Credited customer.
    pub customer_id: CustomerId,
    /// Invoice being credited, if any.
    pub invoice_id: Option<InvoiceId>,
    /// Credit note date.
    pub credit_note_date: NaiveDate,
    /// ISO currency code.
    pub currency: String,
    /// Rate to the functional currency.
    pub exchange_rate: Decimal,
    /// Header total; must equal the rounded line sum.
    pub total_amount: Decimal,
    /// Free-text memo.
    pub memo: Option<String>,
    /// Lines.
    pub lines: Vec<CreditNoteLine>,
    /// Lifecycle status.
    pub status: CreditNoteStatus,
    /// Posting journal.
    pub journal_entry_id: Option<JournalEntryId>,
    /// Reversing journal created on void.
    pub reversal_journal_entry_id: Option<JournalEntryId>,
    /// Creator.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Approver.
    pub approved_by: Option<UserId>,
    /// Approval timestamp.
    pub approved_at: Option<DateTime<Utc>>,
    /// Poster.
    pub posted_by: Option<UserId>,
    /// Posting timestamp.
    pub posted_at: Option<DateTime<Utc>>,
    /// Voider.
    pub voided_by: Option<UserId>,
    /// Void timestamp.
    pub voided_at: Option<DateTime<Utc>>,
    /// Why the note was voided.
    pub void_reason: Option<String>,
}

/// How a refund is paid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Paid from a bank account.
    Bank,
    /// Paid in cash.
    Cash,
}

impl PaymentMethod {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bank => "BANK",
            Self::Cash => "CASH",
        }
    }

    /// Parses a payment method.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "BANK" => Some(Self::Bank),
            "CASH" => Some(Self::Cash),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer refund paid against a posted credit note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRefund {
    /// Unique identifier.
    pub id: RefundId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Allocated number (e.g., "RF-000001").
    pub refund_number: String,
    /// Refunded customer.
    pub customer_id: CustomerId,
    /// Credit note whose refundable balance this reduces.
    pub credit_note_id: CreditNoteId,
    /// Refund date.
    pub refund_date: NaiveDate,
    /// Refund amount.
    pub amount: Decimal,
    /// Bank or cash.
    pub payment_method: PaymentMethod,
    /// Paying bank account (BANK only).
    pub bank_account_id: Option<BankAccountId>,
    /// ISO currency code.
    pub currency: String,
    /// Rate to the functional currency.
    pub exchange_rate: Decimal,
    /// Free-text memo.
    pub memo: Option<String>,
    /// Lifecycle status.
    pub status: RefundStatus,
    /// Posting journal.
    pub journal_entry_id: Option<JournalEntryId>,
    /// Reversing journal created on void.
    pub reversal_journal_entry_id: Option<JournalEntryId>,
    /// Creator.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Submitter.
    pub submitted_by: Option<UserId>,
    /// Submission timestamp.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Approver.
    pub approved_by: Option<UserId>,
    /// Approval timestamp.
    pub approved_at: Option<DateTime<Utc>>,
    /// Poster.
    pub posted_by: Option<UserId>,
    /// Posting timestamp.
    pub posted_at: Option<DateTime<Utc>>,
    /// Voider.
    pub voided_by: Option<UserId>,
    /// Void timestamp.
    pub voided_at: Option<DateTime<Utc>>,
    /// Why the refund was voided.
    pub void_reason: Option<String>,
}

// ============================================================================
// Inputs
// ============================================================================

/// Input for creating an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateInvoiceInput {
    /// Billed customer.
    pub customer_id: CustomerId,
    /// Invoice category.
    pub category_id: InvoiceCategoryId,
    /// Invoice date.
    pub invoice_date: NaiveDate,
    /// Due date, on or after the invoice date.
    pub due_date: NaiveDate,
    /// ISO currency code.
    pub currency: String,
    /// Positive total.
    pub total_amount: Decimal,
    /// Free-text description.
    pub description: Option<String>,
    /// Dimension tags.
    #[serde(default)]
    pub dimensions: DimensionTags,
}

/// Input for one credit note line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditNoteLineInput {
    /// Line description.
    pub description: String,
    /// Positive quantity.
    pub quantity: Decimal,
    /// Positive unit price.
    pub unit_price: Decimal,
    /// INCOME account to debit on posting.
    pub revenue_account_id: AccountId,
    /// Dimension tags.
    #[serde(default)]
    pub dimensions: DimensionTags,
}

/// Input for creating a credit note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCreditNoteInput {
    /// Credited customer.
    pub customer_id: CustomerId,
    /// Invoice being credited, if any.
    pub invoice_id: Option<InvoiceId>,
    /// Credit note date.
    pub credit_note_date: NaiveDate,
    /// ISO currency code.
    pub currency: String,
    /// Positive rate to the functional currency.
    pub exchange_rate: Decimal,
    /// Header total; must equal the rounded line sum.
    pub total_amount: Decimal,
    /// Free-text memo.
    pub memo: Option<String>,
    /// At least one line.
    pub lines: Vec<CreditNoteLineInput>,
}

/// Input for creating a refund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRefundInput {
    /// Posted credit note to refund.
    pub credit_note_id: CreditNoteId,
    /// Refund date.
    pub refund_date: NaiveDate,
    /// Positive amount, at most the credit note's refundable balance.
    pub amount: Decimal,
    /// Bank or cash.
    pub payment_method: PaymentMethod,
    /// Required for BANK, rejected for CASH.
    pub bank_account_id: Option<BankAccountId>,
    /// Free-text memo.
    pub memo: Option<String>,
}
