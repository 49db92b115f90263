//! Journal domain types.
//!
//! A journal moves through DRAFT -> REVIEWED -> POSTED. The assembler only
//! ever produces REVIEWED journals; the general ledger port is the only
//! thing that marks one POSTED.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use receiva_shared::types::{AccountId, JournalEntryId, TenantId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dimension::DimensionTags;

/// Journal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JournalStatus {
    /// Being drafted.
    Draft,
    /// Checked and ready to post.
    Reviewed,
    /// Posted to the general ledger (immutable).
    Posted,
}

impl JournalStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Reviewed => "REVIEWED",
            Self::Posted => "POSTED",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "DRAFT" => Some(Self::Draft),
            "REVIEWED" => Some(Self::Reviewed),
            "POSTED" => Some(Self::Posted),
            _ => None,
        }
    }
}

impl fmt::Display for JournalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Journal type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JournalType {
    /// Forward posting of a document.
    Standard,
    /// Mirror image of a previously posted journal.
    Reversing,
}

impl JournalType {
    /// Returns the string representation of the type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::Reversing => "REVERSING",
        }
    }

    /// Parses a type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "STANDARD" => Some(Self::Standard),
            "REVERSING" => Some(Self::Reversing),
            _ => None,
        }
    }
}

/// The kind of subledger document a journal was produced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceDocumentType {
    /// Customer invoice.
    CustomerInvoice,
    /// Customer credit note.
    CustomerCreditNote,
    /// Customer refund.
    CustomerRefund,
}

impl SourceDocumentType {
    /// Returns the string representation of the type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CustomerInvoice => "CUSTOMER_INVOICE",
            Self::CustomerCreditNote => "CUSTOMER_CREDIT_NOTE",
            Self::CustomerRefund => "CUSTOMER_REFUND",
        }
    }

    /// Parses a type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "CUSTOMER_INVOICE" => Some(Self::CustomerInvoice),
            "CUSTOMER_CREDIT_NOTE" => Some(Self::CustomerCreditNote),
            "CUSTOMER_REFUND" => Some(Self::CustomerRefund),
            _ => None,
        }
    }
}

/// Back-reference from a journal to the document that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Document kind.
    pub document_type: SourceDocumentType,
    /// Document id.
    pub document_id: Uuid,
}

impl SourceDocument {
    /// Creates a source reference.
    #[must_use]
    pub fn new(document_type: SourceDocumentType, document_id: impl Into<Uuid>) -> Self {
        Self {
            document_type,
            document_id: document_id.into(),
        }
    }
}

/// A line submitted to the assembler.
///
/// Amounts may carry more than two decimals; the assembler rounds them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalLineInput {
    /// Account to post to.
    pub account_id: AccountId,
    /// Debit amount (zero if credit line).
    pub debit: Decimal,
    /// Credit amount (zero if debit line).
    pub credit: Decimal,
    /// Optional line description.
    pub description: Option<String>,
    /// Dimension tags.
    pub dimensions: DimensionTags,
}

impl JournalLineInput {
    /// Creates a debit line.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: amount,
            credit: Decimal::ZERO,
            description: None,
            dimensions: DimensionTags::default(),
        }
    }

    /// Creates a credit line.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: Decimal::ZERO,
            credit: amount,
            description: None,
            dimensions: DimensionTags::default(),
        }
    }

    /// Attaches a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attaches dimension tags.
    #[must_use]
    pub const fn with_dimensions(mut self, dimensions: DimensionTags) -> Self {
        self.dimensions = dimensions;
        self
    }
}

/// A validated journal line (rounded, exactly one side non-zero).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Position within the journal, starting at 1.
    pub line_number: u32,
    /// Account posted to.
    pub account_id: AccountId,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Optional line description.
    pub description: Option<String>,
    /// Dimension tags.
    pub dimensions: DimensionTags,
}

/// Header data for a journal being assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalHeader {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Accounting date.
    pub entry_date: NaiveDate,
    /// Reference (usually the document number).
    pub reference: String,
    /// Free-text memo.
    pub memo: String,
    /// Standard or reversing.
    pub journal_type: JournalType,
    /// Document that produced this journal.
    pub source: SourceDocument,
    /// Journal this one reverses, for reversing journals.
    pub reverses_journal_id: Option<JournalEntryId>,
    /// User assembling the journal.
    pub created_by: UserId,
}

/// A stored journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier.
    pub id: JournalEntryId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Accounting date.
    pub entry_date: NaiveDate,
    /// Reference (usually the document number).
    pub reference: String,
    /// Free-text memo.
    pub memo: String,
    /// Lifecycle status.
    pub status: JournalStatus,
    /// Standard or reversing.
    pub journal_type: JournalType,
    /// Document that produced this journal.
    pub source: SourceDocument,
    /// Journal this one reverses.
    pub reverses_journal_id: Option<JournalEntryId>,
    /// Ordered lines.
    pub lines: Vec<JournalLine>,
    /// Creator.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Poster, once posted.
    pub posted_by: Option<UserId>,
    /// Posting timestamp, once posted.
    pub posted_at: Option<DateTime<Utc>>,
}

impl JournalEntry {
    /// Total of all debit lines.
    #[must_use]
    pub fn total_debit(&self) -> Decimal {
        self.lines.iter().map(|l| l.debit).sum()
    }

    /// Total of all credit lines.
    #[must_use]
    pub fn total_credit(&self) -> Decimal {
        self.lines.iter().map(|l| l.credit).sum()
    }

    /// Returns true if debits equal credits.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.total_debit() == self.total_credit()
    }
}

/// A balanced journal that has not been posted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftJournal(JournalEntry);

impl DraftJournal {
    pub(crate) fn new(entry: JournalEntry) -> Self {
        Self(entry)
    }

    /// The journal id.
    #[must_use]
    pub fn id(&self) -> JournalEntryId {
        self.0.id
    }

    /// Borrows the underlying entry.
    #[must_use]
    pub fn entry(&self) -> &JournalEntry {
        &self.0
    }

    /// Consumes the draft, returning the entry to persist.
    #[must_use]
    pub fn into_entry(self) -> JournalEntry {
        self.0
    }
}

/// A journal the general ledger has marked POSTED.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedJournal(JournalEntry);

impl PostedJournal {
    pub(crate) fn new(entry: JournalEntry) -> Self {
        Self(entry)
    }

    /// The journal id.
    #[must_use]
    pub fn id(&self) -> JournalEntryId {
        self.0.id
    }

    /// Borrows the underlying entry.
    #[must_use]
    pub fn entry(&self) -> &JournalEntry {
        &self.0
    }

    /// Consumes the wrapper.
    #[must_use]
    pub fn into_entry(self) -> JournalEntry {
        self.0
    }
}
