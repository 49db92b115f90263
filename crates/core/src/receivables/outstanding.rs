//! Derived balances.
//!
//! Outstanding and refundable balances are never stored. They are
//! recomputed from posted rows every time they are needed.

use chrono::NaiveDate;
use receiva_shared::types::{CreditNoteId, TenantId, round_money};
use rust_decimal::Decimal;

use super::types::{CustomerCreditNote, CustomerInvoice};
use crate::error::ReceivablesError;
use crate::store::{CreditNoteStore, ReceiptStore, RefundStore};

/// `total - receipts - credits`, rounded at each step.
#[must_use]
pub fn invoice_outstanding(total: Decimal, receipts: Decimal, credits: Decimal) -> Decimal {
    round_money(round_money(round_money(total) - round_money(receipts)) - round_money(credits))
}

/// `total - refunds`, rounded at each step.
#[must_use]
pub fn credit_note_refundable(total: Decimal, refunds: Decimal) -> Decimal {
    round_money(round_money(total) - round_money(refunds))
}

/// Fails with `ExceedsOutstandingBalance` if `amount` is above `outstanding`.
pub fn ensure_within(amount: Decimal, outstanding: Decimal) -> Result<(), ReceivablesError> {
    if amount > outstanding {
        return Err(ReceivablesError::ExceedsOutstandingBalance {
            amount,
            outstanding,
        });
    }
    Ok(())
}

/// Outstanding balance of an invoice from posted receipts and credit notes.
///
/// `as_of` limits offsets to those dated on or before it; `excluding` leaves
/// one credit note out of the sum.
pub async fn outstanding_for_invoice<S>(
    store: &S,
    tenant_id: TenantId,
    invoice: &CustomerInvoice,
    as_of: Option<NaiveDate>,
    excluding: Option<CreditNoteId>,
) -> Result<Decimal, ReceivablesError>
where
    S: ReceiptStore + CreditNoteStore + ?Sized,
{
    let receipts = store
        .sum_posted_receipts_applied(tenant_id, invoice.id, as_of)
        .await?;
    let credits = store
        .sum_posted_credit_notes_for_invoice(tenant_id, invoice.id, as_of, excluding)
        .await?;
    Ok(invoice_outstanding(invoice.total_amount, receipts, credits))
}

/// Refundable balance of a credit note from posted refunds.
pub async fn refundable_for_credit_note<S>(
    store: &S,
    tenant_id: TenantId,
    note: &CustomerCreditNote,
) -> Result<Decimal, ReceivablesError>
where
    S: RefundStore + ?Sized,
{
    let refunds = store
        .sum_posted_refunds_for_credit_note(tenant_id, note.id)
        .await?;
    Ok(credit_note_refundable(note.total_amount, refunds))
}
