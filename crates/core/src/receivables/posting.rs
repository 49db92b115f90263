//! Journal line shapes for each document.

use rust_decimal::Decimal;

use super::types::{CustomerCreditNote, CustomerInvoice, CustomerRefund};
use crate::ledger::{Account, JournalLineInput};

/// Dr AR control / Cr revenue, both tagged with the invoice dimensions.
#[must_use]
pub fn invoice_lines(invoice: &CustomerInvoice, ar_control: &Account, revenue: &Account) -> Vec<JournalLineInput> {
    let description = format!("Invoice {}", invoice.invoice_number);
    vec![
        JournalLineInput::debit(ar_control.id, invoice.total_amount)
            .with_description(description.clone())
            .with_dimensions(invoice.dimensions),
        JournalLineInput::credit(revenue.id, invoice.total_amount)
            .with_description(description)
            .with_dimensions(invoice.dimensions),
    ]
}

/// Dr each revenue line / Cr AR control for the total.
#[must_use]
pub fn credit_note_lines(note: &CustomerCreditNote, ar_control: &Account) -> Vec<JournalLineInput> {
    let mut lines: Vec<JournalLineInput> = note
        .lines
        .iter()
        .map(|line| {
            JournalLineInput::debit(line.revenue_account_id, line.line_amount)
                .with_description(line.description.clone())
                .with_dimensions(line.dimensions)
        })
        .collect();
    lines.push(
        JournalLineInput::credit(ar_control.id, note.total_amount)
            .with_description(format!("Credit note {}", note.credit_note_number)),
    );
    lines
}

/// Four lines routing the refund through the clearing account:
/// Dr AR control / Cr clearing / Dr clearing / Cr payment account.
#[must_use]
pub fn refund_lines(
    refund: &CustomerRefund,
    ar_control: &Account,
    clearing: &Account,
    payment: &Account,
) -> Vec<JournalLineInput> {
    let amount: Decimal = refund.amount;
    let description = format!("Refund {}", refund.refund_number);
    vec![
        JournalLineInput::debit(ar_control.id, amount).with_description(description.clone()),
        JournalLineInput::credit(clearing.id, amount).with_description(description.clone()),
        JournalLineInput::debit(clearing.id, amount).with_description(description.clone()),
        JournalLineInput::credit(payment.id, amount).with_description(description),
    ]
}
