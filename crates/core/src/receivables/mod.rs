//! AR subledger: invoices, credit notes, and refunds.
//!
//! - `types` - Documents, master data, and creation inputs
//! - `outstanding` - Derived outstanding/refundable balances
//! - `posting` - Journal line shapes per document
//! - `service` - The lifecycle orchestrator

pub mod outstanding;
pub mod posting;
pub mod service;
pub mod types;


pub use service::ReceivablesService;
pub use types::{
    BankAccount, CreateCreditNoteInput, CreateInvoiceInput, CreateRefundInput, CreditNoteLine,
    CreditNoteLineInput, Customer, CustomerCreditNote, CustomerInvoice, CustomerRefund,
    InvoiceCategory, PaymentMethod, ReceiptApplication,
};
