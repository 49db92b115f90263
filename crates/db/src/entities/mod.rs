//! `SeaORM` entity definitions for the receivables schema.

pub mod prelude;

pub mod accounting_periods;
pub mod accounts;
pub mod bank_accounts;
pub mod control_account_settings;
pub mod customer_credit_note_lines;
pub mod customer_credit_notes;
pub mod customer_invoices;
pub mod customer_refunds;
pub mod customers;
pub mod dimensions;
pub mod document_sequences;
pub mod invoice_categories;
pub mod journal_entries;
pub mod journal_lines;
pub mod receipt_applications;
