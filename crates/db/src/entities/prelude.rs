//! Re-exports of every entity.

pub use super::accounting_periods::Entity as AccountingPeriods;
pub use super::accounts::Entity as Accounts;
pub use super::bank_accounts::Entity as BankAccounts;
pub use super::control_account_settings::Entity as ControlAccountSettings;
pub use super::customer_credit_note_lines::Entity as CustomerCreditNoteLines;
pub use super::customer_credit_notes::Entity as CustomerCreditNotes;
pub use super::customer_invoices::Entity as CustomerInvoices;
pub use super::customer_refunds::Entity as CustomerRefunds;
pub use super::customers::Entity as Customers;
pub use super::dimensions::Entity as Dimensions;
pub use super::document_sequences::Entity as DocumentSequences;
pub use super::invoice_categories::Entity as InvoiceCategories;
pub use super::journal_entries::Entity as JournalEntries;
pub use super::journal_lines::Entity as JournalLines;
pub use super::receipt_applications::Entity as ReceiptApplications;
