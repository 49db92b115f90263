//! Document lifecycle state machines.
//!
//! - Invoice: DRAFT -> POSTED
//! - Credit note: DRAFT -> APPROVED -> POSTED -> VOID
//! - Refund: DRAFT -> SUBMITTED -> APPROVED -> POSTED -> VOID
//!
//! Transitions only move forward. VOID is reached from POSTED through a
//! reversing journal and is idempotent.

pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use service::{DocumentWorkflow, VoidDecision};
pub use types::{CreditNoteStatus, DocumentStatus, InvoiceStatus, RefundStatus};
