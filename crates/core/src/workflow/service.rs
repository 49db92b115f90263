//! Workflow transition checks.

use super::types::{CreditNoteStatus, DocumentStatus, InvoiceStatus, RefundStatus};
use crate::error::ReceivablesError;

/// What a void request should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoidDecision {
    /// Document is POSTED: build and post the reversing journal.
    Reverse,
    /// Document is already VOID: return it unchanged.
    AlreadyVoid,
}

/// Stateless checks for document status transitions.
pub struct DocumentWorkflow;

impl DocumentWorkflow {
    /// Checks a forward transition from `current` to `target`.
    ///
    /// Succeeds only when `current` is the single predecessor of `target`.
    pub fn advance<S: DocumentStatus>(current: S, target: S) -> Result<S, ReceivablesError> {
        if target.predecessor() == Some(current) {
            Ok(target)
        } else {
            Err(ReceivablesError::invalid_status(S::ENTITY, current, target))
        }
    }

    /// DRAFT -> POSTED.
    pub fn post_invoice(current: InvoiceStatus) -> Result<InvoiceStatus, ReceivablesError> {
        Self::advance(current, InvoiceStatus::Posted)
    }

    /// DRAFT -> APPROVED.
    pub fn approve_credit_note(current: CreditNoteStatus) -> Result<CreditNoteStatus, ReceivablesError> {
        Self::advance(current, CreditNoteStatus::Approved)
    }

    /// APPROVED -> POSTED.
    pub fn post_credit_note(current: CreditNoteStatus) -> Result<CreditNoteStatus, ReceivablesError> {
        Self::advance(current, CreditNoteStatus::Posted)
    }

    /// DRAFT -> SUBMITTED.
    pub fn submit_refund(current: RefundStatus) -> Result<RefundStatus, ReceivablesError> {
        Self::advance(current, RefundStatus::Submitted)
    }

    /// SUBMITTED -> APPROVED.
    pub fn approve_refund(current: RefundStatus) -> Result<RefundStatus, ReceivablesError> {
        Self::advance(current, RefundStatus::Approved)
    }

    /// APPROVED -> POSTED.
    pub fn post_refund(current: RefundStatus) -> Result<RefundStatus, ReceivablesError> {
        Self::advance(current, RefundStatus::Posted)
    }

    /// POSTED -> VOID for credit notes.
    pub fn void_credit_note(
        current: CreditNoteStatus,
        reason: &str,
    ) -> Result<VoidDecision, ReceivablesError> {
        Self::void(current, CreditNoteStatus::Void, reason)
    }

    /// POSTED -> VOID for refunds.
    pub fn void_refund(current: RefundStatus, reason: &str) -> Result<VoidDecision, ReceivablesError> {
        Self::void(current, RefundStatus::Void, reason)
    }

    /// An already-VOID document short-circuits before any other check.
    fn void<S: DocumentStatus>(current: S, void: S, reason: &str) -> Result<VoidDecision, ReceivablesError> {
        if current == void {
            return Ok(VoidDecision::AlreadyVoid);
        }
        Self::advance(current, void)?;
        if reason.trim().is_empty() {
            return Err(ReceivablesError::ValidationFailed(
                "Void reason is required".to_string(),
            ));
        }
        Ok(VoidDecision::Reverse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(CreditNoteStatus::Draft, true)]
    #[case(CreditNoteStatus::Approved, false)]
    #[case(CreditNoteStatus::Posted, false)]
    #[case(CreditNoteStatus::Void, false)]
    fn test_approve_credit_note(#[case] current: CreditNoteStatus, #[case] ok: bool) {
        assert_eq!(DocumentWorkflow::approve_credit_note(current).is_ok(), ok);
    }

    #[test]
    fn test_post_requires_approval() {
        let err = DocumentWorkflow::post_credit_note(CreditNoteStatus::Draft).unwrap_err();
        assert!(matches!(
            &err,
            ReceivablesError::InvalidStatusForTransition { entity, current, attempted }
                if *entity == "credit note" && current == "DRAFT" && attempted == "POSTED"
        ));
    }

    #[test]
    fn test_refund_chain() {
        let s = DocumentWorkflow::submit_refund(RefundStatus::Draft).unwrap();
        let s = DocumentWorkflow::approve_refund(s).unwrap();
        let s = DocumentWorkflow::post_refund(s).unwrap();
        assert_eq!(s, RefundStatus::Posted);
        assert!(DocumentWorkflow::approve_refund(RefundStatus::Draft).is_err());
        assert!(DocumentWorkflow::post_refund(RefundStatus::Submitted).is_err());
    }

    #[test]
    fn test_invoice_posts_once() {
        assert_eq!(
            DocumentWorkflow::post_invoice(InvoiceStatus::Draft).unwrap(),
            InvoiceStatus::Posted
        );
        assert!(DocumentWorkflow::post_invoice(InvoiceStatus::Posted).is_err());
    }

    #[test]
    fn test_void_is_idempotent_even_without_reason() {
        assert_eq!(
            DocumentWorkflow::void_credit_note(CreditNoteStatus::Void, "").unwrap(),
            VoidDecision::AlreadyVoid
        );
        assert_eq!(
            DocumentWorkflow::void_refund(RefundStatus::Void, "dup").unwrap(),
            VoidDecision::AlreadyVoid
        );
    }

    #[test]
    fn test_void_requires_posted_and_reason() {
        assert_eq!(
            DocumentWorkflow::void_credit_note(CreditNoteStatus::Posted, "customer dispute").unwrap(),
            VoidDecision::Reverse
        );

        let err = DocumentWorkflow::void_credit_note(CreditNoteStatus::Posted, "   ").unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");

        let err = DocumentWorkflow::void_refund(RefundStatus::Approved, "wrong amount").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_STATUS_FOR_TRANSITION");
    }
}
