//! Property-based tests for document status transitions.

use proptest::prelude::*;

use super::service::{DocumentWorkflow, VoidDecision};
use super::types::{CreditNoteStatus, DocumentStatus, RefundStatus};

fn credit_note_status() -> impl Strategy<Value = CreditNoteStatus> {
    prop::sample::select(CreditNoteStatus::all())
}

fn refund_status() -> impl Strategy<Value = RefundStatus> {
    prop::sample::select(RefundStatus::all())
}

fn position<S: DocumentStatus>(status: S) -> usize {
    S::all().iter().position(|s| *s == status).unwrap_or(usize::MAX)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Only single forward steps are accepted; nothing skips or goes back.
    #[test]
    fn prop_credit_note_only_steps_forward(
        current in credit_note_status(),
        target in credit_note_status(),
    ) {
        let result = DocumentWorkflow::advance(current, target);
        prop_assert_eq!(result.is_ok(), position(target) == position(current) + 1);
    }

    #[test]
    fn prop_refund_only_steps_forward(
        current in refund_status(),
        target in refund_status(),
    ) {
        let result = DocumentWorkflow::advance(current, target);
        prop_assert_eq!(result.is_ok(), position(target) == position(current) + 1);
    }

    /// Voiding never errors on a VOID refund and only reverses a POSTED one.
    #[test]
    fn prop_refund_void_decision(current in refund_status(), reason in "[a-z ]{0,12}") {
        let result = DocumentWorkflow::void_refund(current, &reason);
        match current {
            RefundStatus::Void => prop_assert_eq!(result.ok(), Some(VoidDecision::AlreadyVoid)),
            RefundStatus::Posted if !reason.trim().is_empty() => {
                prop_assert_eq!(result.ok(), Some(VoidDecision::Reverse));
            }
            _ => prop_assert!(result.is_err()),
        }
    }
}
