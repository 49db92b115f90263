//! Journal assembly errors.

use receiva_shared::types::{AccountId, JournalEntryId};
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::JournalStatus;

/// Errors raised while assembling or posting a journal.
#[derive(Debug, Error)]
pub enum JournalError {
    /// Journal must have at least 2 lines.
    #[error("Journal must have at least 2 lines, got {0}")]
    InsufficientLines(usize),

    /// Line amounts cannot be negative.
    #[error("Line {line} has a negative amount")]
    NegativeAmount {
        /// 1-based line number.
        line: usize,
    },

    /// Every line needs exactly one non-zero side.
    #[error("Line {line} must have exactly one non-zero side")]
    InvalidLineSides {
        /// 1-based line number.
        line: usize,
    },

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Account is inactive.
    #[error("Account {0} is inactive")]
    AccountInactive(AccountId),

    /// Account does not allow posting.
    #[error("Account {0} does not allow posting")]
    AccountNotPostable(AccountId),

    /// Debits do not equal credits.
    #[error("Journal is not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Total debits after rounding.
        debit: Decimal,
        /// Total credits after rounding.
        credit: Decimal,
    },

    /// Line count does not fit a line number.
    #[error("Journal has too many lines: {0}")]
    TooManyLines(usize),

    /// Original plus reversal leaves a balance on an account.
    #[error("Reversal leaves {net} on account {account}")]
    ReversalNotNetZero {
        /// Account with a residual balance.
        account: AccountId,
        /// Residual in the account's normal-balance direction.
        net: Decimal,
    },

    /// Journal is not in the status the operation needs.
    #[error("Journal {id} is {status}, expected {expected}")]
    UnexpectedStatus {
        /// Journal id.
        id: JournalEntryId,
        /// Current status.
        status: JournalStatus,
        /// Status the operation needs.
        expected: JournalStatus,
    },
}

impl JournalError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines(_) => "INSUFFICIENT_LINES",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::InvalidLineSides { .. } => "INVALID_LINE_SIDES",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::AccountNotPostable(_) => "ACCOUNT_NOT_POSTABLE",
            Self::Unbalanced { .. } => "UNBALANCED_JOURNAL",
            Self::TooManyLines(_) => "TOO_MANY_LINES",
            Self::ReversalNotNetZero { .. } => "REVERSAL_NOT_NET_ZERO",
            Self::UnexpectedStatus { .. } => "UNEXPECTED_JOURNAL_STATUS",
        }
    }
}
