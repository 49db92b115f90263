//! Receivables error taxonomy.
//!
//! Every lifecycle transition fails with one of these kinds. Each kind has a
//! stable machine-checkable code and a message that names the blocking
//! period, status, or amount so it can be shown without further lookups.

use chrono::NaiveDate;
use receiva_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::fiscal::{PeriodAction, PeriodStatus};
use crate::ledger::JournalError;
use crate::store::StoreError;

/// Result alias for receivables operations.
pub type ReceivablesResult<T> = Result<T, ReceivablesError>;

/// Errors returned by the receivables core.
#[derive(Debug, Error, PartialEq)]
pub enum ReceivablesError {
    // ========== Client Errors ==========
    /// Caller-supplied data is malformed.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Referenced document or master record is absent for this tenant.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind (e.g., "credit note").
        entity: &'static str,
        /// Requested id.
        id: Uuid,
    },

    /// State-machine precondition violated.
    #[error("Cannot move {entity} from {current} to {attempted}")]
    InvalidStatusForTransition {
        /// Entity kind.
        entity: &'static str,
        /// Status the document is in.
        current: String,
        /// Status the caller tried to reach.
        attempted: String,
    },

    // ========== Temporal Governance ==========
    /// No accounting period contains the date.
    #[error("No accounting period exists for {0}")]
    NoPeriodExists(NaiveDate),

    /// The matching period is not open.
    #[error("Accounting period {code} is {status}; cannot {action}")]
    PeriodClosed {
        /// Period code.
        code: String,
        /// Period status.
        status: PeriodStatus,
        /// Attempted action.
        action: PeriodAction,
    },

    /// Operational documents cannot be dated into the opening balances period.
    #[error("Accounting period {code} is reserved for opening balances; cannot {action} operational documents")]
    OpeningPeriodBlocked {
        /// Period code.
        code: String,
        /// Attempted action.
        action: PeriodAction,
    },

    /// Date falls before the opening balance cutover.
    #[error("Date {date} is before the opening balance cutover {cutover}")]
    CutoverLocked {
        /// Document date.
        date: NaiveDate,
        /// Cutover date (start of the closed opening balances period).
        cutover: NaiveDate,
    },

    // ========== Tenant Configuration ==========
    /// A required account setting is not configured.
    #[error("{0} is not configured")]
    ConfigurationMissing(String),

    /// Configured account is unusable for its role.
    #[error("Configuration for {subject} is invalid: {reason}")]
    ConfigurationInvalid {
        /// Role or record that is misconfigured.
        subject: String,
        /// What is wrong with it.
        reason: String,
    },

    // ========== Business Rules ==========
    /// Amount is larger than the parent's outstanding/refundable balance.
    #[error("Amount {amount} exceeds outstanding balance {outstanding}")]
    ExceedsOutstandingBalance {
        /// Requested amount.
        amount: Decimal,
        /// Balance available.
        outstanding: Decimal,
    },

    /// Assembled journal does not balance.
    #[error("Journal is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedJournal {
        /// Total debits.
        debit: Decimal,
        /// Total credits.
        credit: Decimal,
    },

    // ========== Resource Errors ==========
    /// The backing store failed; every partial effect was rolled back.
    #[error("Store error: {message}")]
    Store {
        /// Underlying failure.
        message: String,
        /// True if retrying the whole operation may succeed.
        retryable: bool,
    },
}

impl ReceivablesError {
    /// Shorthand for a `NotFound` error.
    pub fn not_found(entity: &'static str, id: impl Into<Uuid>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Shorthand for an `InvalidStatusForTransition` error.
    pub fn invalid_status(
        entity: &'static str,
        current: impl ToString,
        attempted: impl ToString,
    ) -> Self {
        Self::InvalidStatusForTransition {
            entity,
            current: current.to_string(),
            attempted: attempted.to_string(),
        }
    }

    /// Returns true for temporal governance rejections.
    ///
    /// These are audited as `Blocked` rather than `Failure`.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        matches!(
            self,
            Self::NoPeriodExists(_)
                | Self::PeriodClosed { .. }
                | Self::OpeningPeriodBlocked { .. }
                | Self::CutoverLocked { .. }
        )
    }

    /// Returns true if retrying the operation may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store { retryable: true, .. })
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::ValidationFailed(_) => 400,
            Self::NotFound { .. } => 404,
            Self::InvalidStatusForTransition { .. } => 409,
            Self::NoPeriodExists(_)
            | Self::PeriodClosed { .. }
            | Self::OpeningPeriodBlocked { .. }
            | Self::CutoverLocked { .. }
            | Self::ExceedsOutstandingBalance { .. } => 422,
            Self::Store {
                retryable: true, ..
            } => 503,
            Self::ConfigurationMissing(_)
            | Self::ConfigurationInvalid { .. }
            | Self::UnbalancedJournal { .. }
            | Self::Store { .. } => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ValidationFailed(_) => "VALIDATION_FAILED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidStatusForTransition { .. } => "INVALID_STATUS_FOR_TRANSITION",
            Self::NoPeriodExists(_) => "NO_PERIOD_EXISTS",
            Self::PeriodClosed { .. } => "PERIOD_CLOSED",
            Self::OpeningPeriodBlocked { .. } => "OPENING_PERIOD_BLOCKED",
            Self::CutoverLocked { .. } => "CUTOVER_LOCKED",
            Self::ConfigurationMissing(_) => "CONFIGURATION_MISSING",
            Self::ConfigurationInvalid { .. } => "CONFIGURATION_INVALID",
            Self::ExceedsOutstandingBalance { .. } => "EXCEEDS_OUTSTANDING_BALANCE",
            Self::UnbalancedJournal { .. } => "UNBALANCED_JOURNAL",
            Self::Store { .. } => "STORE_ERROR",
        }
    }
}

impl From<JournalError> for ReceivablesError {
    fn from(err: JournalError) -> Self {
        match err {
            JournalError::Unbalanced { debit, credit } => Self::UnbalancedJournal { debit, credit },
            JournalError::AccountNotFound(id) => Self::not_found("account", id),
            JournalError::UnexpectedStatus {
                status, expected, ..
            } => Self::invalid_status("journal", status, expected),
            other => Self::ValidationFailed(other.to_string()),
        }
    }
}

impl From<StoreError> for ReceivablesError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => Self::NotFound { entity, id },
            StoreError::Conflict(message) => Self::Store {
                message,
                retryable: true,
            },
            StoreError::Database(message) => Self::Store {
                message,
                retryable: false,
            },
        }
    }
}

impl From<ReceivablesError> for AppError {
    fn from(err: ReceivablesError) -> Self {
        let message = err.to_string();
        match err {
            ReceivablesError::ValidationFailed(_) => Self::Validation(message),
            ReceivablesError::NotFound { .. } => Self::NotFound(message),
            ReceivablesError::InvalidStatusForTransition { .. } => Self::Conflict(message),
            ReceivablesError::NoPeriodExists(_)
            | ReceivablesError::PeriodClosed { .. }
            | ReceivablesError::OpeningPeriodBlocked { .. }
            | ReceivablesError::CutoverLocked { .. } => Self::PeriodLocked(message),
            ReceivablesError::ConfigurationMissing(_)
            | ReceivablesError::ConfigurationInvalid { .. } => Self::Configuration(message),
            ReceivablesError::ExceedsOutstandingBalance { .. } => Self::BusinessRule(message),
            ReceivablesError::UnbalancedJournal { .. } => Self::Internal(message),
            ReceivablesError::Store {
                retryable: true, ..
            } => Self::Conflict(message),
            ReceivablesError::Store { .. } => Self::Database(message),
        }
    }
}
