//! Accounting periods and the period guard.
//!
//! - `period` - Accounting period types and posting actions
//! - `guard` - Open-period, opening-balance, and cutover enforcement

pub mod guard;
pub mod period;

pub use guard::PeriodGuard;
pub use period::{AccountingPeriod, PeriodAction, PeriodStatus, PostingKind};
