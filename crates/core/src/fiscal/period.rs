//! Accounting period types.

use chrono::NaiveDate;
use receiva_shared::types::{PeriodId, TenantId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of an accounting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodStatus {
    /// Period is open for transactions.
    Open,
    /// Period is soft-closed; no operational postings.
    SoftClosed,
    /// Period is closed, no new transactions allowed.
    Closed,
}

impl PeriodStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::SoftClosed => "SOFT_CLOSED",
            Self::Closed => "CLOSED",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "OPEN" => Some(Self::Open),
            "SOFT_CLOSED" => Some(Self::SoftClosed),
            "CLOSED" => Some(Self::Closed),
            _ => None,
        }
    }
}

impl fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The action a caller is attempting against a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodAction {
    /// Creating or approving a document dated in the period.
    Create,
    /// Posting (or reversing) a journal dated in the period.
    Post,
}

impl fmt::Display for PeriodAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => f.write_str("create"),
            Self::Post => f.write_str("post"),
        }
    }
}

/// What kind of entry is being dated into a period.
///
/// The opening balances period only accepts `OpeningBalance` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostingKind {
    /// Ordinary subledger documents (invoices, credit notes, refunds).
    Operational,
    /// Opening balance seeding entries.
    OpeningBalance,
}

/// An accounting period owned by a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingPeriod {
    /// Unique identifier.
    pub id: PeriodId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Short code shown to users (e.g., "2026-01").
    pub code: String,
    /// First day of the period (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the period (inclusive).
    pub end_date: NaiveDate,
    /// Current status.
    pub status: PeriodStatus,
    /// Marks the special "Opening Balances" period.
    pub is_opening_balance: bool,
}

impl AccountingPeriod {
    /// Returns true if transactions can be posted to this period.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == PeriodStatus::Open
    }

    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// The cutover date set by this period, if it is a closed opening balances period.
    #[must_use]
    pub fn cutover_date(&self) -> Option<NaiveDate> {
        (self.is_opening_balance && self.status == PeriodStatus::Closed).then_some(self.start_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(status: PeriodStatus, is_opening_balance: bool) -> AccountingPeriod {
        AccountingPeriod {
            id: PeriodId::new(),
            tenant_id: TenantId::new(),
            code: "2026-01".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            status,
            is_opening_balance,
        }
    }

    #[test]
    fn test_contains_date_is_inclusive() {
        let p = period(PeriodStatus::Open, false);
        assert!(p.contains_date(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
        assert!(p.contains_date(NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()));
        assert!(!p.contains_date(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()));
        assert!(!p.contains_date(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()));
    }

    #[test]
    fn test_cutover_only_for_closed_opening_period() {
        assert_eq!(period(PeriodStatus::Open, true).cutover_date(), None);
        assert_eq!(period(PeriodStatus::Closed, false).cutover_date(), None);
        assert_eq!(
            period(PeriodStatus::Closed, true).cutover_date(),
            NaiveDate::from_ymd_opt(2026, 1, 1)
        );
    }

    #[test]
    fn test_status_parse_round_trip() {
        for status in [PeriodStatus::Open, PeriodStatus::SoftClosed, PeriodStatus::Closed] {
            assert_eq!(PeriodStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(PeriodStatus::parse("soft_closed"), Some(PeriodStatus::SoftClosed));
        assert_eq!(PeriodStatus::parse("locked"), None);
    }
}
