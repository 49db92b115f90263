//! Accounting period guard.
//!
//! Check order:
//! 1. Cutover: once the opening balances period is CLOSED, anything dated
//!    before its start is rejected, even if a later period covers the date.
//! 2. Exactly one period must contain the date.
//! 3. Operational documents cannot use the opening balances period.
//! 4. The period must be OPEN.

use chrono::NaiveDate;
use receiva_shared::types::TenantId;

use super::period::{AccountingPeriod, PeriodAction, PeriodStatus, PostingKind};
use crate::error::ReceivablesError;
use crate::store::PeriodStore;

/// Validates transaction dates against accounting periods.
pub struct PeriodGuard;

impl PeriodGuard {
    /// Asserts that `date` is open for `action` and returns the matching period.
    pub async fn assert_open<S>(
        store: &S,
        tenant_id: TenantId,
        date: NaiveDate,
        action: PeriodAction,
        kind: PostingKind,
    ) -> Result<AccountingPeriod, ReceivablesError>
    where
        S: PeriodStore + ?Sized,
    {
        let opening = store.opening_balance_period(tenant_id).await?;
        let periods = store.find_periods_containing(tenant_id, date).await?;
        let containing = Self::single_period(date, periods)?;

        Self::check(date, action, kind, containing, opening.as_ref())
    }

    /// Narrows the periods covering `date` to at most one.
    ///
    /// Overlapping periods make the covering status ambiguous, so they are
    /// reported as a configuration error instead of picking one.
    pub fn single_period(
        date: NaiveDate,
        mut periods: Vec<AccountingPeriod>,
    ) -> Result<Option<AccountingPeriod>, ReceivablesError> {
        if periods.len() > 1 {
            let codes: Vec<_> = periods.iter().map(|p| p.code.as_str()).collect();
            return Err(ReceivablesError::ConfigurationInvalid {
                subject: format!("accounting periods on {date}"),
                reason: format!("overlapping periods {}", codes.join(", ")),
            });
        }
        Ok(periods.pop())
    }

    /// Pure form of [`Self::assert_open`].
    pub fn check(
        date: NaiveDate,
        action: PeriodAction,
        kind: PostingKind,
        containing: Option<AccountingPeriod>,
        opening: Option<&AccountingPeriod>,
    ) -> Result<AccountingPeriod, ReceivablesError> {
        if let Some(cutover) = opening.and_then(AccountingPeriod::cutover_date)
            && date < cutover
        {
            return Err(ReceivablesError::CutoverLocked { date, cutover });
        }

        let period = containing.ok_or(ReceivablesError::NoPeriodExists(date))?;

        if period.is_opening_balance
            && period.status == PeriodStatus::Open
            && kind == PostingKind::Operational
        {
            return Err(ReceivablesError::OpeningPeriodBlocked {
                code: period.code,
                action,
            });
        }

        if !period.is_open() {
            return Err(ReceivablesError::PeriodClosed {
                code: period.code,
                status: period.status,
                action,
            });
        }

        Ok(period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use receiva_shared::types::PeriodId;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(code: &str, start: NaiveDate, end: NaiveDate, status: PeriodStatus) -> AccountingPeriod {
        AccountingPeriod {
            id: PeriodId::new(),
            tenant_id: TenantId::new(),
            code: code.to_string(),
            start_date: start,
            end_date: end,
            status,
            is_opening_balance: false,
        }
    }

    fn opening(status: PeriodStatus) -> AccountingPeriod {
        AccountingPeriod {
            is_opening_balance: true,
            ..period("OB", date(2026, 1, 1), date(2026, 1, 31), status)
        }
    }

    #[rstest]
    #[case(PeriodStatus::Open, None)]
    #[case(PeriodStatus::SoftClosed, Some("PERIOD_CLOSED"))]
    #[case(PeriodStatus::Closed, Some("PERIOD_CLOSED"))]
    fn test_status_gating(#[case] status: PeriodStatus, #[case] expected: Option<&str>) {
        let p = period("2026-03", date(2026, 3, 1), date(2026, 3, 31), status);
        let result = PeriodGuard::check(
            date(2026, 3, 15),
            PeriodAction::Post,
            PostingKind::Operational,
            Some(p),
            None,
        );
        assert_eq!(result.err().map(|e| e.error_code()), expected);
    }

    #[test]
    fn test_overlapping_periods_are_rejected() {
        let quarter = period("2026-Q1", date(2026, 1, 1), date(2026, 3, 31), PeriodStatus::Open);
        let march = period("2026-03", date(2026, 3, 1), date(2026, 3, 31), PeriodStatus::Closed);

        let err = PeriodGuard::single_period(date(2026, 3, 10), vec![quarter.clone(), march]).unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_INVALID");
        assert!(err.to_string().contains("2026-Q1, 2026-03"));

        let single = PeriodGuard::single_period(date(2026, 2, 10), vec![quarter]).unwrap();
        assert_eq!(single.map(|p| p.code).as_deref(), Some("2026-Q1"));
        assert!(PeriodGuard::single_period(date(2027, 1, 1), Vec::new()).unwrap().is_none());
    }

    #[test]
    fn test_no_period() {
        let err = PeriodGuard::check(
            date(2030, 1, 1),
            PeriodAction::Create,
            PostingKind::Operational,
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ReceivablesError::NoPeriodExists(d) if d == date(2030, 1, 1)));
    }

    #[test]
    fn test_closed_message_names_action() {
        let p = period("2026-02", date(2026, 2, 1), date(2026, 2, 28), PeriodStatus::Closed);
        let err = PeriodGuard::check(
            date(2026, 2, 10),
            PeriodAction::Post,
            PostingKind::Operational,
            Some(p),
            None,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Accounting period 2026-02 is CLOSED; cannot post");
    }

    #[test]
    fn test_open_opening_period_blocks_operational_documents() {
        let ob = opening(PeriodStatus::Open);
        let err = PeriodGuard::check(
            date(2026, 1, 10),
            PeriodAction::Post,
            PostingKind::Operational,
            Some(ob.clone()),
            Some(&ob),
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "OPENING_PERIOD_BLOCKED");

        let ok = PeriodGuard::check(
            date(2026, 1, 10),
            PeriodAction::Post,
            PostingKind::OpeningBalance,
            Some(ob.clone()),
            Some(&ob),
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn test_cutover_wins_over_later_open_period() {
        let ob = opening(PeriodStatus::Closed);
        let legacy = period("2025-12", date(2025, 12, 1), date(2025, 12, 31), PeriodStatus::Open);
        let err = PeriodGuard::check(
            date(2025, 12, 31),
            PeriodAction::Post,
            PostingKind::Operational,
            Some(legacy),
            Some(&ob),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ReceivablesError::CutoverLocked { date: d, cutover } if d == date(2025, 12, 31) && cutover == date(2026, 1, 1)
        ));
    }

    #[test]
    fn test_dates_on_or_after_cutover_pass() {
        let ob = opening(PeriodStatus::Closed);
        let march = period("2026-03", date(2026, 3, 1), date(2026, 3, 31), PeriodStatus::Open);
        let result = PeriodGuard::check(
            date(2026, 3, 1),
            PeriodAction::Post,
            PostingKind::Operational,
            Some(march),
            Some(&ob),
        );
        assert_eq!(result.unwrap().code, "2026-03");
    }

    #[test]
    fn test_closed_opening_period_itself_reports_closed() {
        let ob = opening(PeriodStatus::Closed);
        let err = PeriodGuard::check(
            date(2026, 1, 5),
            PeriodAction::Post,
            PostingKind::Operational,
            Some(ob.clone()),
            Some(&ob),
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "PERIOD_CLOSED");
    }
}
