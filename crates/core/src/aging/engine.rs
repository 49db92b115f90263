//! Aging calculations.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use receiva_shared::types::CustomerId;

use super::types::{AgedInvoice, AgingBucket, AgingBuckets, AgingReport, AgingRow};

/// Pure aging logic.
pub struct AgingEngine;

impl AgingEngine {
    /// Whole calendar days from `due_date` to `as_of`. Negative when not yet due.
    #[must_use]
    pub fn days_overdue(as_of: NaiveDate, due_date: NaiveDate) -> i64 {
        (as_of - due_date).num_days()
    }

    /// Bucket for a days-overdue value.
    #[must_use]
    pub fn bucket_for(days_overdue: i64) -> AgingBucket {
        match days_overdue {
            d if d < 0 => AgingBucket::Current,
            0..=30 => AgingBucket::Days0To30,
            31..=60 => AgingBucket::Days31To60,
            61..=90 => AgingBucket::Days61To90,
            _ => AgingBucket::Days90Plus,
        }
    }

    /// Groups invoices per customer, sorted by name then id, with a grand total.
    #[must_use]
    pub fn build_report<I>(as_of: NaiveDate, invoices: I) -> AgingReport
    where
        I: IntoIterator<Item = AgedInvoice>,
    {
        let mut by_customer: BTreeMap<CustomerId, AgingRow> = BTreeMap::new();
        for invoice in invoices {
            let bucket = Self::bucket_for(Self::days_overdue(as_of, invoice.due_date));
            by_customer
                .entry(invoice.customer_id)
                .or_insert_with(|| AgingRow {
                    customer_id: invoice.customer_id,
                    customer_name: invoice.customer_name.clone(),
                    buckets: AgingBuckets::default(),
                })
                .buckets
                .add(bucket, invoice.outstanding);
        }

        let mut rows: Vec<AgingRow> = by_customer.into_values().collect();
        rows.sort_by(|a, b| {
            a.customer_name
                .cmp(&b.customer_name)
                .then_with(|| a.customer_id.cmp(&b.customer_id))
        });

        let mut total = AgingBuckets::default();
        for row in &rows {
            total.merge(&row.buckets);
        }

        AgingReport { as_of, rows, total }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use receiva_shared::types::InvoiceId;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn aged(customer_id: CustomerId, name: &str, due: NaiveDate, outstanding: Decimal) -> AgedInvoice {
        AgedInvoice {
            invoice_id: InvoiceId::new(),
            customer_id,
            customer_name: name.to_string(),
            due_date: due,
            outstanding,
        }
    }

    #[rstest]
    #[case(-1, AgingBucket::Current)]
    #[case(-400, AgingBucket::Current)]
    #[case(0, AgingBucket::Days0To30)]
    #[case(30, AgingBucket::Days0To30)]
    #[case(31, AgingBucket::Days31To60)]
    #[case(60, AgingBucket::Days31To60)]
    #[case(61, AgingBucket::Days61To90)]
    #[case(90, AgingBucket::Days61To90)]
    #[case(91, AgingBucket::Days90Plus)]
    fn test_bucket_boundaries(#[case] days: i64, #[case] expected: AgingBucket) {
        assert_eq!(AgingEngine::bucket_for(days), expected);
    }

    #[test]
    fn test_days_overdue_uses_calendar_days() {
        assert_eq!(AgingEngine::days_overdue(date(2026, 3, 1), date(2026, 2, 28)), 1);
        assert_eq!(AgingEngine::days_overdue(date(2026, 2, 9), date(2026, 2, 9)), 0);
        assert_eq!(AgingEngine::days_overdue(date(2026, 1, 10), date(2026, 2, 9)), -30);
    }

    #[test]
    fn test_report_groups_and_sorts_by_name() {
        let as_of = date(2026, 4, 1);
        let zeta = CustomerId::new();
        let acme = CustomerId::new();
        let report = AgingEngine::build_report(
            as_of,
            vec![
                aged(zeta, "Zeta Co", date(2026, 5, 1), dec!(10.00)),
                aged(acme, "Acme Ltd", date(2026, 3, 20), dec!(20.00)),
                aged(acme, "Acme Ltd", date(2025, 12, 1), dec!(5.25)),
            ],
        );

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].customer_name, "Acme Ltd");
        assert_eq!(report.rows[0].buckets.days_0_30, dec!(20.00));
        assert_eq!(report.rows[0].buckets.days_90_plus, dec!(5.25));
        assert_eq!(report.rows[0].buckets.total, dec!(25.25));
        assert_eq!(report.rows[1].buckets.current, dec!(10.00));
        assert_eq!(report.total.total, dec!(35.25));
        assert_eq!(report.total.current, dec!(10.00));
    }

    #[test]
    fn test_empty_report() {
        let report = AgingEngine::build_report(date(2026, 1, 1), Vec::new());
        assert!(report.rows.is_empty());
        assert_eq!(report.total, AgingBuckets::default());
    }
}
