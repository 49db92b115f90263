//! Property-based tests for the aging engine.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use receiva_shared::types::{CustomerId, InvoiceId};
use rust_decimal::Decimal;

use super::engine::AgingEngine;
use super::types::{AgedInvoice, AgingBucket, AgingBuckets};

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 30).unwrap()
}

/// (customer index, due offset in days, cents)
fn invoices_strategy() -> impl Strategy<Value = Vec<(usize, i64, i64)>> {
    prop::collection::vec((0usize..4, -120i64..200, 1i64..10_000_000), 0..40)
}

fn build(raw: &[(usize, i64, i64)], customers: &[CustomerId]) -> Vec<AgedInvoice> {
    raw.iter()
        .map(|&(c, offset, cents)| AgedInvoice {
            invoice_id: InvoiceId::new(),
            customer_id: customers[c],
            customer_name: format!("Customer {c}"),
            due_date: as_of() - Duration::days(offset),
            outstanding: Decimal::new(cents, 2),
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The grand total equals the column-wise sum of customer rows.
    #[test]
    fn prop_total_is_sum_of_rows(raw in invoices_strategy()) {
        let customers: Vec<_> = (0..4).map(|_| CustomerId::new()).collect();
        let report = AgingEngine::build_report(as_of(), build(&raw, &customers));

        let mut expected = AgingBuckets::default();
        for row in &report.rows {
            expected.merge(&row.buckets);
        }
        prop_assert_eq!(&report.total, &expected);

        let columns: Decimal = AgingBucket::ALL.iter().map(|b| report.total.get(*b)).sum();
        prop_assert_eq!(columns, report.total.total);
    }

    /// Every cent of input lands in exactly one bucket.
    #[test]
    fn prop_no_amount_lost(raw in invoices_strategy()) {
        let customers: Vec<_> = (0..4).map(|_| CustomerId::new()).collect();
        let invoices = build(&raw, &customers);
        let input: Decimal = invoices.iter().map(|i| i.outstanding).sum();

        let report = AgingEngine::build_report(as_of(), invoices);
        prop_assert_eq!(report.total.total, input);
    }

    /// Rows come out ordered by customer name.
    #[test]
    fn prop_rows_sorted_by_name(raw in invoices_strategy()) {
        let customers: Vec<_> = (0..4).map(|_| CustomerId::new()).collect();
        let report = AgingEngine::build_report(as_of(), build(&raw, &customers));

        prop_assert!(report.rows.windows(2).all(|w| w[0].customer_name <= w[1].customer_name));
    }

    /// Older dues never land in a younger bucket.
    #[test]
    fn prop_bucket_is_monotonic(a in -500i64..500, b in -500i64..500) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(AgingEngine::bucket_for(lo) <= AgingEngine::bucket_for(hi));
    }
}
