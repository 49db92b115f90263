//! Money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All amounts are `rust_decimal::Decimal` and are rounded to the cent with
//! round-half-up (midpoint away from zero) at every accumulation step.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept for monetary amounts.
pub const MONEY_SCALE: u32 = 2;

/// Rounds an amount to the cent using round-half-up.
///
/// Negative midpoints round away from zero, so `-0.005` becomes `-0.01`.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Sums amounts, rounding the running total after every addition.
#[must_use]
pub fn sum_rounded<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .fold(Decimal::ZERO, |acc, amount| round_money(acc + round_money(amount)))
}

/// Returns true if `code` looks like an ISO 4217 code (three ASCII uppercase letters).
#[must_use]
pub fn is_valid_currency_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(1.005), dec!(1.01))]
    #[case(dec!(1.004), dec!(1.00))]
    #[case(dec!(2.675), dec!(2.68))]
    #[case(dec!(-1.005), dec!(-1.01))]
    #[case(dec!(100), dec!(100))]
    #[case(dec!(0.125), dec!(0.13))]
    fn test_round_money_half_up(#[case] input: Decimal, #[case] expected: Decimal) {
        assert_eq!(round_money(input), expected);
    }

    #[test]
    fn test_sum_rounded_rounds_each_step() {
        // 0.005 rounds up to 0.01 on every addition.
        let total = sum_rounded(vec![dec!(0.005), dec!(0.005), dec!(0.005)]);
        assert_eq!(total, dec!(0.03));
    }

    #[test]
    fn test_sum_rounded_empty() {
        assert_eq!(sum_rounded(Vec::new()), Decimal::ZERO);
    }

    #[test]
    fn test_currency_code() {
        assert!(is_valid_currency_code("USD"));
        assert!(is_valid_currency_code("IDR"));
        assert!(!is_valid_currency_code("usd"));
        assert!(!is_valid_currency_code("US"));
        assert!(!is_valid_currency_code("USDX"));
        assert!(!is_valid_currency_code(""));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Rounding a value that is already at cent precision is a no-op.
        #[test]
        fn prop_rounding_is_idempotent(mantissa in -10_000_000_000i64..10_000_000_000i64, scale in 0u32..8) {
            let value = Decimal::new(mantissa, scale);
            let once = round_money(value);
            prop_assert_eq!(round_money(once), once);
            prop_assert!(once.scale() <= MONEY_SCALE);
        }

        /// Whole-cent amounts sum exactly.
        #[test]
        fn prop_sum_of_cents_is_exact(cents in prop::collection::vec(-1_000_000i64..1_000_000i64, 0..30)) {
            let amounts: Vec<Decimal> = cents.iter().map(|c| Decimal::new(*c, 2)).collect();
            let exact: Decimal = amounts.iter().copied().sum();
            prop_assert_eq!(sum_rounded(amounts), exact);
        }
    }
}
