//! Dashboard pipeline arithmetic.

use rust_decimal::{Decimal, RoundingStrategy};

/// Percentage of leads that turned into won deals, rounded to 2 places.
///
/// Returns zero when there are no leads. `won_deals` is a global count while
/// `leads_count` may be scoped to one user, so the result can exceed 100.
#[must_use]
pub fn lead_conversion_rate(won_deals: i64, leads_count: i64) -> Decimal {
    if leads_count == 0 {
        return Decimal::ZERO;
    }

    (Decimal::from(won_deals) * Decimal::ONE_HUNDRED / Decimal::from(leads_count))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// Sum of deal amounts.
pub fn pipeline_value<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    amounts.into_iter().sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_rate_zero_leads() {
        assert_eq!(lead_conversion_rate(0, 0), Decimal::ZERO);
        assert_eq!(lead_conversion_rate(5, 0), Decimal::ZERO);
    }

    #[test]
    fn test_conversion_rate_quarter() {
        assert_eq!(lead_conversion_rate(1, 4), Decimal::new(25, 0));
    }

    #[test]
    fn test_conversion_rate_rounds_to_two_places() {
        assert_eq!(lead_conversion_rate(1, 3), Decimal::new(3333, 2));
        assert_eq!(lead_conversion_rate(2, 3), Decimal::new(6667, 2));
        assert_eq!(lead_conversion_rate(1, 7), Decimal::new(1429, 2));
    }

    /// Percentage in hundredths, rounded half to even with integer arithmetic.
    fn hundredths(won: i64, leads: i64) -> i64 {
        let scaled = won * 10_000;
        let (q, r) = (scaled / leads, scaled % leads);
        match (2 * r).cmp(&leads) {
            std::cmp::Ordering::Greater => q + 1,
            std::cmp::Ordering::Equal if q % 2 == 1 => q + 1,
            _ => q,
        }
    }

    #[test]
    fn test_conversion_rate_exact_for_small_grid() {
        for leads in 1..=40_i64 {
            for won in 0..=leads {
                assert_eq!(
                    lead_conversion_rate(won, leads),
                    Decimal::new(hundredths(won, leads), 2),
                    "won={won} leads={leads}"
                );
            }
        }
    }

    #[test]
    fn test_conversion_rate_ties_round_to_even() {
        // 1/8 = 12.5%, 1/16 = 6.25%, 1/32 = 3.125%, 3/32 = 9.375%
        assert_eq!(lead_conversion_rate(1, 8), Decimal::new(1250, 2));
        assert_eq!(lead_conversion_rate(1, 32), Decimal::new(312, 2));
        assert_eq!(lead_conversion_rate(3, 32), Decimal::new(938, 2));
        assert_eq!(lead_conversion_rate(5, 32), Decimal::new(1562, 2));
    }

    #[test]
    fn test_conversion_rate_all_won() {
        assert_eq!(lead_conversion_rate(3, 3), Decimal::ONE_HUNDRED);
    }

    #[test]
    fn test_pipeline_value_sums_amounts() {
        let total = pipeline_value([Decimal::new(100, 0), Decimal::new(200, 0)]);
        assert_eq!(total, Decimal::new(300, 0));
        assert_eq!(pipeline_value(std::iter::empty()), Decimal::ZERO);
    }
}
