//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Format an amount as dollars with thousands separators, e.g. `$1,234.50`.
#[must_use]
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}${grouped}.{cents}")
}

/// Money formatting for decimal amounts.
///
/// Usage in templates: `{{ deal.amount|money }}`
#[askama::filter_fn]
pub fn money(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let text = value.to_string();
    Ok(Decimal::from_str(&text).map_or(text, format_money))
}

/// Placeholder for empty optional fields.
///
/// Usage in templates: `{{ company.phone|or_dash }}`
#[askama::filter_fn]
pub fn or_dash(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let text = value.to_string();
    Ok(if text.trim().is_empty() {
        "-".to_string()
    } else {
        text
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(Decimal::ZERO), "$0.00");
        assert_eq!(format_money(Decimal::new(5, 1)), "$0.50");
        assert_eq!(format_money(Decimal::new(123_450, 2)), "$1,234.50");
        assert_eq!(format_money(Decimal::new(100_000_000, 0)), "$100,000,000.00");
        assert_eq!(format_money(Decimal::new(999, 0)), "$999.00");
        assert_eq!(format_money(Decimal::new(-1_000, 0)), "-$1,000.00");
    }
}
