//! Lenient number handling for free-text XML fields.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Parse a number out of document text.
///
/// Accepts surrounding whitespace, a comma as decimal separator and
/// scientific notation. Anything else is `None`, never an error.
pub fn parse_number(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized = trimmed.replace(',', ".");
    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .ok()
}

/// First present candidate, left to right, else `default`.
pub fn coalesce<I>(candidates: I, default: Decimal) -> Decimal
where
    I: IntoIterator<Item = Option<Decimal>>,
{
    candidates.into_iter().flatten().next().unwrap_or(default)
}

/// Round to `dp` places, half away from zero (commercial rounding).
pub fn round_money(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// `a * b` rounded to `dp` places, clamped to the `Decimal` range.
pub fn mul_round(a: Decimal, b: Decimal, dp: u32) -> Decimal {
    round_money(a.saturating_mul(b), dp)
}

/// `a / b` rounded to `dp` places.
///
/// `None` for a zero divisor or a quotient outside the `Decimal` range.
pub fn div_round(a: Decimal, b: Decimal, dp: u32) -> Option<Decimal> {
    a.checked_div(b).map(|q| round_money(q, dp))
}

/// Sum clamped to the `Decimal` range.
pub fn saturating_sum<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().fold(Decimal::ZERO, Decimal::saturating_add)
}
