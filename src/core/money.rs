use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// All monetary values, in rupees. Never `f64`.
pub type Money = Decimal;

/// Rates expressed as fractions (0.24 = 24%).
pub type Rate = Decimal;

/// Round to the nearest whole currency unit, halves away from zero.
///
/// Only called at the last step of a calculation; intermediate figures keep
/// full precision.
pub fn round_to_unit(amount: Money) -> Money {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Round to paise for display.
pub fn round_to_paise(amount: Money) -> Money {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Parse an amount as it appears in broker and bank exports.
///
/// Accepts a leading `₹`, `Rs.`, `Rs` or `INR`, thousands separators,
/// and accounting-style parentheses for negatives. Returns `None` for blank
/// or non-numeric input.
pub fn parse_amount(raw: &str) -> Option<Money> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (negative, body) = match trimmed
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
    {
        Some(inner) => (true, inner.trim()),
        None => (false, trimmed),
    };

    let body = ["₹", "Rs.", "Rs", "INR"]
        .iter()
        .find_map(|prefix| body.strip_prefix(prefix))
        .unwrap_or(body);

    let cleaned: String = body
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let value = Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()?;
    Some(if negative { -value } else { value })
}
