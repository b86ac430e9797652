use super::tax::DeductionCode;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Record-level issues collected alongside a best-effort result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Warning {
    /// A deduction claim exceeded its statutory ceiling and was reduced.
    DeductionClamped {
        code: DeductionCode,
        claimed: Decimal,
        allowed: Decimal,
    },
    /// A supplied date could not be parsed and was ignored.
    UnparseableDate { field: String, value: String },
    /// Minimum payment does not cover the first month's interest.
    NegativeAmortization {
        lender: String,
        minimum_payment: Decimal,
        monthly_interest: Decimal,
    },
    /// Simulation hit the horizon cap with debt outstanding.
    NonConvergent { months: u32, remaining: Decimal },
    /// A sell had no open buy lot for part or all of its quantity.
    UnmatchedSell {
        instrument: String,
        trade_date: NaiveDate,
        quantity: Decimal,
    },
    /// A trade was left out of lot matching.
    InvalidTrade {
        instrument: String,
        trade_date: NaiveDate,
        reason: String,
    },
    /// An input row was skipped.
    RowSkipped { row: usize, reason: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::DeductionClamped {
                code,
                claimed,
                allowed,
            } => write!(
                f,
                "deduction {} claimed {} capped at {}",
                code.code(),
                claimed,
                allowed
            ),
            Warning::UnparseableDate { field, value } => {
                write!(f, "ignored unparseable date '{value}' in {field}")
            }
            Warning::NegativeAmortization {
                lender,
                minimum_payment,
                monthly_interest,
            } => write!(
                f,
                "{lender}: minimum payment {minimum_payment} is below monthly interest {}",
                monthly_interest.round_dp(2)
            ),
            Warning::NonConvergent { months, remaining } => write!(
                f,
                "debt not repaid within {months} months ({} outstanding)",
                remaining.round_dp(2)
            ),
            Warning::UnmatchedSell {
                instrument,
                trade_date,
                quantity,
            } => write!(
                f,
                "sell of {quantity} {instrument} on {trade_date} has no matching buy"
            ),
            Warning::InvalidTrade {
                instrument,
                trade_date,
                reason,
            } => write!(f, "{instrument} trade on {trade_date} ignored: {reason}"),
            Warning::RowSkipped { row, reason } => write!(f, "row {row} skipped: {reason}"),
        }
    }
}
