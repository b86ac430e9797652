use rust_decimal::Decimal;
use thiserror::Error;

/// Request-level validation failure. The whole call is rejected and the
/// offending field is named.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("invalid input: {field} must not be negative (got {value})")]
    Negative { field: String, value: Decimal },

    #[error("invalid input: {field}: {reason}")]
    Invalid { field: String, reason: String },

    #[error("invalid input: monthly budget {budget} is below the sum of minimum payments {minimums}")]
    BudgetBelowMinimums { budget: Decimal, minimums: Decimal },
}

impl InputError {
    /// Name of the rejected field
    pub fn field(&self) -> &str {
        match self {
            InputError::Negative { field, .. } | InputError::Invalid { field, .. } => field,
            InputError::BudgetBelowMinimums { .. } => "total_monthly_budget",
        }
    }
}

pub(crate) fn ensure_non_negative(field: impl Into<String>, value: Decimal) -> Result<(), InputError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(InputError::Negative {
            field: field.into(),
            value,
        });
    }
    Ok(())
}
