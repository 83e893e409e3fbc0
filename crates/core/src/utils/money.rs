use num_traits::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::{CURRENCY_DECIMAL_PRECISION, MINOR_UNITS_PER_MAJOR};
use crate::errors::{Result, ValidationError};

/// Converts a major-unit amount into gateway minor units (rupees to paise).
///
/// Amounts with more than two decimal places are rejected rather than rounded,
/// so the charged amount always equals the recorded amount.
pub fn to_minor_units(amount: Decimal) -> Result<i64> {
    if amount.is_sign_negative() {
        return Err(ValidationError::invalid("Amount must not be negative").into());
    }
    let rounded = round_currency(amount);
    if rounded != amount.normalize() {
        return Err(ValidationError::invalid(format!(
            "Amount {} has more than {} decimal places",
            amount, CURRENCY_DECIMAL_PRECISION
        ))
        .into());
    }
    (rounded * Decimal::from(MINOR_UNITS_PER_MAJOR))
        .to_i64()
        .ok_or_else(|| ValidationError::invalid(format!("Amount {} is out of range", amount)).into())
}

/// Converts gateway minor units back into a major-unit amount.
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, CURRENCY_DECIMAL_PRECISION)
}

/// Rounds to the currency precision using banker's rounding.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount
        .round_dp_with_strategy(CURRENCY_DECIMAL_PRECISION, RoundingStrategy::MidpointNearestEven)
        .normalize()
}
