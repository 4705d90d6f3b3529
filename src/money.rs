//! Money helpers
//!
//! Prices are stored as [`Money`] in minor units. Fee distribution needs exact
//! fractional arithmetic, so amounts are lifted into [`Decimal`] while a quote
//! is being calculated and rounded back to the currency's precision at the end.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Errors converting between decimal amounts and money.
#[derive(Debug, Error, PartialEq)]
pub enum AmountError {
    /// The amount does not fit into the minor units of its currency.
    #[error("amount {0} cannot be represented in minor units")]
    OutOfRange(Decimal),
}

/// Returns the amount of `money` in major units (e.g. dollars) as a [`Decimal`].
pub fn to_decimal(money: &Money<'_, Currency>) -> Decimal {
    Decimal::new(money.to_minor_units(), money.currency().exponent)
}

/// Rounds a major-unit [`Decimal`] amount to the currency's precision.
///
/// Midpoints round away from zero, matching how the amounts are shown on a
/// printed quote.
///
/// # Errors
///
/// Returns [`AmountError::OutOfRange`] if the rounded amount overflows `i64`
/// minor units.
pub fn to_money(amount: Decimal, currency: &Currency) -> Result<Money<'_, Currency>, AmountError> {
    let scale = 10_i64
        .checked_pow(currency.exponent)
        .map(Decimal::from)
        .ok_or(AmountError::OutOfRange(amount))?;

    let minor_units = amount
        .checked_mul(scale)
        .map(|value| value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|value| value.to_i64())
        .ok_or(AmountError::OutOfRange(amount))?;

    Ok(Money::from_minor(minor_units, currency))
}

/// A zero amount in the given currency.
pub fn zero(currency: &Currency) -> Money<'_, Currency> {
    Money::from_minor(0, currency)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn to_decimal_uses_currency_exponent() {
        let money = Money::from_minor(1250, USD);

        assert_eq!(to_decimal(&money), Decimal::new(1250, 2));
    }

    #[test]
    fn to_money_rounds_half_away_from_zero() -> TestResult {
        assert_eq!(to_money(Decimal::new(14_165, 3), USD)?, Money::from_minor(1417, USD));
        assert_eq!(to_money(Decimal::new(14_164, 3), USD)?, Money::from_minor(1416, USD));

        Ok(())
    }

    #[test]
    fn to_money_rejects_amounts_beyond_i64_minor_units() {
        let result = to_money(Decimal::MAX, GBP);

        assert!(matches!(result, Err(AmountError::OutOfRange(_))));
    }

    #[test]
    fn zero_is_zero_minor_units() {
        assert_eq!(zero(GBP).to_minor_units(), 0);
    }
}
