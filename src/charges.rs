//! Additional Charges
//!
//! Extra charges layered on top of the tiered base price and minimum-order
//! fee: secondary logo locations, heavyweight garment surcharges, screen
//! setup or flash fees and the like.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

use crate::money::to_decimal;

/// How an additional charge is levied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChargeAmount<'a> {
    /// Added to the unit price of every unit being priced.
    PerUnit(Money<'a, Currency>),

    /// Charged once for the whole request, outside the per-size lines.
    Flat(Money<'a, Currency>),
}

impl<'a> ChargeAmount<'a> {
    /// The money amount of the charge.
    pub fn money(&self) -> &Money<'a, Currency> {
        match self {
            ChargeAmount::PerUnit(amount) | ChargeAmount::Flat(amount) => amount,
        }
    }
}

/// A named charge applied after base pricing.
#[derive(Debug, Clone, PartialEq)]
pub struct AdditionalCharge<'a> {
    name: String,
    amount: ChargeAmount<'a>,
}

impl<'a> AdditionalCharge<'a> {
    /// Create a charge added to every unit.
    pub fn per_unit(name: impl Into<String>, amount: Money<'a, Currency>) -> Self {
        Self {
            name: name.into(),
            amount: ChargeAmount::PerUnit(amount),
        }
    }

    /// Create a charge levied once per request.
    pub fn flat(name: impl Into<String>, amount: Money<'a, Currency>) -> Self {
        Self {
            name: name.into(),
            amount: ChargeAmount::Flat(amount),
        }
    }

    /// Charge name, as shown on the quote.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Charge amount.
    pub fn amount(&self) -> &ChargeAmount<'a> {
        &self.amount
    }

    /// Returns true if the charge is added per unit.
    pub fn is_per_unit(&self) -> bool {
        matches!(self.amount, ChargeAmount::PerUnit(_))
    }
}

/// Sum of all per-unit charges, in major units.
pub fn per_unit_total(charges: &[AdditionalCharge<'_>]) -> Decimal {
    charges
        .iter()
        .filter_map(|charge| match charge.amount {
            ChargeAmount::PerUnit(amount) => Some(to_decimal(&amount)),
            ChargeAmount::Flat(_) => None,
        })
        .sum()
}
