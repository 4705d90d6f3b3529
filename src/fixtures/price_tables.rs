//! Price Table Fixtures

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use serde::Deserialize;

use crate::{fixtures::FixtureError, prices::PriceTable, tiers::Tier};

/// Price table in YAML
#[derive(Debug, Deserialize)]
pub struct PriceTableFixture {
    /// Tiers, in any order
    pub tiers: Vec<TierFixture>,

    /// Map of size -> tier key -> unit price (e.g. "10.00 USD")
    pub prices: FxHashMap<String, FxHashMap<String, String>>,
}

/// Tier Fixture
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TierFixture {
    /// Tier key
    pub key: String,

    /// Lowest quantity in the tier
    pub min: u32,

    /// Highest quantity in the tier; omitted for an unbounded top tier
    pub max: Option<u32>,

    /// Flat minimum-order fee (e.g. "50.00 USD")
    pub minimum_order_fee: Option<String>,

    /// Quantity below which the minimum-order fee applies
    pub ltm_threshold: Option<u32>,
}

impl PriceTableFixture {
    /// Parse a price table fixture from YAML.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Yaml`] if the YAML does not describe a price table.
    pub fn from_yaml(contents: &str) -> Result<Self, FixtureError> {
        Ok(serde_norway::from_str(contents)?)
    }

    /// Convert into a validated [`PriceTable`].
    ///
    /// # Errors
    ///
    /// Returns an error if an amount is malformed, currencies are mixed, a
    /// tier's range is inverted, tiers overlap or repeat a key, a price
    /// references an unknown tier, or the resulting table is structurally
    /// empty.
    pub fn try_into_table(self) -> Result<PriceTable<'static>, FixtureError> {
        let mut currency: Option<&'static Currency> = None;
        let mut tiers = Vec::with_capacity(self.tiers.len());

        for fixture in self.tiers {
            if fixture.max.is_some_and(|max| max < fixture.min) {
                return Err(FixtureError::InvalidTier(fixture.key));
            }

            if tiers.iter().any(|tier: &Tier<'_>| tier.key() == fixture.key) {
                return Err(FixtureError::DuplicateTier(fixture.key));
            }

            let mut tier = Tier::new(fixture.key, fixture.min, fixture.max);

            if let Some(fee) = fixture.minimum_order_fee {
                tier = tier.with_minimum_order_fee(parse_money(&fee, &mut currency)?);
            }

            if let Some(threshold) = fixture.ltm_threshold {
                tier = tier.with_ltm_threshold(threshold);
            }

            tiers.push(tier);
        }

        tiers.sort_by_key(Tier::min_quantity);
        check_tier_ranges(&tiers)?;

        let mut unit_prices: FxHashMap<String, FxHashMap<String, Money<'static, Currency>>> =
            FxHashMap::default();

        for (size, by_tier) in self.prices {
            let mut parsed = FxHashMap::default();

            for (tier_key, price) in by_tier {
                if !tiers.iter().any(|tier| tier.key() == tier_key) {
                    return Err(FixtureError::UnknownTier { size, tier: tier_key });
                }

                parsed.insert(tier_key, parse_money(&price, &mut currency)?);
            }

            unit_prices.insert(size, parsed);
        }

        let currency = currency.ok_or(FixtureError::NoCurrency)?;
        let table = PriceTable::with_tiers(currency, tiers, unit_prices);

        table.validate()?;

        Ok(table)
    }
}

/// Reject overlapping tiers and log gaps between them.
fn check_tier_ranges(tiers: &[Tier<'_>]) -> Result<(), FixtureError> {
    for pair in tiers.windows(2) {
        let [lower, upper] = pair else {
            continue;
        };

        match lower.max_quantity() {
            Some(max) if max < upper.min_quantity() => {
                if max.saturating_add(1) < upper.min_quantity() {
                    tracing::warn!(
                        lower = lower.key(),
                        upper = upper.key(),
                        "gap between price tiers"
                    );
                }
            }
            _ => {
                return Err(FixtureError::OverlappingTiers(
                    lower.key().to_string(),
                    upper.key().to_string(),
                ));
            }
        }
    }

    Ok(())
}

/// Parse a price and check it matches the currency seen so far.
fn parse_money(
    s: &str,
    currency: &mut Option<&'static Currency>,
) -> Result<Money<'static, Currency>, FixtureError> {
    let (minor_units, parsed) = parse_price(s)?;

    if let Some(existing) = *currency {
        if existing != parsed {
            return Err(FixtureError::CurrencyMismatch(
                existing.iso_alpha_code.to_string(),
                parsed.iso_alpha_code.to_string(),
            ));
        }
    } else {
        *currency = Some(parsed);
    }

    Ok(Money::from_minor(minor_units, parsed))
}

/// Parse price string (e.g., "12.50 USD") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, is negative or has more
/// decimal places than the currency's minor unit, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let currency = match *currency_code {
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    // Sub-minor-unit amounts are rejected rather than rounded.
    if amount.normalize().scale() > currency.exponent {
        return Err(FixtureError::InvalidPrice(s.to_string()));
    }

    let minor_units = amount
        .checked_mul(Decimal::from(10_i64.pow(currency.exponent)))
        .and_then(|value| value.to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    if minor_units < 0 {
        return Err(FixtureError::InvalidPrice(s.to_string()));
    }

    Ok((minor_units, currency))
}
