//! Price Tables
//!
//! A price table pairs the quantity tiers for one product and embellishment
//! with the unit price of every stocked size at every tier.

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::tiers::Tier;

/// Structural problems that make a price table unusable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceTableError {
    /// The table defines no tiers.
    #[error("price table has no tiers")]
    NoTiers,

    /// The table defines no unit prices.
    #[error("price table has no unit prices")]
    NoPrices,
}

/// Unit prices keyed by size label, then tier key.
pub type UnitPrices<'a> = FxHashMap<String, FxHashMap<String, Money<'a, Currency>>>;

/// Where a unit price was found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceLookup<'a> {
    /// The size had a price at the requested tier.
    Exact(Money<'a, Currency>),

    /// The size was missing and the one-size-fits-all price was used instead.
    OneSizeFallback(Money<'a, Currency>),

    /// Neither the size nor the one-size-fits-all entry had a price.
    Missing,
}

/// Tiers and per-size unit prices for a product.
#[derive(Debug, Clone)]
pub struct PriceTable<'a> {
    tiers: Vec<Tier<'a>>,
    unit_prices: UnitPrices<'a>,
    currency: &'static Currency,
}

impl<'a> PriceTable<'a> {
    /// Create an empty table in the given currency.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            tiers: Vec::new(),
            unit_prices: FxHashMap::default(),
            currency,
        }
    }

    /// Create a table from tiers and prices. Tiers are sorted by minimum quantity.
    pub fn with_tiers(
        currency: &'static Currency,
        tiers: impl Into<Vec<Tier<'a>>>,
        unit_prices: UnitPrices<'a>,
    ) -> Self {
        let mut tiers = tiers.into();

        tiers.sort_by_key(Tier::min_quantity);

        Self {
            tiers,
            unit_prices,
            currency,
        }
    }

    /// Add a tier, keeping the tier list sorted.
    pub fn push_tier(&mut self, tier: Tier<'a>) -> &mut Self {
        let position = self
            .tiers
            .partition_point(|existing| existing.min_quantity() <= tier.min_quantity());

        self.tiers.insert(position, tier);
        self
    }

    /// Set the unit price for a size at a tier.
    pub fn set_price(
        &mut self,
        size: impl Into<String>,
        tier_key: impl Into<String>,
        price: Money<'a, Currency>,
    ) -> &mut Self {
        self.unit_prices
            .entry(size.into())
            .or_default()
            .insert(tier_key.into(), price);

        self
    }

    /// Check the table has the minimum structure needed to price anything.
    ///
    /// # Errors
    ///
    /// - [`PriceTableError::NoTiers`]: no tiers are defined.
    /// - [`PriceTableError::NoPrices`]: no unit prices are defined.
    pub fn validate(&self) -> Result<(), PriceTableError> {
        if self.tiers.is_empty() {
            return Err(PriceTableError::NoTiers);
        }

        if self.unit_prices.is_empty() {
            return Err(PriceTableError::NoPrices);
        }

        Ok(())
    }

    /// Tiers in ascending order of minimum quantity.
    pub fn tiers(&self) -> &[Tier<'a>] {
        &self.tiers
    }

    /// Find a tier by key.
    pub fn tier(&self, key: &str) -> Option<&Tier<'a>> {
        self.tiers.iter().find(|tier| tier.key() == key)
    }

    /// Stocked size labels, in canonical size order.
    pub fn sizes(&self) -> Vec<&str> {
        let mut sizes: Vec<&str> = self.unit_prices.keys().map(String::as_str).collect();

        sizes.sort_by(|left, right| crate::sizes::compare_sizes(left, right));
        sizes
    }

    /// Currency every amount in the table is priced in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Look up the unit price of `size` at `tier_key`, falling back to
    /// `fallback_size` at the same tier.
    pub fn unit_price_with_fallback(
        &self,
        size: &str,
        tier_key: &str,
        fallback_size: &str,
    ) -> PriceLookup<'a> {
        let price_at = |size: &str| {
            self.unit_prices
                .get(size)
                .and_then(|by_tier| by_tier.get(tier_key))
                .copied()
        };

        if let Some(price) = price_at(size) {
            return PriceLookup::Exact(price);
        }

        price_at(fallback_size).map_or(PriceLookup::Missing, PriceLookup::OneSizeFallback)
    }
}
